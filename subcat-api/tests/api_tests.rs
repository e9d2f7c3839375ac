//! Integration tests for subcat-api endpoints
//!
//! Tests cover:
//! - Health endpoint
//! - Substance search (filter, ordering, limit validation)
//! - Substance detail (exact match, case-insensitive fallback, 404)

use axum::{
    body::Body,
    http::{Request, StatusCode},
};
use serde_json::Value;
use sqlx::SqlitePool;
use subcat_api::{build_router, AppState};
use subcat_common::db::{init_memory_database, insert_substance};
use subcat_common::models::{DoseBands, Range, RouteRecord};
use subcat_common::{CanonicalSubstance, InteractionRecord, Severity};
use tower::util::ServiceExt; // for `oneshot` method
use uuid::Uuid;

/// Test helper: in-memory catalog with a handful of records
async fn setup_test_db() -> SqlitePool {
    let pool = init_memory_database().await.unwrap();

    let mut lsd = CanonicalSubstance::new("LSD");
    lsd.summary = Some("A classic psychedelic.".to_string());
    lsd.url = Some("https://wiki.tripsit.me/wiki/LSD".to_string());
    lsd.featured = Some(true);
    lsd.routes_of_administration.push(RouteRecord {
        route_name: "oral".to_string(),
        dose_units: "µg".to_string(),
        dose_bands: DoseBands {
            light: Some(Range::new(0.0, 25.0)),
            common: Some(Range::new(25.0, 75.0)),
            strong: Some(Range::new(75.0, 150.0)),
            heavy: Some(300.0),
        },
        duration_minutes: None,
    });
    lsd.interactions.push(InteractionRecord {
        partner_name: "Lithium".to_string(),
        severity: Severity::Dangerous,
        note: Some("Seizure risk".to_string()),
    });

    for substance in [
        lsd,
        CanonicalSubstance::new("Caffeine"),
        CanonicalSubstance::new("Ketamine"),
        CanonicalSubstance::new("1P-LSD"),
    ] {
        insert_substance(&pool, &substance).await.unwrap();
    }

    pool
}

fn setup_app(db: SqlitePool) -> axum::Router {
    build_router(AppState::new(db))
}

fn test_request(uri: &str) -> Request<Body> {
    Request::builder()
        .method("GET")
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

/// Test helper: Extract JSON body from response
async fn extract_json(body: Body) -> Value {
    let bytes = axum::body::to_bytes(body, usize::MAX)
        .await
        .expect("Should read body");
    serde_json::from_slice(&bytes).expect("Should parse JSON")
}

async fn get(uri: &str) -> (StatusCode, Value) {
    let app = setup_app(setup_test_db().await);
    let response = app.oneshot(test_request(uri)).await.unwrap();
    let status = response.status();
    (status, extract_json(response.into_body()).await)
}

fn names(body: &Value) -> Vec<&str> {
    body.as_array()
        .expect("Should be a JSON array")
        .iter()
        .map(|s| s["name"].as_str().unwrap())
        .collect()
}

// =============================================================================
// Health Endpoint Tests
// =============================================================================

#[tokio::test]
async fn test_health_endpoint() {
    for uri in ["/health", "/api/health"] {
        let (status, body) = get(uri).await;

        assert_eq!(status, StatusCode::OK, "{}", uri);
        assert_eq!(body["status"], "ok");
        assert_eq!(body["module"], "subcat-api");
        assert!(body["version"].is_string());
    }
}

// =============================================================================
// Search Tests
// =============================================================================

#[tokio::test]
async fn test_list_all_sorted_by_name() {
    let (status, body) = get("/api/substances").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(names(&body), vec!["1P-LSD", "Caffeine", "Ketamine", "LSD"]);

    // Summary projection only
    let lsd = &body[3];
    assert_eq!(lsd["summary"], "A classic psychedelic.");
    assert_eq!(lsd["featured"], true);
    assert!(lsd.get("interactions").is_none());
}

#[tokio::test]
async fn test_search_is_case_insensitive_substring() {
    let (status, body) = get("/api/substances?search=lsd").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(names(&body), vec!["1P-LSD", "LSD"]);
}

#[tokio::test]
async fn test_search_treats_pattern_characters_literally() {
    let (status, body) = get("/api/substances?search=%25").await;

    assert_eq!(status, StatusCode::OK);
    assert!(names(&body).is_empty());
}

#[tokio::test]
async fn test_search_limit() {
    let (status, body) = get("/api/substances?limit=2").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(names(&body), vec!["1P-LSD", "Caffeine"]);
}

#[tokio::test]
async fn test_search_limit_out_of_range() {
    for uri in [
        "/api/substances?limit=0",
        "/api/substances?limit=1001",
        "/api/substances?limit=many",
    ] {
        let (status, body) = get(uri).await;

        assert_eq!(status, StatusCode::BAD_REQUEST, "{}", uri);
        assert_eq!(body["error"]["code"], "BAD_REQUEST");
    }
}

// =============================================================================
// Detail Tests
// =============================================================================

#[tokio::test]
async fn test_detail_exact_name() {
    let (status, body) = get("/api/substances/LSD").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["name"], "LSD");
    assert!(Uuid::parse_str(body["id"].as_str().unwrap()).is_ok());
    assert_eq!(body["url"], "https://wiki.tripsit.me/wiki/LSD");

    let route = &body["routesOfAdministration"][0];
    assert_eq!(route["routeName"], "oral");
    assert_eq!(route["doseUnits"], "µg");
    assert_eq!(route["doseBands"]["heavy"], 300.0);

    let interaction = &body["interactions"][0];
    assert_eq!(interaction["partnerName"], "Lithium");
    assert_eq!(interaction["severity"], "Dangerous");
}

#[tokio::test]
async fn test_detail_case_insensitive_fallback() {
    let (status, body) = get("/api/substances/caffeine").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["name"], "Caffeine");
}

#[tokio::test]
async fn test_detail_not_found() {
    let (status, body) = get("/api/substances/Unobtainium").await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"]["code"], "NOT_FOUND");
    assert!(body["error"]["message"].as_str().unwrap().contains("Unobtainium"));
}
