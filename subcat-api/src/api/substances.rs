//! Substance catalog queries
//!
//! - `GET /api/substances?search=&limit=` lists summaries sorted by name
//! - `GET /api/substances/:name` returns one full record

use axum::{
    extract::{Path, Query, State},
    routing::get,
    Json, Router,
};
use serde::Deserialize;
use subcat_common::db::{find_substance_detail, search_substances};
use subcat_common::models::SubstanceSummary;
use subcat_common::CanonicalSubstance;
use tracing::debug;

use crate::error::{ApiError, ApiResult};
use crate::AppState;

/// Results returned when no limit is given
pub const DEFAULT_LIMIT: u32 = 100;

/// Largest accepted limit
pub const MAX_LIMIT: u32 = 1000;

/// Query parameters for the substance list
#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    /// Case-insensitive substring of the name
    pub search: Option<String>,

    /// Maximum number of results (1..=1000)
    ///
    /// Kept as text so a non-numeric value gets the JSON error body.
    pub limit: Option<String>,
}

impl SearchQuery {
    fn validated_limit(&self) -> ApiResult<u32> {
        let Some(raw) = self.limit.as_deref() else {
            return Ok(DEFAULT_LIMIT);
        };

        match raw.trim().parse::<u32>() {
            Ok(limit) if (1..=MAX_LIMIT).contains(&limit) => Ok(limit),
            _ => Err(ApiError::BadRequest(format!(
                "limit must be an integer between 1 and {}, got '{}'",
                MAX_LIMIT, raw
            ))),
        }
    }
}

/// GET /api/substances?search=&limit=
pub async fn list_substances(
    State(state): State<AppState>,
    Query(query): Query<SearchQuery>,
) -> ApiResult<Json<Vec<SubstanceSummary>>> {
    let limit = query.validated_limit()?;
    let search = query.search.as_deref().map(str::trim).filter(|s| !s.is_empty());

    let results = search_substances(&state.db, search, limit).await?;
    debug!(search = ?search, limit, count = results.len(), "Substance search");

    Ok(Json(results))
}

/// GET /api/substances/:name
///
/// Exact name first, then case-insensitive.
pub async fn get_substance(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> ApiResult<Json<CanonicalSubstance>> {
    find_substance_detail(&state.db, &name)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::NotFound(format!("Substance '{}'", name)))
}

/// Build substance query routes
pub fn substance_routes() -> Router<AppState> {
    Router::new()
        .route("/api/substances", get(list_substances))
        .route("/api/substances/:name", get(get_substance))
}
