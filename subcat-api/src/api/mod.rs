//! HTTP API handlers for subcat-api

pub mod health;
pub mod substances;

pub use health::health_routes;
pub use substances::substance_routes;
