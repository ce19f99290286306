//! Route definitions for the weather read API

use axum::{routing::get, Router};

use crate::{handlers, AppState};

/// Read API routes
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(handlers::health_check))
        .route("/weather", get(handlers::get_weather))
}
