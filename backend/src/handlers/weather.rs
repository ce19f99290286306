//! HTTP handlers for the weather read API

use axum::{
    extract::{rejection::QueryRejection, Query, State},
    Json,
};
use shared::{WeatherParams, WeatherRow};

use crate::error::AppResult;
use crate::services::WeatherService;
use crate::AppState;

/// `GET /weather`: stored readings filtered by location and date, most
/// recent first
pub async fn get_weather(
    State(state): State<AppState>,
    params: Result<Query<WeatherParams>, QueryRejection>,
) -> AppResult<Json<Vec<WeatherRow>>> {
    let Query(params) = params?;
    let service = WeatherService::new(state.store, state.query_defaults);
    let rows = service.search(params).await?;
    Ok(Json(rows))
}
