//! Read service behind `GET /weather`

use std::sync::Arc;

use shared::{QueryDefaults, WeatherParams, WeatherQuery, WeatherRow};

use crate::error::AppResult;
use crate::store::WeatherStore;

/// Turns raw request parameters into a store query
pub struct WeatherService {
    store: Arc<dyn WeatherStore>,
    defaults: Arc<QueryDefaults>,
}

impl WeatherService {
    pub fn new(store: Arc<dyn WeatherStore>, defaults: Arc<QueryDefaults>) -> Self {
        Self { store, defaults }
    }

    /// Validate parameters and return the matching rows, most recent first.
    ///
    /// Nothing reaches the store unless every parameter parsed.
    pub async fn search(&self, params: WeatherParams) -> AppResult<Vec<WeatherRow>> {
        let query = params.into_query(&self.defaults)?;
        self.query(&query).await
    }

    pub async fn query(&self, query: &WeatherQuery) -> AppResult<Vec<WeatherRow>> {
        tracing::debug!(
            location = query.location.as_deref().unwrap_or("*"),
            limit = query.limit,
            "Querying weather readings"
        );
        let rows = self.store.query(query).await?;
        Ok(rows)
    }
}
