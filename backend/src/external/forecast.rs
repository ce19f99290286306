//! TMD hourly forecast API client
//!
//! One authenticated GET per province. The body is handed back undecoded;
//! turning it into readings is the harvest service's job.

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::{header::ACCEPT, Client};
use thiserror::Error;

use crate::config::ForecastApiConfig;

/// Longest slice of an error body kept for logs
const ERROR_BODY_PREVIEW: usize = 200;

/// A per-location request failure. The cycle continues without this location.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("forecast request for {location} timed out")]
    Timeout { location: String },

    #[error("forecast API answered {status} for {location}: {body}")]
    Status {
        location: String,
        status: u16,
        body: String,
    },

    #[error("forecast request for {location} failed: {cause}")]
    Request { location: String, cause: String },
}

impl FetchError {
    pub fn location(&self) -> &str {
        match self {
            FetchError::Timeout { location }
            | FetchError::Status { location, .. }
            | FetchError::Request { location, .. } => location,
        }
    }

    fn from_reqwest(location: &str, err: reqwest::Error) -> Self {
        if err.is_timeout() {
            FetchError::Timeout {
                location: location.to_string(),
            }
        } else {
            FetchError::Request {
                location: location.to_string(),
                cause: err.to_string(),
            }
        }
    }
}

/// Undecoded response body for one location
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawForecast {
    pub location: String,
    pub body: String,
}

/// Anything that can produce a forecast payload for a location
#[async_trait]
pub trait ForecastSource: Send + Sync {
    async fn fetch(&self, location: &str) -> Result<RawForecast, FetchError>;
}

#[async_trait]
impl<T: ForecastSource + ?Sized> ForecastSource for Arc<T> {
    async fn fetch(&self, location: &str) -> Result<RawForecast, FetchError> {
        (**self).fetch(location).await
    }
}

/// Client for the TMD NWP hourly forecast endpoint
#[derive(Clone)]
pub struct TmdForecastClient {
    client: Client,
    base_url: String,
    token: String,
    fields: String,
}

impl TmdForecastClient {
    /// Create a client with the configured endpoint, token and timeout
    pub fn new(config: &ForecastApiConfig) -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .user_agent(concat!("thai-weather-harvest/", env!("CARGO_PKG_VERSION")))
            .timeout(config.timeout())
            .build()?;

        Ok(Self {
            client,
            base_url: config.base_url.clone(),
            token: config.token.clone(),
            fields: config.fields.clone(),
        })
    }
}

#[async_trait]
impl ForecastSource for TmdForecastClient {
    async fn fetch(&self, location: &str) -> Result<RawForecast, FetchError> {
        tracing::debug!(location, "Requesting hourly forecast");

        let response = self
            .client
            .get(&self.base_url)
            .header(ACCEPT, "application/json")
            .bearer_auth(&self.token)
            .query(&[("province", location), ("fields", self.fields.as_str())])
            .send()
            .await
            .map_err(|e| FetchError::from_reqwest(location, e))?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(FetchError::Status {
                location: location.to_string(),
                status,
                body: body.chars().take(ERROR_BODY_PREVIEW).collect(),
            });
        }

        let body = response
            .text()
            .await
            .map_err(|e| FetchError::from_reqwest(location, e))?;

        Ok(RawForecast {
            location: location.to_string(),
            body,
        })
    }
}
