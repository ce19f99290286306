//! Persistence for forecast readings
//!
//! `WeatherStore` is the seam between the harvest/read services and the
//! database. `PgWeatherStore` is the production store; `MemoryStore` keeps the
//! same first-write-wins semantics in process for dry runs and tests.

pub mod memory;
pub mod postgres;
pub mod query;

use async_trait::async_trait;
use serde::Serialize;
use shared::{ForecastReading, WeatherQuery, WeatherRow};
use thiserror::Error;

pub use memory::MemoryStore;
pub use postgres::PgWeatherStore;
pub use query::{build_query, BuiltQuery, QueryParam};

/// Table holding one row per (location, date, time)
pub const READINGS_TABLE: &str = "weather_readings";

/// Store failure unrelated to the uniqueness key
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("store unavailable: {0}")]
    Unavailable(String),
}

impl StoreError {
    /// Whether the database could not be reached at all, as opposed to a
    /// statement or decoding failure
    pub fn is_unavailable(&self) -> bool {
        match self {
            StoreError::Unavailable(_) => true,
            StoreError::Database(err) => matches!(
                err,
                sqlx::Error::Io(_) | sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed
            ),
        }
    }
}

/// A batch write that was not committed
#[derive(Debug, Error)]
#[error("failed to persist {attempted} readings: {source}")]
pub struct WriteError {
    pub attempted: usize,
    #[source]
    pub source: StoreError,
}

/// Outcome of a committed batch write
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct WriteReport {
    pub inserted: u64,
    /// Rows skipped because their key was already stored
    pub duplicates: u64,
}

impl WriteReport {
    pub fn from_counts(attempted: usize, inserted: u64) -> Self {
        Self {
            inserted,
            duplicates: (attempted as u64).saturating_sub(inserted),
        }
    }
}

#[async_trait]
pub trait WeatherStore: Send + Sync {
    /// Insert every reading, ignoring key conflicts, as one batch
    async fn insert_readings(&self, readings: &[ForecastReading]) -> Result<WriteReport, WriteError>;

    /// Rows matching the filters, most recent first
    async fn query(&self, query: &WeatherQuery) -> Result<Vec<WeatherRow>, StoreError>;

    async fn ping(&self) -> Result<(), StoreError>;
}
