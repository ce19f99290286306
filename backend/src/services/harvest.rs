//! Harvest cycle: fetch every province, parse, and hand readings to the store
//!
//! A failing province never aborts the cycle. Each one ends in a
//! [`LocationOutcome`]; the cycle folds those into a [`HarvestReport`] listing
//! accepted readings and skipped provinces with the reason.

use std::fmt;

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime};
use futures::stream::{self, StreamExt};
use serde::{Deserialize, Serialize};
use shared::{ConditionCatalog, ForecastReading, LocationRegistry};
use thiserror::Error;

use crate::external::{FetchError, ForecastSource};
use crate::services::throttle::Throttle;
use crate::store::{WeatherStore, WriteError, WriteReport};

/// A payload that does not have the expected shape
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("invalid forecast payload for {location}: {source}")]
    Json {
        location: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("forecast payload for {location} is missing {field}")]
    MissingField {
        location: String,
        field: &'static str,
    },

    #[error("unparsable timestamp '{value}' for {location}")]
    Timestamp { location: String, value: String },
}

// Payload shape: {"WeatherForecasts": [{"location": {"province": ..},
// "forecasts": [{"time": .., "data": {"tc": .., "rh": .., "cond": ..}}]}]}
#[derive(Debug, Deserialize)]
struct ForecastPayload {
    #[serde(rename = "WeatherForecasts")]
    weather_forecasts: Option<Vec<LocationForecast>>,
}

#[derive(Debug, Deserialize)]
struct LocationForecast {
    location: Option<PayloadLocation>,
    forecasts: Option<Vec<HourlyEntry>>,
}

#[derive(Debug, Deserialize)]
struct PayloadLocation {
    province: Option<String>,
}

#[derive(Debug, Deserialize)]
struct HourlyEntry {
    time: String,
    data: HourlyData,
}

#[derive(Debug, Default, Deserialize)]
struct HourlyData {
    tc: Option<f64>,
    rh: Option<f64>,
    cond: Option<f64>,
}

/// Split an ISO-8601 timestamp into local date and wall-clock time.
/// An explicit offset is kept as-is, never converted.
pub fn split_timestamp(value: &str) -> Option<(NaiveDate, NaiveTime)> {
    let value = value.trim();
    let local = DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.naive_local())
        .ok()
        .or_else(|| value.parse::<NaiveDateTime>().ok())
        .or_else(|| NaiveDateTime::parse_from_str(value, "%Y-%m-%d %H:%M:%S%.f").ok())?;
    Some((local.date(), local.time()))
}

fn condition_code(raw: Option<f64>) -> Option<i64> {
    raw.filter(|c| c.fract() == 0.0).map(|c| c as i64)
}

/// Turn one location's payload into readings.
///
/// Readings are attributed to the registry name that was requested.
pub fn parse_forecast(
    location: &str,
    body: &str,
    catalog: &ConditionCatalog,
) -> Result<Vec<ForecastReading>, ParseError> {
    let payload: ForecastPayload = serde_json::from_str(body).map_err(|source| ParseError::Json {
        location: location.to_string(),
        source,
    })?;
    let missing = |field| ParseError::MissingField {
        location: location.to_string(),
        field,
    };

    let entry = payload
        .weather_forecasts
        .and_then(|forecasts| forecasts.into_iter().next())
        .ok_or_else(|| missing("WeatherForecasts[0]"))?;
    let province = entry
        .location
        .and_then(|l| l.province)
        .ok_or_else(|| missing("location.province"))?;
    let hourly = entry.forecasts.ok_or_else(|| missing("forecasts"))?;

    if province != location {
        tracing::debug!(requested = location, reported = %province, "Province name differs in payload");
    }

    hourly
        .into_iter()
        .map(|item| {
            let (date, time) =
                split_timestamp(&item.time).ok_or_else(|| ParseError::Timestamp {
                    location: location.to_string(),
                    value: item.time.clone(),
                })?;
            Ok(ForecastReading {
                location: location.to_string(),
                date,
                time,
                temperature_c: item.data.tc,
                humidity_percent: item.data.rh,
                condition: catalog.resolve(condition_code(item.data.cond)).to_string(),
            })
        })
        .collect()
}

/// How a single location ended within a cycle
#[derive(Debug)]
pub enum LocationOutcome {
    Harvested(Vec<ForecastReading>),
    FetchFailed(FetchError),
    ParseFailed(ParseError),
}

/// Why a location contributed no readings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SkipReason {
    Fetch,
    Parse,
    /// Well-formed payload without hourly entries
    Empty,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::Fetch => f.write_str("fetch"),
            SkipReason::Parse => f.write_str("parse"),
            SkipReason::Empty => f.write_str("empty"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkippedLocation {
    pub location: String,
    pub reason: SkipReason,
    pub detail: String,
}

/// Result of one pass over the registry
#[derive(Debug, Clone, Default, Serialize)]
pub struct HarvestReport {
    pub accepted: Vec<ForecastReading>,
    pub skipped: Vec<SkippedLocation>,
}

impl HarvestReport {
    fn record(&mut self, location: &str, outcome: LocationOutcome) {
        let (reason, detail) = match outcome {
            LocationOutcome::Harvested(readings) if !readings.is_empty() => {
                self.accepted.extend(readings);
                return;
            }
            LocationOutcome::Harvested(_) => (SkipReason::Empty, "no hourly entries".to_string()),
            LocationOutcome::FetchFailed(err) => (SkipReason::Fetch, err.to_string()),
            LocationOutcome::ParseFailed(err) => (SkipReason::Parse, err.to_string()),
        };

        tracing::warn!(location, %reason, %detail, "Skipping location");
        self.skipped.push(SkippedLocation {
            location: location.to_string(),
            reason,
            detail,
        });
    }

    pub fn is_degraded(&self) -> bool {
        !self.skipped.is_empty()
    }
}

/// Harvest report plus what the store did with it
#[derive(Debug, Clone, Serialize)]
pub struct CycleSummary {
    pub report: HarvestReport,
    pub write: WriteReport,
}

/// Drives one harvest cycle over a location registry
pub struct HarvestService<S, T> {
    source: S,
    throttle: T,
    registry: LocationRegistry,
    catalog: ConditionCatalog,
    max_concurrency: usize,
}

impl<S: ForecastSource, T: Throttle> HarvestService<S, T> {
    /// Create a service that fetches one location at a time
    pub fn new(source: S, throttle: T, registry: LocationRegistry) -> Self {
        Self {
            source,
            throttle,
            registry,
            catalog: ConditionCatalog,
            max_concurrency: 1,
        }
    }

    /// Allow up to `max_concurrency` fetches in flight; the throttle still
    /// spaces their starts
    pub fn with_concurrency(mut self, max_concurrency: usize) -> Self {
        self.max_concurrency = max_concurrency.max(1);
        self
    }

    pub fn registry(&self) -> &LocationRegistry {
        &self.registry
    }

    /// Fetch and parse one location
    pub async fn harvest_location(&self, location: &str) -> LocationOutcome {
        self.throttle.acquire().await;

        let raw = match self.source.fetch(location).await {
            Ok(raw) => raw,
            Err(err) => return LocationOutcome::FetchFailed(err),
        };

        match parse_forecast(&raw.location, &raw.body, &self.catalog) {
            Ok(readings) => LocationOutcome::Harvested(readings),
            Err(err) => LocationOutcome::ParseFailed(err),
        }
    }

    /// Visit every location in registry order. Never fails: problems end up
    /// in `skipped`.
    pub async fn run_cycle(&self) -> HarvestReport {
        tracing::info!(
            locations = self.registry.len(),
            concurrency = self.max_concurrency,
            "Starting harvest cycle"
        );

        // `buffered` yields in input order, so the report is deterministic
        let outcomes: Vec<(&str, LocationOutcome)> = stream::iter(self.registry.iter())
            .map(|location| async move { (location, self.harvest_location(location).await) })
            .buffered(self.max_concurrency)
            .collect()
            .await;

        let mut report = HarvestReport::default();
        for (location, outcome) in outcomes {
            report.record(location, outcome);
        }

        tracing::info!(
            accepted = report.accepted.len(),
            skipped = report.skipped.len(),
            "Harvest cycle finished"
        );
        report
    }

    /// Run one cycle and write its readings as a single batch
    pub async fn run_and_persist(&self, store: &dyn WeatherStore) -> Result<CycleSummary, WriteError> {
        let report = self.run_cycle().await;

        if report.accepted.is_empty() {
            tracing::warn!("No readings collected; nothing to persist");
        }

        let write = store.insert_readings(&report.accepted).await?;
        tracing::info!(
            inserted = write.inserted,
            duplicates = write.duplicates,
            "Persisted harvest readings"
        );

        Ok(CycleSummary { report, write })
    }
}
