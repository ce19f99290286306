//! In-process store used for dry-run harvests and tests

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use chrono::{NaiveDate, NaiveTime};
use shared::{ForecastReading, WeatherQuery, WeatherRow};
use tokio::sync::RwLock;

use super::{StoreError, WeatherStore, WriteError, WriteReport};

type ReadingKey = (String, NaiveDate, NaiveTime);

/// Readings kept in a map keyed by (location, date, time)
#[derive(Default)]
pub struct MemoryStore {
    readings: RwLock<BTreeMap<ReadingKey, ForecastReading>>,
    offline: AtomicBool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Simulate a lost connection: every operation fails until turned back on
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    pub async fn len(&self) -> usize {
        self.readings.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.readings.read().await.is_empty()
    }

    /// Every stored reading in key order
    pub async fn readings(&self) -> Vec<ForecastReading> {
        self.readings.read().await.values().cloned().collect()
    }

    fn check_online(&self) -> Result<(), StoreError> {
        if self.offline.load(Ordering::SeqCst) {
            Err(StoreError::Unavailable("memory store is offline".to_string()))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl WeatherStore for MemoryStore {
    async fn insert_readings(&self, readings: &[ForecastReading]) -> Result<WriteReport, WriteError> {
        if readings.is_empty() {
            return Ok(WriteReport::default());
        }
        self.check_online().map_err(|source| WriteError {
            attempted: readings.len(),
            source,
        })?;

        let mut stored = self.readings.write().await;
        let mut inserted = 0;
        for reading in readings {
            let key = (reading.location.clone(), reading.date, reading.time);
            if !stored.contains_key(&key) {
                stored.insert(key, reading.clone());
                inserted += 1;
            }
        }
        Ok(WriteReport::from_counts(readings.len(), inserted))
    }

    async fn query(&self, query: &WeatherQuery) -> Result<Vec<WeatherRow>, StoreError> {
        self.check_online()?;

        let stored = self.readings.read().await;
        let mut matching: Vec<&ForecastReading> =
            stored.values().filter(|r| query.matches(r)).collect();
        matching.sort_by(|a, b| b.date.cmp(&a.date).then(b.time.cmp(&a.time)));

        let limit = usize::try_from(query.limit).unwrap_or(0);
        Ok(matching
            .into_iter()
            .take(limit)
            .map(|r| WeatherRow::project(r, query))
            .collect())
    }

    async fn ping(&self) -> Result<(), StoreError> {
        self.check_online()
    }
}
