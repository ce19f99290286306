//! PostgreSQL-backed weather store

use std::time::Duration;

use async_trait::async_trait;
use shared::{ForecastReading, WeatherQuery, WeatherRow};
use sqlx::{
    migrate::MigrateError,
    postgres::{PgPoolOptions, PgRow},
    PgPool, Postgres, QueryBuilder, Row,
};

use super::{build_query, QueryParam, StoreError, WeatherStore, WriteError, WriteReport, READINGS_TABLE};
use crate::config::DatabaseConfig;

/// Rows per INSERT statement; 6 binds per row stays far below the
/// 65535-parameter protocol limit
const INSERT_CHUNK_ROWS: usize = 1000;

/// Store backed by a PostgreSQL connection pool
#[derive(Clone)]
pub struct PgWeatherStore {
    pool: PgPool,
}

impl PgWeatherStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Open a pool using the database configuration
    pub async fn connect(config: &DatabaseConfig) -> Result<Self, sqlx::Error> {
        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .min_connections(config.min_connections)
            .acquire_timeout(Duration::from_secs(config.acquire_timeout_secs))
            .connect(&config.url)
            .await?;
        Ok(Self::new(pool))
    }

    /// Apply the embedded schema migrations
    pub async fn migrate(&self) -> Result<(), MigrateError> {
        sqlx::migrate!("./migrations").run(&self.pool).await
    }

    /// Wait for in-flight work and close every pooled connection
    pub async fn close(&self) {
        self.pool.close().await;
    }

    async fn insert_batch(&self, readings: &[ForecastReading]) -> Result<u64, sqlx::Error> {
        let mut tx = self.pool.begin().await?;
        let mut inserted = 0;

        for chunk in readings.chunks(INSERT_CHUNK_ROWS) {
            let mut builder: QueryBuilder<Postgres> = QueryBuilder::new(format!(
                "INSERT INTO {} (location, date, time, temperature_c, humidity_percent, condition) ",
                READINGS_TABLE
            ));
            builder.push_values(chunk, |mut b, reading| {
                b.push_bind(reading.location.clone())
                    .push_bind(reading.date)
                    .push_bind(reading.time)
                    .push_bind(reading.temperature_c)
                    .push_bind(reading.humidity_percent)
                    .push_bind(reading.condition.clone());
            });
            builder.push(" ON CONFLICT (location, date, time) DO NOTHING");

            inserted += builder.build().execute(&mut *tx).await?.rows_affected();
        }

        tx.commit().await?;
        Ok(inserted)
    }
}

fn decode_row(row: &PgRow, query: &WeatherQuery) -> Result<WeatherRow, sqlx::Error> {
    Ok(WeatherRow {
        location: row.try_get("location")?,
        date: row.try_get("date")?,
        time: row.try_get("time")?,
        temperature_c: query
            .include_temperature
            .then(|| row.try_get::<Option<f64>, _>("temperature_c"))
            .transpose()?,
        humidity_percent: query
            .include_humidity
            .then(|| row.try_get::<Option<f64>, _>("humidity_percent"))
            .transpose()?,
        condition: query
            .include_condition
            .then(|| row.try_get::<Option<String>, _>("condition"))
            .transpose()?,
    })
}

#[async_trait]
impl WeatherStore for PgWeatherStore {
    async fn insert_readings(&self, readings: &[ForecastReading]) -> Result<WriteReport, WriteError> {
        if readings.is_empty() {
            return Ok(WriteReport::default());
        }

        let inserted = self
            .insert_batch(readings)
            .await
            .map_err(|e| WriteError {
                attempted: readings.len(),
                source: StoreError::Database(e),
            })?;

        let report = WriteReport::from_counts(readings.len(), inserted);
        tracing::debug!(
            inserted = report.inserted,
            duplicates = report.duplicates,
            "Committed weather readings batch"
        );
        Ok(report)
    }

    async fn query(&self, query: &WeatherQuery) -> Result<Vec<WeatherRow>, StoreError> {
        let built = build_query(query);

        let mut statement = sqlx::query(&built.sql);
        for param in &built.params {
            statement = match param {
                QueryParam::Text(value) => statement.bind(value.clone()),
                QueryParam::Date(value) => statement.bind(*value),
                QueryParam::Limit(value) => statement.bind(*value),
            };
        }

        let rows = statement.fetch_all(&self.pool).await?;
        let rows = rows
            .iter()
            .map(|row| decode_row(row, query))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    async fn ping(&self) -> Result<(), StoreError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}
