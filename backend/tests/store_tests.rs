//! PostgreSQL store tests
//!
//! Each test gets a fresh database from `sqlx::test`, with the embedded
//! migrations applied. Run with `DATABASE_URL` set and `--ignored`.

use chrono::{NaiveDate, NaiveTime};
use shared::{ForecastReading, WeatherQuery};
use sqlx::PgPool;
use weather_backend::store::{PgWeatherStore, WeatherStore};

fn reading(location: &str, hour: u32, temperature: Option<f64>) -> ForecastReading {
    ForecastReading {
        location: location.to_string(),
        date: NaiveDate::from_ymd_opt(2024, 6, 1).unwrap(),
        time: NaiveTime::from_hms_opt(hour, 0, 0).unwrap(),
        temperature_c: temperature,
        humidity_percent: Some(71.3),
        condition: "ฝนตกเล็กน้อย (Light rain)".to_string(),
    }
}

fn all_of(location: &str) -> WeatherQuery {
    WeatherQuery {
        location: Some(location.to_string()),
        limit: 1000,
        ..WeatherQuery::default()
    }
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requires DATABASE_URL"]
async fn test_duplicate_key_in_batch_is_counted(pool: PgPool) {
    let store = PgWeatherStore::new(pool);
    let first = reading("ตาก", 0, Some(24.0));
    let mut same_key = first.clone();
    same_key.temperature_c = Some(99.0);

    let report = store.insert_readings(&[first.clone(), same_key]).await.unwrap();

    assert_eq!(report.inserted, 1);
    assert_eq!(report.duplicates, 1);
    let rows = store.query(&all_of("ตาก")).await.unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].temperature_c, Some(Some(24.0)));
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requires DATABASE_URL"]
async fn test_rerun_inserts_nothing(pool: PgPool) {
    let store = PgWeatherStore::new(pool);
    let batch: Vec<_> = (0..24).map(|h| reading("ตาก", h, Some(20.0 + h as f64))).collect();

    let first = store.insert_readings(&batch).await.unwrap();
    let second = store.insert_readings(&batch).await.unwrap();

    assert_eq!(first.inserted, 24);
    assert_eq!(second.inserted, 0);
    assert_eq!(second.duplicates, 24);
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requires DATABASE_URL"]
async fn test_round_trip_preserves_values(pool: PgPool) {
    let store = PgWeatherStore::new(pool);
    let original = vec![reading("ภูเก็ต", 5, Some(28.123456789)), reading("ภูเก็ต", 4, None)];

    store.insert_readings(&original).await.unwrap();
    let rows = store.query(&all_of("ภูเก็ต")).await.unwrap();

    assert_eq!(rows.len(), 2);
    for (row, reading) in rows.iter().zip(&original) {
        assert_eq!(row.location, reading.location);
        assert_eq!(row.date, reading.date);
        assert_eq!(row.time, reading.time);
        assert_eq!(row.temperature_c, Some(reading.temperature_c));
        assert_eq!(row.humidity_percent, Some(reading.humidity_percent));
        assert_eq!(row.condition, Some(Some(reading.condition.clone())));
    }
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requires DATABASE_URL"]
async fn test_unrequested_columns_are_absent(pool: PgPool) {
    let store = PgWeatherStore::new(pool);
    store.insert_readings(&[reading("ตาก", 1, Some(30.0))]).await.unwrap();

    let query = WeatherQuery {
        include_temperature: false,
        include_condition: false,
        ..all_of("ตาก")
    };
    let rows = store.query(&query).await.unwrap();

    assert_eq!(rows[0].temperature_c, None);
    assert_eq!(rows[0].humidity_percent, Some(Some(71.3)));
    assert_eq!(rows[0].condition, None);
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requires DATABASE_URL"]
async fn test_large_batch_spans_chunks(pool: PgPool) {
    let store = PgWeatherStore::new(pool);
    let date = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
    let batch: Vec<_> = (0..2500)
        .map(|i| ForecastReading {
            date: date + chrono::Duration::days(i / 24),
            time: NaiveTime::from_hms_opt((i % 24) as u32, 0, 0).unwrap(),
            ..reading("ตาก", 0, Some(25.0))
        })
        .collect();

    let report = store.insert_readings(&batch).await.unwrap();

    assert_eq!(report.inserted, 2500);
    assert!(store.ping().await.is_ok());
}
