//! Weather data models

use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};

use crate::locations::DEFAULT_LOCATION;

/// Result cap used when a request does not set `limit`
pub const DEFAULT_LIMIT: i64 = 100;

/// One hourly observation for one province.
///
/// `(location, date, time)` is the natural key. Date and time are the
/// forecast's local wall clock; no timezone conversion is applied.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastReading {
    pub location: String,
    pub date: NaiveDate,
    pub time: NaiveTime,
    pub temperature_c: Option<f64>,
    pub humidity_percent: Option<f64>,
    pub condition: String,
}

impl ForecastReading {
    pub fn key(&self) -> (&str, NaiveDate, NaiveTime) {
        (self.location.as_str(), self.date, self.time)
    }
}

/// Parsed read-API filters
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WeatherQuery {
    /// `None` means every location
    pub location: Option<String>,
    pub date_exact: Option<NaiveDate>,
    pub date_from: Option<NaiveDate>,
    pub date_to: Option<NaiveDate>,
    pub include_temperature: bool,
    pub include_humidity: bool,
    pub include_condition: bool,
    pub limit: i64,
}

impl Default for WeatherQuery {
    fn default() -> Self {
        Self {
            location: Some(DEFAULT_LOCATION.to_string()),
            date_exact: None,
            date_from: None,
            date_to: None,
            include_temperature: true,
            include_humidity: true,
            include_condition: true,
            limit: DEFAULT_LIMIT,
        }
    }
}

impl WeatherQuery {
    /// Conjunction of every set filter
    pub fn matches(&self, reading: &ForecastReading) -> bool {
        self.location
            .as_deref()
            .map_or(true, |location| reading.location == location)
            && self.date_exact.map_or(true, |d| reading.date == d)
            && self.date_from.map_or(true, |d| reading.date >= d)
            && self.date_to.map_or(true, |d| reading.date <= d)
    }
}

/// One row of the read API response.
///
/// Optional columns use two levels of `Option`: the outer one says whether
/// the column was requested (absent keys are skipped in JSON), the inner one
/// carries a stored NULL.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherRow {
    pub location: String,
    pub date: NaiveDate,
    pub time: NaiveTime,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature_c: Option<Option<f64>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub humidity_percent: Option<Option<f64>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub condition: Option<Option<String>>,
}

impl WeatherRow {
    /// Project a reading onto the columns the query asked for
    pub fn project(reading: &ForecastReading, query: &WeatherQuery) -> Self {
        Self {
            location: reading.location.clone(),
            date: reading.date,
            time: reading.time,
            temperature_c: query.include_temperature.then_some(reading.temperature_c),
            humidity_percent: query.include_humidity.then_some(reading.humidity_percent),
            condition: query
                .include_condition
                .then(|| Some(reading.condition.clone())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reading(location: &str, date: &str, time: &str) -> ForecastReading {
        ForecastReading {
            location: location.to_string(),
            date: date.parse().unwrap(),
            time: time.parse().unwrap(),
            temperature_c: Some(31.5),
            humidity_percent: None,
            condition: "ท้องฟ้าแจ่มใส (Clear)".to_string(),
        }
    }

    #[test]
    fn test_default_query() {
        let query = WeatherQuery::default();
        assert_eq!(query.location.as_deref(), Some(DEFAULT_LOCATION));
        assert_eq!(query.limit, 100);
        assert!(query.include_temperature && query.include_humidity && query.include_condition);
    }

    #[test]
    fn test_matches_is_conjunctive() {
        let query = WeatherQuery {
            location: Some("A".to_string()),
            date_from: Some("2024-01-01".parse().unwrap()),
            date_to: Some("2024-01-31".parse().unwrap()),
            ..WeatherQuery::default()
        };
        assert!(query.matches(&reading("A", "2024-01-15", "10:00:00")));
        assert!(query.matches(&reading("A", "2024-01-31", "23:00:00")));
        assert!(!query.matches(&reading("B", "2024-01-15", "10:00:00")));
        assert!(!query.matches(&reading("A", "2024-02-01", "00:00:00")));
    }

    #[test]
    fn test_row_json_contains_only_requested_fields() {
        let query = WeatherQuery {
            include_humidity: false,
            ..WeatherQuery::default()
        };
        let row = WeatherRow::project(&reading("A", "2024-01-15", "10:00:00"), &query);
        let json = serde_json::to_value(&row).unwrap();
        let object = json.as_object().unwrap();

        assert_eq!(object["location"], "A");
        assert_eq!(object["date"], "2024-01-15");
        assert_eq!(object["time"], "10:00:00");
        assert_eq!(object["temperature_c"], 31.5);
        assert!(!object.contains_key("humidity_percent"));
        assert_eq!(object["condition"], "ท้องฟ้าแจ่มใส (Clear)");
    }

    #[test]
    fn test_stored_null_serializes_as_null() {
        let row = WeatherRow::project(&reading("A", "2024-01-15", "10:00:00"), &WeatherQuery::default());
        let json = serde_json::to_value(&row).unwrap();
        assert!(json.as_object().unwrap().contains_key("humidity_percent"));
        assert!(json["humidity_percent"].is_null());
    }
}
