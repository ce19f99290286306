//! Validation of read-API query parameters
//!
//! Every filter arrives as an optional raw string. Parsing happens here so a
//! malformed value is rejected with the name of the offending field before
//! any query is built.

use chrono::NaiveDate;
use serde::Deserialize;
use thiserror::Error;

use crate::locations::{LocationRegistry, DEFAULT_LOCATION};
use crate::models::{WeatherQuery, DEFAULT_LIMIT};

/// Largest `limit` accepted unless configured otherwise
pub const DEFAULT_MAX_LIMIT: i64 = 1000;

/// A single rejected query parameter
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{field}: {message}")]
pub struct FieldError {
    pub field: &'static str,
    pub message: String,
    pub message_th: String,
}

impl FieldError {
    fn new(field: &'static str, message: impl Into<String>, message_th: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
            message_th: message_th.into(),
        }
    }
}

/// Defaults applied to parameters the request leaves out
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryDefaults {
    /// Locations a request may name
    pub locations: LocationRegistry,
    pub location: String,
    pub limit: i64,
    pub max_limit: i64,
}

impl Default for QueryDefaults {
    fn default() -> Self {
        Self {
            locations: LocationRegistry::thailand(),
            location: DEFAULT_LOCATION.to_string(),
            limit: DEFAULT_LIMIT,
            max_limit: DEFAULT_MAX_LIMIT,
        }
    }
}

/// Raw `GET /weather` parameters. The snake_case aliases are the names the
/// first dashboard release used.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct WeatherParams {
    #[serde(alias = "province")]
    pub location: Option<String>,
    #[serde(rename = "dateExact", alias = "date_exact")]
    pub date_exact: Option<String>,
    #[serde(rename = "dateFrom", alias = "date_from")]
    pub date_from: Option<String>,
    #[serde(rename = "dateTo", alias = "date_to")]
    pub date_to: Option<String>,
    #[serde(rename = "includeTemperature", alias = "include_temp")]
    pub include_temperature: Option<String>,
    #[serde(rename = "includeHumidity", alias = "include_humidity")]
    pub include_humidity: Option<String>,
    #[serde(rename = "includeCondition", alias = "include_condition")]
    pub include_condition: Option<String>,
    pub limit: Option<String>,
}

impl WeatherParams {
    /// Parse every parameter, filling in defaults.
    ///
    /// An absent `location` falls back to the default province; an empty one
    /// (`location=`) lifts the location filter entirely.
    pub fn into_query(self, defaults: &QueryDefaults) -> Result<WeatherQuery, FieldError> {
        let location = match self.location {
            None => Some(defaults.location.clone()),
            Some(raw) if raw.trim().is_empty() => None,
            Some(raw) => Some(validate_location(&raw, &defaults.locations)?),
        };

        Ok(WeatherQuery {
            location,
            date_exact: optional(self.date_exact)
                .map(|v| parse_date("dateExact", &v))
                .transpose()?,
            date_from: optional(self.date_from)
                .map(|v| parse_date("dateFrom", &v))
                .transpose()?,
            date_to: optional(self.date_to)
                .map(|v| parse_date("dateTo", &v))
                .transpose()?,
            include_temperature: optional(self.include_temperature)
                .map(|v| parse_flag("includeTemperature", &v))
                .transpose()?
                .unwrap_or(true),
            include_humidity: optional(self.include_humidity)
                .map(|v| parse_flag("includeHumidity", &v))
                .transpose()?
                .unwrap_or(true),
            include_condition: optional(self.include_condition)
                .map(|v| parse_flag("includeCondition", &v))
                .transpose()?
                .unwrap_or(true),
            limit: optional(self.limit)
                .map(|v| parse_limit(&v, defaults.max_limit))
                .transpose()?
                .unwrap_or(defaults.limit),
        })
    }
}

fn optional(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Parse a `YYYY-MM-DD` date
pub fn parse_date(field: &'static str, value: &str) -> Result<NaiveDate, FieldError> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d").map_err(|_| {
        FieldError::new(
            field,
            format!("'{}' is not a valid date (expected YYYY-MM-DD)", value),
            format!("รูปแบบวันที่ '{}' ไม่ถูกต้อง (ต้องเป็น YYYY-MM-DD)", value),
        )
    })
}

/// Parse a boolean flag
pub fn parse_flag(field: &'static str, value: &str) -> Result<bool, FieldError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Ok(true),
        "false" | "0" | "no" | "off" => Ok(false),
        _ => Err(FieldError::new(
            field,
            format!("'{}' is not a valid boolean", value),
            format!("ค่า '{}' ต้องเป็น true หรือ false", value),
        )),
    }
}

/// Parse a result cap in `0..=max_limit`
pub fn parse_limit(value: &str, max_limit: i64) -> Result<i64, FieldError> {
    let limit: i64 = value.trim().parse().map_err(|_| {
        FieldError::new(
            "limit",
            format!("'{}' is not a valid integer", value),
            format!("ค่า '{}' ต้องเป็นจำนวนเต็ม", value),
        )
    })?;

    if !(0..=max_limit).contains(&limit) {
        return Err(FieldError::new(
            "limit",
            format!("limit must be between 0 and {}", max_limit),
            format!("จำนวนต้องอยู่ระหว่าง 0 ถึง {}", max_limit),
        ));
    }
    Ok(limit)
}

/// Check that a location is in the registry
pub fn validate_location(value: &str, registry: &LocationRegistry) -> Result<String, FieldError> {
    let location = value.trim();
    if registry.contains(location) {
        Ok(location.to_string())
    } else {
        Err(FieldError::new(
            "location",
            format!("'{}' is not a known province", location),
            format!("ไม่พบจังหวัด '{}'", location),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_params_use_defaults() {
        let query = WeatherParams::default()
            .into_query(&QueryDefaults::default())
            .unwrap();
        assert_eq!(query, WeatherQuery::default());
    }

    #[test]
    fn test_empty_location_lifts_filter() {
        let params = WeatherParams {
            location: Some(String::new()),
            ..Default::default()
        };
        let query = params.into_query(&QueryDefaults::default()).unwrap();
        assert_eq!(query.location, None);
    }

    #[test]
    fn test_full_params() {
        let params = WeatherParams {
            location: Some("เชียงใหม่".to_string()),
            date_from: Some("2024-01-01".to_string()),
            date_to: Some("2024-01-31".to_string()),
            include_humidity: Some("false".to_string()),
            limit: Some("10".to_string()),
            ..Default::default()
        };
        let query = params.into_query(&QueryDefaults::default()).unwrap();
        assert_eq!(query.location.as_deref(), Some("เชียงใหม่"));
        assert_eq!(query.date_from, NaiveDate::from_ymd_opt(2024, 1, 1));
        assert_eq!(query.date_to, NaiveDate::from_ymd_opt(2024, 1, 31));
        assert!(query.include_temperature);
        assert!(!query.include_humidity);
        assert_eq!(query.limit, 10);
    }

    #[test]
    fn test_bad_date_names_field() {
        let err = parse_date("dateExact", "2024-13-01").unwrap_err();
        assert_eq!(err.field, "dateExact");
        assert!(parse_date("dateFrom", "01/02/2024").is_err());
    }

    #[test]
    fn test_flags() {
        assert!(parse_flag("f", "TRUE").unwrap());
        assert!(parse_flag("f", "1").unwrap());
        assert!(!parse_flag("f", "off").unwrap());
        assert!(parse_flag("f", "maybe").is_err());
    }

    #[test]
    fn test_limit_bounds() {
        assert_eq!(parse_limit("0", 1000).unwrap(), 0);
        assert_eq!(parse_limit("1000", 1000).unwrap(), 1000);
        assert!(parse_limit("-1", 1000).is_err());
        assert!(parse_limit("1001", 1000).is_err());
        assert!(parse_limit("ten", 1000).is_err());
    }

    #[test]
    fn test_unknown_location_rejected() {
        let registry = LocationRegistry::thailand();
        assert_eq!(validate_location(DEFAULT_LOCATION, &registry).unwrap(), DEFAULT_LOCATION);
        let err = validate_location("Atlantis", &registry).unwrap_err();
        assert_eq!(err.field, "location");
    }

    #[test]
    fn test_date_range_combination_is_not_rejected() {
        let params = WeatherParams {
            date_from: Some("2024-02-01".to_string()),
            date_to: Some("2024-01-01".to_string()),
            ..Default::default()
        };
        assert!(params.into_query(&QueryDefaults::default()).is_ok());
    }
}
