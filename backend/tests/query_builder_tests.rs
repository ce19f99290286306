//! Query builder property tests

use chrono::NaiveDate;
use proptest::prelude::*;
use shared::WeatherQuery;
use weather_backend::store::{build_query, QueryParam};

fn date_strategy() -> impl Strategy<Value = NaiveDate> {
    (2000i32..2100, 1u32..=12, 1u32..=28)
        .prop_map(|(y, m, d)| NaiveDate::from_ymd_opt(y, m, d).unwrap())
}

prop_compose! {
    fn query_strategy()(
        location in proptest::option::of(".{0,40}"),
        date_exact in proptest::option::of(date_strategy()),
        date_from in proptest::option::of(date_strategy()),
        date_to in proptest::option::of(date_strategy()),
        include_temperature in any::<bool>(),
        include_humidity in any::<bool>(),
        include_condition in any::<bool>(),
        limit in 0i64..=1000,
    ) -> WeatherQuery {
        WeatherQuery {
            location,
            date_exact,
            date_from,
            date_to,
            include_temperature,
            include_humidity,
            include_condition,
            limit,
        }
    }
}

/// Highest `$n` in the statement
fn max_placeholder(sql: &str) -> usize {
    sql.split('$')
        .skip(1)
        .filter_map(|rest| {
            let digits: String = rest.chars().take_while(|c| c.is_ascii_digit()).collect();
            digits.parse().ok()
        })
        .max()
        .unwrap_or(0)
}

proptest! {
    #[test]
    fn placeholders_match_params(query in query_strategy()) {
        let built = build_query(&query);
        prop_assert_eq!(max_placeholder(&built.sql), built.params.len());
        prop_assert_eq!(built.sql.matches('$').count(), built.params.len());
    }

    #[test]
    fn limit_is_last_param(query in query_strategy()) {
        let built = build_query(&query);
        prop_assert_eq!(built.params.last(), Some(&QueryParam::Limit(query.limit)));
        let expected_suffix = format!(" ORDER BY date DESC, time DESC LIMIT ${}", built.params.len());
        prop_assert!(built.sql.ends_with(&expected_suffix));
    }

    #[test]
    fn location_text_never_reaches_sql(location in "'[a-z; -]{4,20}") {
        let query = WeatherQuery {
            location: Some(location.clone()),
            ..WeatherQuery::default()
        };
        let built = build_query(&query);
        prop_assert!(!built.sql.contains(&location));
        prop_assert_eq!(&built.params[0], &QueryParam::Text(location));
    }

    #[test]
    fn optional_columns_follow_flags(query in query_strategy()) {
        let built = build_query(&query);
        let select = built.sql.split(" FROM ").next().unwrap_or_default().to_string();
        prop_assert!(select.starts_with("SELECT location, date, time"));
        prop_assert_eq!(select.contains("temperature_c"), query.include_temperature);
        prop_assert_eq!(select.contains("humidity_percent"), query.include_humidity);
        prop_assert_eq!(select.contains("condition"), query.include_condition);
    }
}

#[test]
fn test_all_filters_in_fixed_order() {
    let query = WeatherQuery {
        location: Some("ตาก".to_string()),
        date_exact: NaiveDate::from_ymd_opt(2024, 1, 5),
        date_from: NaiveDate::from_ymd_opt(2024, 1, 1),
        date_to: NaiveDate::from_ymd_opt(2024, 1, 31),
        limit: 5,
        ..WeatherQuery::default()
    };
    let built = build_query(&query);
    assert!(built.sql.contains(
        "WHERE TRUE AND location = $1 AND date = $2 AND date >= $3 AND date <= $4 ORDER BY"
    ));
    assert_eq!(built.params.len(), 5);
}

#[test]
fn test_no_filters_only_binds_limit() {
    let query = WeatherQuery {
        location: None,
        ..WeatherQuery::default()
    };
    let built = build_query(&query);
    assert_eq!(
        built.sql,
        "SELECT location, date, time, temperature_c, humidity_percent, condition \
         FROM weather_readings WHERE TRUE ORDER BY date DESC, time DESC LIMIT $1"
    );
    assert_eq!(built.params, vec![QueryParam::Limit(100)]);
}
