//! Filtered SELECT builder for the read API
//!
//! Every user-supplied value becomes a positional parameter; only fixed
//! column names and operators are written into the SQL text.

use std::fmt::Write as _;

use chrono::NaiveDate;
use shared::WeatherQuery;

use super::READINGS_TABLE;

/// Value bound to one `$n` placeholder
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryParam {
    Text(String),
    Date(NaiveDate),
    Limit(i64),
}

/// SQL text plus its parameters, in placeholder order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuiltQuery {
    pub sql: String,
    pub params: Vec<QueryParam>,
}

impl BuiltQuery {
    fn push_predicate(&mut self, predicate: &str, param: QueryParam) {
        self.params.push(param);
        // Writing to a String cannot fail
        let _ = write!(self.sql, " AND {} ${}", predicate, self.params.len());
    }
}

/// Columns projected for a query: location, date and time always, then the
/// optional ones in fixed order
pub fn projected_columns(query: &WeatherQuery) -> Vec<&'static str> {
    let mut columns = vec!["location", "date", "time"];
    if query.include_temperature {
        columns.push("temperature_c");
    }
    if query.include_humidity {
        columns.push("humidity_percent");
    }
    if query.include_condition {
        columns.push("condition");
    }
    columns
}

/// Build the statement for a set of filters.
///
/// Predicates are ANDed after a `TRUE` anchor in the order location, exact
/// date, lower bound, upper bound. The limit is always the last parameter.
pub fn build_query(query: &WeatherQuery) -> BuiltQuery {
    let mut built = BuiltQuery {
        sql: format!(
            "SELECT {} FROM {} WHERE TRUE",
            projected_columns(query).join(", "),
            READINGS_TABLE
        ),
        params: Vec::new(),
    };

    if let Some(location) = &query.location {
        built.push_predicate("location =", QueryParam::Text(location.clone()));
    }
    if let Some(date) = query.date_exact {
        built.push_predicate("date =", QueryParam::Date(date));
    }
    if let Some(date) = query.date_from {
        built.push_predicate("date >=", QueryParam::Date(date));
    }
    if let Some(date) = query.date_to {
        built.push_predicate("date <=", QueryParam::Date(date));
    }

    built.params.push(QueryParam::Limit(query.limit));
    let _ = write!(
        built.sql,
        " ORDER BY date DESC, time DESC LIMIT ${}",
        built.params.len()
    );

    built
}
