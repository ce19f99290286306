//! External API integrations

pub mod forecast;

pub use forecast::{FetchError, ForecastSource, RawForecast, TmdForecastClient};
