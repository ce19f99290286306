//! Harvest and read services

pub mod harvest;
pub mod throttle;
pub mod weather;

pub use harvest::{
    parse_forecast, CycleSummary, HarvestReport, HarvestService, LocationOutcome, ParseError,
    SkipReason, SkippedLocation,
};
pub use throttle::{MinIntervalGate, Throttle};
pub use weather::WeatherService;
