//! Shared types for the Thai weather harvester
//!
//! Domain data with no I/O: the province registry, the condition-code
//! catalog, forecast readings and read-API filters.

pub mod catalog;
pub mod locations;
pub mod models;
pub mod validation;

pub use catalog::*;
pub use locations::*;
pub use models::*;
pub use validation::*;
