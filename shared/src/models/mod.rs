//! Domain models for the weather harvester and read API

mod weather;

pub use weather::*;
