//! HTTP handlers

pub mod health;
pub mod weather;

pub use health::*;
pub use weather::*;
