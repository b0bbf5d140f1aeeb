pub mod config;
pub mod error;
pub mod offers;
pub mod telemetry;
