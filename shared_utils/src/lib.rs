//! Small helpers shared by the inventory crates.

pub mod config;
pub mod env;

pub use config::ConfigError;
