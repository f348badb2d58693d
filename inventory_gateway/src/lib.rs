//! Client-side access to the inventory service.
//!
//! [`DataGateway`] and [`AuthGateway`] are the seams every screen talks
//! through. [`RestGateway`] speaks to the HTTP API with a cookie session and
//! CSRF header; [`InMemoryGateway`] keeps the same rules in process for tests
//! and offline use.

pub mod config;
pub mod errors;
pub mod gateway;
pub mod memory;
pub mod models;
pub mod rest;
pub mod session;

pub use config::GatewayConfig;
pub use errors::{FieldErrors, GatewayError};
pub use gateway::{AuthGateway, DataGateway, GatewayInitError, GatewayResult};
pub use memory::InMemoryGateway;
pub use rest::RestGateway;
pub use session::{SessionContext, SessionState};
