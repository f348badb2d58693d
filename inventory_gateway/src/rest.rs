//! REST implementation of the Data Gateway.

mod client;
mod csrf;

pub use client::RestGateway;
