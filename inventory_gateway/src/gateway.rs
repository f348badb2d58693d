//! Data Gateway abstraction.
//!
//! This module defines the [`DataGateway`] and [`AuthGateway`] traits, the
//! surface every screen uses to read and mutate branches, products, stock and
//! sales, and to manage the login session.
//!
//! [`RestGateway`](crate::rest::RestGateway) talks to the inventory REST API;
//! [`InMemoryGateway`](crate::memory::InMemoryGateway) reproduces the same
//! server behaviour in process. Both support dynamic dispatch
//! (`Arc<dyn DataGateway>`) so callers can pick one at runtime.
//!
//! # Example
//!
//! ```rust
//! use inventory_gateway::gateway::DataGateway;
//! use inventory_gateway::memory::InMemoryGateway;
//! use inventory_gateway::models::StockPayload;
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), inventory_gateway::GatewayError> {
//! let gateway = InMemoryGateway::new();
//! let branch = gateway.seed_branch("Main Store", "High Street");
//! let product = gateway.seed_product("Pen", "1.50".parse().unwrap());
//!
//! let payload = StockPayload { branch: branch.id, product: product.id, quantity: 10 };
//! gateway.create_stock(&payload).await?;
//! gateway.create_stock(&payload).await?;
//!
//! // The second add merged into the existing record.
//! let stock = gateway.list_stock().await?;
//! assert_eq!(stock.len(), 1);
//! assert_eq!(stock[0].quantity, 20);
//! # Ok(())
//! # }
//! ```

use std::path::PathBuf;

use async_trait::async_trait;
use secrecy::SecretString;
use shared_utils::ConfigError;
use snafu::{Backtrace, Snafu};

use crate::errors::GatewayError;
use crate::models::{
    Branch, BranchId, BranchPayload, PasswordResetConfirm, Product, ProductId, ProductPayload,
    Sale, SaleId, SalePayload, SignupPayload, StockId, StockPayload, StockRecord, User,
};

/// Result alias used by every gateway call.
pub type GatewayResult<T> = Result<T, GatewayError>;

/// Reads and mutates the inventory collections.
///
/// Mutations return the server's view of the affected resource. Callers that
/// render collections should reload them after a mutation rather than patch
/// their snapshot, since the server may merge (see [`DataGateway::create_stock`]).
#[async_trait]
pub trait DataGateway: Send + Sync {
    async fn list_branches(&self) -> GatewayResult<Vec<Branch>>;
    async fn get_branch(&self, id: BranchId) -> GatewayResult<Branch>;
    async fn create_branch(&self, payload: &BranchPayload) -> GatewayResult<Branch>;
    async fn update_branch(&self, id: BranchId, payload: &BranchPayload) -> GatewayResult<Branch>;
    /// Deletes a branch together with its stock and sales.
    async fn delete_branch(&self, id: BranchId) -> GatewayResult<()>;

    async fn list_products(&self) -> GatewayResult<Vec<Product>>;
    async fn get_product(&self, id: ProductId) -> GatewayResult<Product>;
    async fn create_product(&self, payload: &ProductPayload) -> GatewayResult<Product>;
    async fn update_product(
        &self,
        id: ProductId,
        payload: &ProductPayload,
    ) -> GatewayResult<Product>;
    /// Deletes a product together with its stock and sales.
    async fn delete_product(&self, id: ProductId) -> GatewayResult<()>;

    async fn list_stock(&self) -> GatewayResult<Vec<StockRecord>>;
    async fn get_stock(&self, id: StockId) -> GatewayResult<StockRecord>;
    /// Adds stock for a (branch, product) pair.
    ///
    /// If a record for the pair already exists the quantity is added to it and
    /// the merged record is returned; no second record is created.
    async fn create_stock(&self, payload: &StockPayload) -> GatewayResult<StockRecord>;
    async fn update_stock(&self, id: StockId, payload: &StockPayload)
    -> GatewayResult<StockRecord>;
    async fn delete_stock(&self, id: StockId) -> GatewayResult<()>;

    async fn list_sales(&self) -> GatewayResult<Vec<Sale>>;
    /// Records a sale and decrements the matching stock record.
    ///
    /// Fails with [`GatewayError::NonField`] when the pair has no stock record
    /// or not enough units. This server-side check is the authoritative one.
    async fn record_sale(&self, payload: &SalePayload) -> GatewayResult<Sale>;
    /// Deletes a sale and restores its quantity to stock.
    async fn delete_sale(&self, id: SaleId) -> GatewayResult<()>;
}

/// Login session management.
#[async_trait]
pub trait AuthGateway: Send + Sync {
    async fn login(&self, username: &str, password: &SecretString) -> GatewayResult<User>;
    async fn logout(&self) -> GatewayResult<()>;
    /// Returns the logged-in user, or `None` for an anonymous session.
    async fn current_user(&self) -> GatewayResult<Option<User>>;
    async fn signup(&self, payload: &SignupPayload) -> GatewayResult<()>;
    async fn request_password_reset(&self, email: &str) -> GatewayResult<()>;
    async fn confirm_password_reset(&self, payload: &PasswordResetConfirm) -> GatewayResult<()>;
}

/// Errors that can occur while constructing a gateway.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum GatewayInitError {
    /// An environment variable was missing or malformed.
    #[snafu(display("Invalid gateway configuration: {source}"))]
    Config {
        source: ConfigError,
        backtrace: Backtrace,
    },

    /// The API base URL does not parse.
    #[snafu(display("Invalid API base URL {url:?}: {source}"))]
    InvalidBaseUrl {
        url: String,
        source: url::ParseError,
        backtrace: Backtrace,
    },

    /// The API base URL cannot have paths joined beneath it.
    #[snafu(display("API base URL {url:?} cannot be used as a base"))]
    UnusableBaseUrl { url: String, backtrace: Backtrace },

    /// The configuration file could not be read.
    #[snafu(display("Failed to read config file {}: {source}", path.display()))]
    ReadConfig {
        path: PathBuf,
        source: std::io::Error,
        backtrace: Backtrace,
    },

    /// The configuration file is not valid TOML for [`GatewayConfig`](crate::config::GatewayConfig).
    #[snafu(display("Failed to parse gateway config: {source}"))]
    ParseConfig {
        source: toml::de::Error,
        backtrace: Backtrace,
    },

    /// failed to init reqwest client
    #[snafu(display("Failed to build HTTP client: {source}"))]
    ClientBuild {
        source: reqwest::Error,
        backtrace: Backtrace,
    },
}
