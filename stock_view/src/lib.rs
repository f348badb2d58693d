//! View-models for the inventory screens.
//!
//! The Stock screen is the centre of this crate: [`StockViewModel`] holds the
//! snapshots and [`compute_rows`] turns them into either per-product totals or
//! one branch's records. Products, branches, sales, the dashboard and the
//! login gate sit beside it and share the same [`DataGateway`](inventory_gateway::DataGateway).

pub mod auth_gate;
pub mod branches;
pub mod dashboard;
pub mod filter;
pub mod forms;
pub mod messages;
pub mod products;
pub mod rows;
pub mod sales;
pub mod view_model;

pub use auth_gate::{Navigation, Route};
pub use branches::BranchesViewModel;
pub use dashboard::DashboardSummary;
pub use filter::{BranchFilter, FilterAction, FilterState};
pub use forms::{BranchForm, ProductForm, SaleForm, StockForm, SubmitError, ValidationError};
pub use messages::{MessageKind, StatusMessage};
pub use products::ProductsViewModel;
pub use rows::{AggregatedStockRow, StockRows, compute_rows};
pub use sales::SalesViewModel;
pub use view_model::{StockMutation, StockViewModel};
