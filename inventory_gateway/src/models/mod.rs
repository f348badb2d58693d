pub mod branch;
pub mod ids;
pub mod product;
pub mod sale;
pub mod stock;
pub mod user;

pub use branch::{Branch, BranchPayload};
pub use ids::{BranchId, ProductId, SaleId, StockId, UserId};
pub use product::{Product, ProductPayload};
pub use sale::{Sale, SalePayload};
pub use stock::{StockPayload, StockRecord};
pub use user::{AuthStatus, PasswordResetConfirm, SignupPayload, User};
