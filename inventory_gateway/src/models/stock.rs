use serde::{Deserialize, Serialize};

use crate::models::ids::{BranchId, ProductId, StockId};

/// Quantity of one product held at one branch.
///
/// `branch_name` and `product_name` are denormalized copies supplied by the
/// server so a listing can be rendered without joining against the branch and
/// product collections. They may be stale relative to those collections.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockRecord {
    pub id: StockId,
    pub branch: BranchId,
    pub product: ProductId,
    pub quantity: u32,
    #[serde(default)]
    pub branch_name: String,
    #[serde(default)]
    pub product_name: String,
}

/// Request body for adding or updating stock.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockPayload {
    pub branch: BranchId,
    pub product: ProductId,
    pub quantity: u32,
}
