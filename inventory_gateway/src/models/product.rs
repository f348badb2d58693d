use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::models::ids::{BranchId, ProductId};

/// An item that can be stocked and sold at any branch.
///
/// Products are global; how many units a branch holds lives in
/// [`StockRecord`](crate::models::StockRecord).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    /// Unit price. Travels as a decimal string (`"12.50"`).
    pub price: Decimal,
}

/// Request body for creating or updating a product.
///
/// When both `branch` and `stock_quantity` are set on create, the server also
/// seeds stock for that branch, adding to an existing record if there is one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductPayload {
    pub name: String,
    pub price: Decimal,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub branch: Option<BranchId>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub stock_quantity: Option<u32>,
}

impl ProductPayload {
    pub fn new(name: impl Into<String>, price: Decimal) -> Self {
        Self {
            name: name.into(),
            price,
            branch: None,
            stock_quantity: None,
        }
    }

    /// Requests initial stock at `branch` alongside the product.
    pub fn with_initial_stock(mut self, branch: BranchId, quantity: u32) -> Self {
        self.branch = Some(branch);
        self.stock_quantity = Some(quantity);
        self
    }
}
