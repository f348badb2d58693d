use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::ids::{BranchId, ProductId, SaleId};

/// A recorded sale. Recording one decrements the matching stock record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sale {
    pub id: SaleId,
    pub branch: BranchId,
    pub product: ProductId,
    pub quantity: u32,
    pub date: DateTime<Utc>,
    #[serde(default)]
    pub branch_name: String,
    #[serde(default)]
    pub product_name: String,
}

/// Request body for recording a sale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SalePayload {
    pub branch: BranchId,
    pub product: ProductId,
    pub quantity: u32,
}
