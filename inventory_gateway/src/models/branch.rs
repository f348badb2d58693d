use serde::{Deserialize, Serialize};

use crate::models::ids::BranchId;

/// A physical store location.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Branch {
    pub id: BranchId,
    pub name: String,
    pub location: String,
}

/// Request body for creating or updating a branch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BranchPayload {
    pub name: String,
    pub location: String,
}
