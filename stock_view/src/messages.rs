//! User-facing status text.

use inventory_gateway::GatewayError;

pub const FILL_ALL_FIELDS: &str = "Please fill in all fields";
pub const LOAD_ERROR: &str = "Error loading data";
pub const NOT_FOUND: &str = "Branch or product not found. Please refresh the page and try again.";
pub const SERVER_ERROR: &str = "Server error. Please try again later.";
pub const CONNECTIVITY_ERROR: &str = "Unable to connect to server. Please check your connection.";
pub const SESSION_EXPIRED: &str = "Your session has expired. Please log in again.";

pub const STOCK_ADDED: &str = "Stock added successfully! If stock already existed for this branch-product combination, quantity was added to existing stock.";
pub const STOCK_UPDATED: &str = "Stock updated successfully!";
pub const STOCK_DELETED: &str = "Stock deleted successfully!";
pub const ADD_STOCK_FAILED: &str = "Error adding stock.";
pub const UPDATE_STOCK_FAILED: &str = "Error updating stock.";
pub const DELETE_STOCK_FAILED: &str = "Error deleting stock. Please try again.";

pub const SALE_RECORDED: &str = "Sale recorded successfully! Stock has been updated.";
pub const SALE_DELETED: &str = "Sale deleted successfully! Stock has been restored.";
pub const RECORD_SALE_FAILED: &str = "Error recording sale. Please try again.";
pub const DELETE_SALE_FAILED: &str = "Error deleting sale. Please try again.";

pub const PRODUCT_ADDED_WITH_STOCK: &str =
    "Product added successfully! Stock has been added to the selected branch.";
pub const PRODUCT_ADDED: &str = "Product added successfully! You can add stock for this product in the Stock management page.";
pub const PRODUCT_UPDATED: &str = "Product updated successfully!";
pub const PRODUCT_DELETED: &str = "Product deleted successfully!";
pub const ADD_PRODUCT_FAILED: &str = "Error adding product.";
pub const UPDATE_PRODUCT_FAILED: &str = "Error updating product.";
pub const DELETE_PRODUCT_FAILED: &str = "Error deleting product. Please try again.";

pub const BRANCHES_LOAD_ERROR: &str = "Error loading branches";
pub const BRANCH_ADDED: &str = "Branch added successfully!";
pub const BRANCH_UPDATED: &str = "Branch updated successfully!";
pub const BRANCH_DELETED: &str = "Branch deleted successfully!";
pub const ADD_BRANCH_FAILED: &str = "Error adding branch.";
pub const UPDATE_BRANCH_FAILED: &str = "Error updating branch.";
pub const DELETE_BRANCH_FAILED: &str = "Error deleting branch. Please try again.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageKind {
    Success,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusMessage {
    pub kind: MessageKind,
    pub text: String,
}

impl StatusMessage {
    pub fn success(text: impl Into<String>) -> Self {
        Self {
            kind: MessageKind::Success,
            text: text.into(),
        }
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self {
            kind: MessageKind::Error,
            text: text.into(),
        }
    }

    pub fn is_error(&self) -> bool {
        self.kind == MessageKind::Error
    }
}

/// Turns a gateway failure into the text shown to the user. `fallback` is
/// used when the response carried nothing presentable.
pub fn describe_error(err: &GatewayError, fallback: &str) -> String {
    match err {
        GatewayError::Field(errors) => errors.to_string(),
        GatewayError::NonField(message) => message.clone(),
        GatewayError::NotFound { .. } => NOT_FOUND.to_string(),
        GatewayError::Server { .. } => SERVER_ERROR.to_string(),
        GatewayError::Connectivity(_) => CONNECTIVITY_ERROR.to_string(),
        GatewayError::Unauthorized => SESSION_EXPIRED.to_string(),
        GatewayError::Unexpected { .. } | GatewayError::Decode(_) | GatewayError::Endpoint(_) => {
            fallback.to_string()
        }
    }
}
