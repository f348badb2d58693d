//! Client-side form state and validation.

use inventory_gateway::{
    GatewayError,
    models::{
        Branch, BranchId, BranchPayload, Product, ProductId, ProductPayload, SalePayload,
        StockPayload, StockRecord,
    },
};
use rust_decimal::Decimal;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Please fill in all fields")]
    MissingFields,
    #[error("Please fill in product name and price")]
    MissingProductFields,
}

/// Failure of a submit: either the form never left the client or the
/// gateway rejected it.
#[derive(Debug, Error)]
pub enum SubmitError {
    #[error(transparent)]
    Invalid(#[from] ValidationError),
    #[error(transparent)]
    Gateway(#[from] GatewayError),
}

impl SubmitError {
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, SubmitError::Gateway(err) if err.is_unauthorized())
    }
}

/// The add/edit stock form. Unset fields are `None`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StockForm {
    pub branch: Option<BranchId>,
    pub product: Option<ProductId>,
    pub quantity: Option<u32>,
}

impl StockForm {
    pub fn from_record(record: &StockRecord) -> Self {
        Self {
            branch: Some(record.branch),
            product: Some(record.product),
            quantity: Some(record.quantity),
        }
    }

    /// Zero is a valid stock level here; the server decides whether a zero
    /// add makes sense.
    pub fn to_payload(&self) -> Result<StockPayload, ValidationError> {
        match (self.branch, self.product, self.quantity) {
            (Some(branch), Some(product), Some(quantity)) => Ok(StockPayload {
                branch,
                product,
                quantity,
            }),
            _ => Err(ValidationError::MissingFields),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SaleForm {
    pub branch: Option<BranchId>,
    pub product: Option<ProductId>,
    pub quantity: Option<u32>,
}

impl SaleForm {
    /// A sale of zero units counts as a missing quantity.
    pub fn to_payload(&self) -> Result<SalePayload, ValidationError> {
        match (self.branch, self.product, self.quantity) {
            (Some(branch), Some(product), Some(quantity)) if quantity > 0 => Ok(SalePayload {
                branch,
                product,
                quantity,
            }),
            _ => Err(ValidationError::MissingFields),
        }
    }
}

/// The add/edit product form.
///
/// `branch` and `stock_quantity` only apply when adding: together they seed
/// stock for the new product at that branch.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ProductForm {
    pub name: String,
    pub price: Option<Decimal>,
    pub branch: Option<BranchId>,
    pub stock_quantity: Option<u32>,
}

impl ProductForm {
    pub fn from_product(product: &Product) -> Self {
        Self {
            name: product.name.clone(),
            price: Some(product.price),
            branch: None,
            stock_quantity: None,
        }
    }

    /// Whether submitting as a new product would also seed stock.
    pub fn seeds_stock(&self) -> bool {
        self.branch.is_some() && self.stock_quantity.is_some()
    }

    pub fn to_payload(&self, editing: bool) -> Result<ProductPayload, ValidationError> {
        let name = self.name.trim();
        let price = match self.price {
            Some(price) if !name.is_empty() => price,
            _ => return Err(ValidationError::MissingProductFields),
        };
        let payload = ProductPayload::new(name, price);
        match (editing, self.branch, self.stock_quantity) {
            (false, Some(branch), Some(quantity)) => Ok(payload.with_initial_stock(branch, quantity)),
            _ => Ok(payload),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct BranchForm {
    pub name: String,
    pub location: String,
}

impl BranchForm {
    pub fn from_branch(branch: &Branch) -> Self {
        Self {
            name: branch.name.clone(),
            location: branch.location.clone(),
        }
    }

    pub fn to_payload(&self) -> Result<BranchPayload, ValidationError> {
        let (name, location) = (self.name.trim(), self.location.trim());
        if name.is_empty() || location.is_empty() {
            return Err(ValidationError::MissingFields);
        }
        Ok(BranchPayload {
            name: name.to_string(),
            location: location.to_string(),
        })
    }
}
