//! State behind the Sales screen.

use std::{fmt, sync::Arc};

use inventory_gateway::{
    DataGateway, GatewayResult,
    models::{Branch, Product, Sale, SaleId, StockRecord},
};
use tracing::{info, warn};

use crate::{
    forms::{SaleForm, SubmitError},
    messages::{self, StatusMessage, describe_error},
};

/// The requested quantity exceeds what the last snapshot showed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Shortfall {
    pub requested: u32,
    pub available: u32,
}

impl fmt::Display for Shortfall {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Not enough stock. Available: {}", self.available)
    }
}

pub struct SalesViewModel {
    gateway: Arc<dyn DataGateway>,
    branches: Vec<Branch>,
    products: Vec<Product>,
    stock: Vec<StockRecord>,
    sales: Vec<Sale>,
    form: SaleForm,
    message: Option<StatusMessage>,
}

impl SalesViewModel {
    pub fn new(gateway: Arc<dyn DataGateway>) -> Self {
        Self {
            gateway,
            branches: Vec::new(),
            products: Vec::new(),
            stock: Vec::new(),
            sales: Vec::new(),
            form: SaleForm::default(),
            message: None,
        }
    }

    pub fn branches(&self) -> &[Branch] {
        &self.branches
    }

    pub fn products(&self) -> &[Product] {
        &self.products
    }

    pub fn stock(&self) -> &[StockRecord] {
        &self.stock
    }

    pub fn sales(&self) -> &[Sale] {
        &self.sales
    }

    pub fn form(&self) -> &SaleForm {
        &self.form
    }

    pub fn form_mut(&mut self) -> &mut SaleForm {
        &mut self.form
    }

    pub fn message(&self) -> Option<&StatusMessage> {
        self.message.as_ref()
    }

    pub async fn load(&mut self) -> GatewayResult<()> {
        let gateway = Arc::clone(&self.gateway);
        let result = tokio::try_join!(
            gateway.list_branches(),
            gateway.list_products(),
            gateway.list_stock(),
            gateway.list_sales(),
        );
        match result {
            Ok((branches, products, stock, sales)) => {
                self.branches = branches;
                self.products = products;
                self.stock = stock;
                self.sales = sales;
                Ok(())
            }
            Err(err) => {
                warn!(error = %err, "failed to load sales screen");
                self.message = Some(StatusMessage::error(messages::LOAD_ERROR));
                Err(err)
            }
        }
    }

    /// Snapshot quantity for the selected branch and product, 0 if either is
    /// unset or no record exists.
    pub fn available_stock(&self) -> u32 {
        let (Some(branch), Some(product)) = (self.form.branch, self.form.product) else {
            return 0;
        };
        self.stock
            .iter()
            .find(|s| s.branch == branch && s.product == product)
            .map_or(0, |s| s.quantity)
    }

    /// Advisory only: the snapshot may be stale, so this never blocks
    /// [`submit`](Self::submit).
    pub fn advisory_shortfall(&self) -> Option<Shortfall> {
        let requested = self.form.quantity?;
        let available = self.available_stock();
        (requested > available).then_some(Shortfall {
            requested,
            available,
        })
    }

    /// Records the sale. The server performs the authoritative stock check.
    pub async fn submit(&mut self) -> Result<Sale, SubmitError> {
        let payload = match self.form.to_payload() {
            Ok(payload) => payload,
            Err(err) => {
                self.message = Some(StatusMessage::error(err.to_string()));
                return Err(err.into());
            }
        };
        if let Some(shortfall) = self.advisory_shortfall() {
            info!(
                requested = shortfall.requested,
                available = shortfall.available,
                "sale exceeds stock snapshot, sending anyway"
            );
        }

        let sale = match self.gateway.record_sale(&payload).await {
            Ok(sale) => sale,
            Err(err) => {
                warn!(error = %err, "sale rejected");
                self.message = Some(StatusMessage::error(describe_error(
                    &err,
                    messages::RECORD_SALE_FAILED,
                )));
                return Err(err.into());
            }
        };

        self.form = SaleForm::default();
        self.load().await?;
        self.message = Some(StatusMessage::success(messages::SALE_RECORDED));
        Ok(sale)
    }

    /// Deletes a sale; the server puts its quantity back into stock.
    pub async fn delete_sale(&mut self, id: SaleId) -> GatewayResult<()> {
        if let Err(err) = self.gateway.delete_sale(id).await {
            warn!(error = %err, %id, "sale delete rejected");
            self.message = Some(StatusMessage::error(describe_error(
                &err,
                messages::DELETE_SALE_FAILED,
            )));
            return Err(err);
        }
        self.load().await?;
        self.message = Some(StatusMessage::success(messages::SALE_DELETED));
        Ok(())
    }
}
