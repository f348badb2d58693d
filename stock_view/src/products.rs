//! State behind the Products screen.

use std::sync::Arc;

use inventory_gateway::{
    DataGateway, GatewayResult,
    models::{Branch, Product, ProductId},
};
use tracing::warn;

use crate::{
    forms::{ProductForm, SubmitError},
    messages::{self, StatusMessage, describe_error},
};

pub struct ProductsViewModel {
    gateway: Arc<dyn DataGateway>,
    products: Vec<Product>,
    branches: Vec<Branch>,
    form: ProductForm,
    editing: Option<ProductId>,
    message: Option<StatusMessage>,
}

impl ProductsViewModel {
    pub fn new(gateway: Arc<dyn DataGateway>) -> Self {
        Self {
            gateway,
            products: Vec::new(),
            branches: Vec::new(),
            form: ProductForm::default(),
            editing: None,
            message: None,
        }
    }

    pub fn products(&self) -> &[Product] {
        &self.products
    }

    /// Branches offered for a new product's initial stock.
    pub fn branches(&self) -> &[Branch] {
        &self.branches
    }

    pub fn form(&self) -> &ProductForm {
        &self.form
    }

    pub fn form_mut(&mut self) -> &mut ProductForm {
        &mut self.form
    }

    pub fn editing(&self) -> Option<ProductId> {
        self.editing
    }

    pub fn message(&self) -> Option<&StatusMessage> {
        self.message.as_ref()
    }

    pub async fn load(&mut self) -> GatewayResult<()> {
        let gateway = Arc::clone(&self.gateway);
        match tokio::try_join!(gateway.list_products(), gateway.list_branches()) {
            Ok((products, branches)) => {
                self.products = products;
                self.branches = branches;
                Ok(())
            }
            Err(err) => {
                warn!(error = %err, "failed to load products screen");
                self.message = Some(StatusMessage::error(messages::LOAD_ERROR));
                Err(err)
            }
        }
    }

    pub fn begin_edit(&mut self, product: &Product) {
        self.form = ProductForm::from_product(product);
        self.editing = Some(product.id);
        self.message = None;
    }

    pub fn cancel_edit(&mut self) {
        self.form = ProductForm::default();
        self.editing = None;
        self.message = None;
    }

    pub async fn submit(&mut self) -> Result<Product, SubmitError> {
        let payload = match self.form.to_payload(self.editing.is_some()) {
            Ok(payload) => payload,
            Err(err) => {
                self.message = Some(StatusMessage::error(err.to_string()));
                return Err(err.into());
            }
        };

        let (result, success, fallback) = match self.editing {
            Some(id) => (
                self.gateway.update_product(id, &payload).await,
                messages::PRODUCT_UPDATED,
                messages::UPDATE_PRODUCT_FAILED,
            ),
            None => (
                self.gateway.create_product(&payload).await,
                if self.form.seeds_stock() {
                    messages::PRODUCT_ADDED_WITH_STOCK
                } else {
                    messages::PRODUCT_ADDED
                },
                messages::ADD_PRODUCT_FAILED,
            ),
        };

        let product = match result {
            Ok(product) => product,
            Err(err) => {
                warn!(error = %err, "product mutation rejected");
                self.message = Some(StatusMessage::error(describe_error(&err, fallback)));
                return Err(err.into());
            }
        };

        self.form = ProductForm::default();
        self.editing = None;
        self.load().await?;
        self.message = Some(StatusMessage::success(success));
        Ok(product)
    }

    /// Deletes a product; the server removes its stock and sales with it.
    pub async fn delete(&mut self, id: ProductId) -> GatewayResult<()> {
        if let Err(err) = self.gateway.delete_product(id).await {
            warn!(error = %err, %id, "product delete rejected");
            self.message = Some(StatusMessage::error(describe_error(
                &err,
                messages::DELETE_PRODUCT_FAILED,
            )));
            return Err(err);
        }

        if self.editing == Some(id) {
            self.cancel_edit();
        }
        self.load().await?;
        self.message = Some(StatusMessage::success(messages::PRODUCT_DELETED));
        Ok(())
    }
}
