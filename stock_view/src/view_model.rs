//! State behind the Stock screen.
//!
//! [`StockViewModel`] keeps read-only snapshots of stock, branches and
//! products, and derives the displayed rows from them on demand. Every
//! mutation goes to the gateway and is followed by a full reload; nothing is
//! patched locally.

use std::sync::Arc;

use inventory_gateway::{
    DataGateway, GatewayResult,
    models::{Branch, BranchId, Product, StockId, StockPayload, StockRecord},
};
use tracing::{debug, warn};

use crate::{
    filter::{self, BranchFilter, FilterAction, FilterState},
    forms::{StockForm, SubmitError},
    messages::{self, StatusMessage, describe_error},
    rows::{StockRows, compute_rows},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StockMutation {
    Create(StockPayload),
    Update(StockId, StockPayload),
    Delete(StockId),
}

pub struct StockViewModel {
    gateway: Arc<dyn DataGateway>,
    records: Vec<StockRecord>,
    branches: Vec<Branch>,
    products: Vec<Product>,
    filter: FilterState,
    form: StockForm,
    editing: Option<StockId>,
    loading: bool,
    message: Option<StatusMessage>,
}

impl StockViewModel {
    pub fn new(gateway: Arc<dyn DataGateway>) -> Self {
        Self {
            gateway,
            records: Vec::new(),
            branches: Vec::new(),
            products: Vec::new(),
            filter: FilterState::default(),
            form: StockForm::default(),
            editing: None,
            loading: false,
            message: None,
        }
    }

    pub fn records(&self) -> &[StockRecord] {
        &self.records
    }

    pub fn branches(&self) -> &[Branch] {
        &self.branches
    }

    pub fn products(&self) -> &[Product] {
        &self.products
    }

    pub fn filter(&self) -> BranchFilter {
        self.filter.filter
    }

    pub fn form(&self) -> &StockForm {
        &self.form
    }

    pub fn form_mut(&mut self) -> &mut StockForm {
        &mut self.form
    }

    /// Id of the record currently being edited.
    pub fn editing(&self) -> Option<StockId> {
        self.editing
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn message(&self) -> Option<&StatusMessage> {
        self.message.as_ref()
    }

    /// Fetches stock, branches and products together and replaces all three
    /// snapshots. On failure the old snapshots stay.
    pub async fn load(&mut self) -> GatewayResult<()> {
        self.loading = true;
        let gateway = Arc::clone(&self.gateway);
        let result = tokio::try_join!(
            gateway.list_stock(),
            gateway.list_branches(),
            gateway.list_products(),
        );
        self.loading = false;

        match result {
            Ok((records, branches, products)) => {
                debug!(records = records.len(), "stock snapshot loaded");
                self.records = records;
                self.branches = branches;
                self.products = products;
                Ok(())
            }
            Err(err) => {
                warn!(error = %err, "failed to load stock screen");
                self.message = Some(StatusMessage::error(messages::LOAD_ERROR));
                Err(err)
            }
        }
    }

    pub fn rows(&self) -> StockRows {
        compute_rows(&self.records, self.filter.filter)
    }

    /// `None` shows all branches aggregated. Never refetches.
    pub fn set_filter(&mut self, branch: Option<BranchId>) {
        self.dispatch(FilterAction::Set(branch));
    }

    pub fn dispatch(&mut self, action: FilterAction) {
        self.filter = filter::reduce(self.filter, action);
    }

    pub fn selected_branch_label(&self) -> Option<String> {
        filter::branch_label(self.filter.filter, &self.branches)
    }

    async fn send(&self, mutation: StockMutation) -> GatewayResult<()> {
        match mutation {
            StockMutation::Create(payload) => self.gateway.create_stock(&payload).await.map(|_| ()),
            StockMutation::Update(id, payload) => {
                self.gateway.update_stock(id, &payload).await.map(|_| ())
            }
            StockMutation::Delete(id) => self.gateway.delete_stock(id).await,
        }
    }

    /// Sends `mutation` and, if the gateway accepts it, reloads every snapshot.
    pub async fn apply_mutation(&mut self, mutation: StockMutation) -> GatewayResult<()> {
        self.send(mutation).await?;
        self.load().await
    }

    pub fn begin_edit(&mut self, record: &StockRecord) {
        self.form = StockForm::from_record(record);
        self.editing = Some(record.id);
        self.message = None;
    }

    pub fn cancel_edit(&mut self) {
        self.form = StockForm::default();
        self.editing = None;
        self.message = None;
    }

    /// Validates the form, then updates the edited record or adds stock.
    pub async fn submit(&mut self) -> Result<(), SubmitError> {
        let payload = match self.form.to_payload() {
            Ok(payload) => payload,
            Err(err) => {
                self.message = Some(StatusMessage::error(err.to_string()));
                return Err(err.into());
            }
        };

        let (mutation, success, fallback) = match self.editing {
            Some(id) => (
                StockMutation::Update(id, payload),
                messages::STOCK_UPDATED,
                messages::UPDATE_STOCK_FAILED,
            ),
            None => (
                StockMutation::Create(payload),
                messages::STOCK_ADDED,
                messages::ADD_STOCK_FAILED,
            ),
        };

        if let Err(err) = self.send(mutation).await {
            warn!(error = %err, ?mutation, "stock mutation rejected");
            self.message = Some(StatusMessage::error(describe_error(&err, fallback)));
            return Err(err.into());
        }

        self.form = StockForm::default();
        self.editing = None;
        self.load().await?;
        self.message = Some(StatusMessage::success(success));
        Ok(())
    }

    pub async fn delete(&mut self, id: StockId) -> GatewayResult<()> {
        if let Err(err) = self.send(StockMutation::Delete(id)).await {
            warn!(error = %err, %id, "stock delete rejected");
            self.message = Some(StatusMessage::error(describe_error(
                &err,
                messages::DELETE_STOCK_FAILED,
            )));
            return Err(err);
        }

        if self.editing == Some(id) {
            self.form = StockForm::default();
            self.editing = None;
        }
        self.load().await?;
        self.message = Some(StatusMessage::success(messages::STOCK_DELETED));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use inventory_gateway::{GatewayError, InMemoryGateway, models::ProductId};
    use rust_decimal::Decimal;

    use super::*;
    use crate::messages::MessageKind;

    struct Fixture {
        gateway: Arc<InMemoryGateway>,
        vm: StockViewModel,
        main: BranchId,
        north: BranchId,
        pen: ProductId,
    }

    async fn fixture() -> Fixture {
        let gateway = Arc::new(InMemoryGateway::new());
        let main = gateway.seed_branch("Main Store", "High Street").id;
        let north = gateway.seed_branch("North", "Ring Road").id;
        let pen = gateway.seed_product("Pen", Decimal::new(150, 2)).id;
        gateway.seed_stock(main, pen, 10);

        let mut vm = StockViewModel::new(gateway.clone());
        vm.load().await.unwrap();
        Fixture {
            gateway,
            vm,
            main,
            north,
            pen,
        }
    }

    #[tokio::test]
    async fn load_fills_snapshots() {
        let f = fixture().await;
        assert_eq!(f.vm.records().len(), 1);
        assert_eq!(f.vm.branches().len(), 2);
        assert_eq!(f.vm.products().len(), 1);
        assert!(!f.vm.is_loading());
    }

    #[tokio::test]
    async fn filter_change_does_not_refetch() {
        let mut f = fixture().await;
        f.gateway.clear_calls();

        f.vm.set_filter(Some(f.north));
        assert!(f.vm.rows().is_empty());
        assert_eq!(f.vm.selected_branch_label().as_deref(), Some("North - Ring Road"));
        f.vm.set_filter(None);
        assert_eq!(f.vm.rows().len(), 1);
        assert_eq!(f.vm.selected_branch_label(), None);

        assert!(f.gateway.calls().is_empty());
    }

    #[tokio::test]
    async fn submit_requires_all_fields() {
        let mut f = fixture().await;
        f.gateway.clear_calls();
        f.vm.form_mut().branch = Some(f.main);

        let err = f.vm.submit().await.unwrap_err();
        assert!(matches!(err, SubmitError::Invalid(_)));
        assert_eq!(f.vm.message().unwrap().text, "Please fill in all fields");
        assert!(f.gateway.calls().is_empty());
    }

    #[tokio::test]
    async fn edit_then_submit_updates_record() {
        let mut f = fixture().await;
        let record = f.vm.records()[0].clone();

        f.vm.begin_edit(&record);
        assert_eq!(f.vm.editing(), Some(record.id));
        f.vm.form_mut().quantity = Some(4);
        f.vm.submit().await.unwrap();

        assert_eq!(f.vm.records()[0].quantity, 4);
        assert_eq!(f.vm.editing(), None);
        assert_eq!(*f.vm.form(), StockForm::default());
        let message = f.vm.message().unwrap();
        assert_eq!(message.kind, MessageKind::Success);
        assert_eq!(message.text, messages::STOCK_UPDATED);
    }

    #[tokio::test]
    async fn cancel_edit_clears_state() {
        let mut f = fixture().await;
        let record = f.vm.records()[0].clone();
        f.vm.begin_edit(&record);
        f.vm.cancel_edit();
        assert_eq!(f.vm.editing(), None);
        assert_eq!(*f.vm.form(), StockForm::default());
        assert!(f.vm.message().is_none());
    }

    #[tokio::test]
    async fn failed_update_keeps_form() {
        let mut f = fixture().await;
        let record = f.vm.records()[0].clone();
        f.vm.begin_edit(&record);
        f.gateway.inject_failure(GatewayError::NotFound { message: None });

        assert!(f.vm.submit().await.is_err());
        assert_eq!(f.vm.editing(), Some(record.id));
        assert_eq!(f.vm.message().unwrap().text, messages::NOT_FOUND);
    }

    #[tokio::test]
    async fn delete_reloads() {
        let mut f = fixture().await;
        let id = f.vm.records()[0].id;
        f.vm.delete(id).await.unwrap();
        assert!(f.vm.records().is_empty());
        assert_eq!(f.vm.message().unwrap().text, messages::STOCK_DELETED);

        let err = f.vm.delete(id).await.unwrap_err();
        assert!(matches!(err, GatewayError::NotFound { .. }));
        assert!(f.vm.message().unwrap().is_error());
    }

    #[tokio::test]
    async fn apply_mutation_reloads_without_messages() {
        let mut f = fixture().await;
        f.vm
            .apply_mutation(StockMutation::Create(StockPayload {
                branch: f.north,
                product: f.pen,
                quantity: 2,
            }))
            .await
            .unwrap();
        assert_eq!(f.vm.records().len(), 2);
        assert!(f.vm.message().is_none());
    }

    #[tokio::test]
    async fn load_failure_keeps_old_snapshot() {
        let mut f = fixture().await;
        f.gateway.inject_failure(GatewayError::Server { status: 500 });

        assert!(f.vm.load().await.is_err());
        assert_eq!(f.vm.records().len(), 1);
        assert_eq!(f.vm.message().unwrap().text, messages::LOAD_ERROR);
    }
}
