//! State behind the Branches screen.

use std::sync::Arc;

use inventory_gateway::{
    DataGateway, GatewayResult,
    models::{Branch, BranchId},
};
use tracing::warn;

use crate::{
    forms::{BranchForm, SubmitError},
    messages::{self, StatusMessage, describe_error},
};

pub struct BranchesViewModel {
    gateway: Arc<dyn DataGateway>,
    branches: Vec<Branch>,
    form: BranchForm,
    editing: Option<BranchId>,
    message: Option<StatusMessage>,
}

impl BranchesViewModel {
    pub fn new(gateway: Arc<dyn DataGateway>) -> Self {
        Self {
            gateway,
            branches: Vec::new(),
            form: BranchForm::default(),
            editing: None,
            message: None,
        }
    }

    pub fn branches(&self) -> &[Branch] {
        &self.branches
    }

    pub fn form(&self) -> &BranchForm {
        &self.form
    }

    pub fn form_mut(&mut self) -> &mut BranchForm {
        &mut self.form
    }

    pub fn editing(&self) -> Option<BranchId> {
        self.editing
    }

    pub fn message(&self) -> Option<&StatusMessage> {
        self.message.as_ref()
    }

    pub async fn load(&mut self) -> GatewayResult<()> {
        match self.gateway.list_branches().await {
            Ok(branches) => {
                self.branches = branches;
                Ok(())
            }
            Err(err) => {
                warn!(error = %err, "failed to load branches");
                self.message = Some(StatusMessage::error(messages::BRANCHES_LOAD_ERROR));
                Err(err)
            }
        }
    }

    pub fn begin_edit(&mut self, branch: &Branch) {
        self.form = BranchForm::from_branch(branch);
        self.editing = Some(branch.id);
        self.message = None;
    }

    pub fn cancel_edit(&mut self) {
        self.form = BranchForm::default();
        self.editing = None;
        self.message = None;
    }

    pub async fn submit(&mut self) -> Result<Branch, SubmitError> {
        let payload = match self.form.to_payload() {
            Ok(payload) => payload,
            Err(err) => {
                self.message = Some(StatusMessage::error(err.to_string()));
                return Err(err.into());
            }
        };

        let (result, success, fallback) = match self.editing {
            Some(id) => (
                self.gateway.update_branch(id, &payload).await,
                messages::BRANCH_UPDATED,
                messages::UPDATE_BRANCH_FAILED,
            ),
            None => (
                self.gateway.create_branch(&payload).await,
                messages::BRANCH_ADDED,
                messages::ADD_BRANCH_FAILED,
            ),
        };

        let branch = match result {
            Ok(branch) => branch,
            Err(err) => {
                warn!(error = %err, "branch mutation rejected");
                self.message = Some(StatusMessage::error(describe_error(&err, fallback)));
                return Err(err.into());
            }
        };

        self.form = BranchForm::default();
        self.editing = None;
        self.load().await?;
        self.message = Some(StatusMessage::success(success));
        Ok(branch)
    }

    /// Deletes a branch; the server removes its stock and sales with it.
    pub async fn delete(&mut self, id: BranchId) -> GatewayResult<()> {
        if let Err(err) = self.gateway.delete_branch(id).await {
            warn!(error = %err, %id, "branch delete rejected");
            self.message = Some(StatusMessage::error(describe_error(
                &err,
                messages::DELETE_BRANCH_FAILED,
            )));
            return Err(err);
        }

        if self.editing == Some(id) {
            self.cancel_edit();
        }
        self.load().await?;
        self.message = Some(StatusMessage::success(messages::BRANCH_DELETED));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use inventory_gateway::{GatewayError, InMemoryGateway};

    use super::*;

    async fn fixture() -> (Arc<InMemoryGateway>, BranchesViewModel) {
        let gateway = Arc::new(InMemoryGateway::new());
        gateway.seed_branch("Main Store", "High Street");
        let mut vm = BranchesViewModel::new(gateway.clone());
        vm.load().await.unwrap();
        (gateway, vm)
    }

    #[tokio::test]
    async fn add_then_edit() {
        let (_, mut vm) = fixture().await;
        vm.form_mut().name = "North".into();
        vm.form_mut().location = "Ring Road".into();
        let north = vm.submit().await.unwrap();
        assert_eq!(vm.branches().len(), 2);
        assert_eq!(vm.message().unwrap().text, messages::BRANCH_ADDED);

        vm.begin_edit(&north);
        assert_eq!(vm.form().name, "North");
        vm.form_mut().location = "Bypass".into();
        vm.submit().await.unwrap();
        assert_eq!(vm.branches()[1].location, "Bypass");
        assert_eq!(vm.message().unwrap().text, messages::BRANCH_UPDATED);
        assert_eq!(vm.editing(), None);
    }

    #[tokio::test]
    async fn blank_location_is_caught_locally() {
        let (gateway, mut vm) = fixture().await;
        gateway.clear_calls();
        vm.form_mut().name = "North".into();

        assert!(matches!(vm.submit().await, Err(SubmitError::Invalid(_))));
        assert_eq!(vm.message().unwrap().text, "Please fill in all fields");
        assert!(gateway.calls().is_empty());
    }

    #[tokio::test]
    async fn cancel_edit_clears_form() {
        let (_, mut vm) = fixture().await;
        let main = vm.branches()[0].clone();
        vm.begin_edit(&main);
        vm.cancel_edit();
        assert_eq!(*vm.form(), BranchForm::default());
        assert_eq!(vm.editing(), None);
    }

    #[tokio::test]
    async fn delete_cascades_and_reloads() {
        let (gateway, mut vm) = fixture().await;
        let main = vm.branches()[0].id;
        let pen = gateway.seed_product("Pen", rust_decimal::Decimal::ONE);
        gateway.seed_stock(main, pen.id, 3);

        vm.delete(main).await.unwrap();
        assert!(vm.branches().is_empty());
        assert_eq!(vm.message().unwrap().text, messages::BRANCH_DELETED);
        assert!(gateway.list_stock().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn load_failure_message() {
        let (gateway, mut vm) = fixture().await;
        gateway.inject_failure(GatewayError::Server { status: 500 });
        assert!(vm.load().await.is_err());
        assert_eq!(vm.branches().len(), 1);
        assert_eq!(vm.message().unwrap().text, messages::BRANCHES_LOAD_ERROR);
    }
}
