//! In-process Data Gateway.
//!
//! [`InMemoryGateway`] reproduces the behaviour the inventory server documents:
//! add-stock merges into an existing (branch, product) record, recording a sale
//! decrements stock and refuses to go negative, deleting a sale restores its
//! quantity, and deleting a branch or product cascades. Stock and sale
//! listings carry names resolved at read time, like the server's serializers.
//!
//! Tests can make the next call fail ([`InMemoryGateway::inject_failure`]),
//! require a login for data calls ([`InMemoryGateway::requiring_auth`]) and
//! inspect which calls were made ([`InMemoryGateway::calls`]).

use std::{
    collections::VecDeque,
    sync::{Mutex, MutexGuard, PoisonError},
};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use secrecy::{ExposeSecret, SecretString};

use crate::{
    errors::{FieldErrors, GatewayError},
    gateway::{AuthGateway, DataGateway, GatewayResult},
    models::{
        Branch, BranchId, BranchPayload, PasswordResetConfirm, Product, ProductId, ProductPayload,
        Sale, SaleId, SalePayload, SignupPayload, StockId, StockPayload, StockRecord, User, UserId,
    },
};

struct StockRow {
    id: StockId,
    branch: BranchId,
    product: ProductId,
    quantity: u32,
}

struct SaleRow {
    id: SaleId,
    branch: BranchId,
    product: ProductId,
    quantity: u32,
    date: DateTime<Utc>,
}

struct Account {
    user: User,
    password: SecretString,
}

struct ResetTicket {
    uid: String,
    token: String,
    user: UserId,
}

#[derive(Default)]
struct State {
    branches: Vec<Branch>,
    products: Vec<Product>,
    stock: Vec<StockRow>,
    sales: Vec<SaleRow>,
    accounts: Vec<Account>,
    resets: Vec<ResetTicket>,
    session: Option<UserId>,
    require_auth: bool,
    last_id: i64,
    failures: VecDeque<GatewayError>,
    calls: Vec<&'static str>,
}

impl State {
    fn next_id(&mut self) -> i64 {
        self.last_id += 1;
        self.last_id
    }

    fn branch(&self, id: BranchId) -> Option<&Branch> {
        self.branches.iter().find(|b| b.id == id)
    }

    fn product(&self, id: ProductId) -> Option<&Product> {
        self.products.iter().find(|p| p.id == id)
    }

    fn branch_name(&self, id: BranchId) -> String {
        self.branch(id).map(|b| b.name.clone()).unwrap_or_default()
    }

    fn product_name(&self, id: ProductId) -> String {
        self.product(id).map(|p| p.name.clone()).unwrap_or_default()
    }

    fn stock_record(&self, row: &StockRow) -> StockRecord {
        StockRecord {
            id: row.id,
            branch: row.branch,
            product: row.product,
            quantity: row.quantity,
            branch_name: self.branch_name(row.branch),
            product_name: self.product_name(row.product),
        }
    }

    fn sale(&self, row: &SaleRow) -> Sale {
        Sale {
            id: row.id,
            branch: row.branch,
            product: row.product,
            quantity: row.quantity,
            date: row.date,
            branch_name: self.branch_name(row.branch),
            product_name: self.product_name(row.product),
        }
    }

    fn stock_for(&mut self, branch: BranchId, product: ProductId) -> Option<&mut StockRow> {
        self.stock
            .iter_mut()
            .find(|s| s.branch == branch && s.product == product)
    }

    /// Adds `quantity` to the (branch, product) record, creating it if needed.
    fn add_stock(
        &mut self,
        branch: BranchId,
        product: ProductId,
        quantity: u32,
    ) -> GatewayResult<StockId> {
        if let Some(row) = self.stock_for(branch, product) {
            row.quantity = row
                .quantity
                .checked_add(quantity)
                .ok_or_else(|| {
                    GatewayError::field("quantity", "Ensure this value is less than or equal to 4294967295.")
                })?;
            return Ok(row.id);
        }
        let id = StockId(self.next_id());
        self.stock.push(StockRow {
            id,
            branch,
            product,
            quantity,
        });
        Ok(id)
    }

    fn check_related(&self, branch: BranchId, product: ProductId) -> GatewayResult<()> {
        let mut errors = FieldErrors::new();
        if self.branch(branch).is_none() {
            errors.push("branch", format!("Invalid pk \"{branch}\" - object does not exist."));
        }
        if self.product(product).is_none() {
            errors.push("product", format!("Invalid pk \"{product}\" - object does not exist."));
        }
        if errors.is_empty() {
            Ok(())
        } else {
            Err(GatewayError::Field(errors))
        }
    }

    fn user(&self, id: UserId) -> Option<&User> {
        self.accounts.iter().map(|a| &a.user).find(|u| u.id == id)
    }
}

fn not_found(what: &str) -> GatewayError {
    GatewayError::NotFound {
        message: Some(format!("{what} not found")),
    }
}

fn require_text(field: &str, value: &str) -> GatewayResult<()> {
    if value.trim().is_empty() {
        Err(GatewayError::field(field, "This field may not be blank."))
    } else {
        Ok(())
    }
}

fn validate_branch(payload: &BranchPayload) -> GatewayResult<()> {
    require_text("name", &payload.name)?;
    require_text("location", &payload.location)
}

fn validate_product(payload: &ProductPayload) -> GatewayResult<()> {
    require_text("name", &payload.name)?;
    if payload.price < Decimal::ZERO {
        return Err(GatewayError::field(
            "price",
            "Ensure this value is greater than or equal to 0.",
        ));
    }
    Ok(())
}

/// Data Gateway that keeps everything in process memory.
#[derive(Default)]
pub struct InMemoryGateway {
    state: Mutex<State>,
}

impl InMemoryGateway {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every data call fail with [`GatewayError::Unauthorized`] until a
    /// user logs in.
    pub fn requiring_auth(self) -> Self {
        self.lock().require_auth = true;
        self
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Runs a data call: logs it, applies any injected failure, then checks the
    /// session when authentication is required.
    fn call<T>(
        &self,
        name: &'static str,
        f: impl FnOnce(&mut State) -> GatewayResult<T>,
    ) -> GatewayResult<T> {
        let mut state = self.lock();
        state.calls.push(name);
        if let Some(err) = state.failures.pop_front() {
            return Err(err);
        }
        if state.require_auth && state.session.is_none() {
            return Err(GatewayError::Unauthorized);
        }
        f(&mut *state)
    }

    /// Like [`call`](Self::call) but never requires a session.
    fn call_public<T>(
        &self,
        name: &'static str,
        f: impl FnOnce(&mut State) -> GatewayResult<T>,
    ) -> GatewayResult<T> {
        let mut state = self.lock();
        state.calls.push(name);
        if let Some(err) = state.failures.pop_front() {
            return Err(err);
        }
        f(&mut *state)
    }

    /// The next call fails with `err` instead of running. Failures queue up.
    pub fn inject_failure(&self, err: GatewayError) {
        self.lock().failures.push_back(err);
    }

    /// Names of the calls made so far, oldest first (e.g. `"list_stock"`).
    pub fn calls(&self) -> Vec<&'static str> {
        self.lock().calls.clone()
    }

    pub fn clear_calls(&self) {
        self.lock().calls.clear();
    }

    /// Drops the current login, as if the server-side session expired.
    pub fn expire_session(&self) {
        self.lock().session = None;
    }

    pub fn seed_branch(&self, name: &str, location: &str) -> Branch {
        let mut state = self.lock();
        let branch = Branch {
            id: BranchId(state.next_id()),
            name: name.to_string(),
            location: location.to_string(),
        };
        state.branches.push(branch.clone());
        branch
    }

    pub fn seed_product(&self, name: &str, price: Decimal) -> Product {
        let mut state = self.lock();
        let product = Product {
            id: ProductId(state.next_id()),
            name: name.to_string(),
            price,
        };
        state.products.push(product.clone());
        product
    }

    /// Inserts a stock row without validation or merging.
    pub fn seed_stock(&self, branch: BranchId, product: ProductId, quantity: u32) -> StockRecord {
        let mut state = self.lock();
        let row = StockRow {
            id: StockId(state.next_id()),
            branch,
            product,
            quantity,
        };
        let record = state.stock_record(&row);
        state.stock.push(row);
        record
    }

    pub fn seed_user(&self, username: &str, email: &str, password: &str) -> User {
        let mut state = self.lock();
        let user = User {
            id: UserId(state.next_id()),
            username: username.to_string(),
            email: email.to_string(),
            is_staff: false,
        };
        state.accounts.push(Account {
            user: user.clone(),
            password: SecretString::new(password.into()),
        });
        user
    }

    /// The `(uid, token)` pair of the most recent reset link sent to `email`.
    pub fn pending_reset(&self, email: &str) -> Option<(String, String)> {
        let state = self.lock();
        let user = state
            .accounts
            .iter()
            .find(|a| a.user.email == email)?
            .user
            .id;
        state
            .resets
            .iter()
            .rev()
            .find(|r| r.user == user)
            .map(|r| (r.uid.clone(), r.token.clone()))
    }
}

#[async_trait]
impl DataGateway for InMemoryGateway {
    async fn list_branches(&self) -> GatewayResult<Vec<Branch>> {
        self.call("list_branches", |state| Ok(state.branches.clone()))
    }

    async fn get_branch(&self, id: BranchId) -> GatewayResult<Branch> {
        self.call("get_branch", |state| {
            state.branch(id).cloned().ok_or_else(|| not_found("Branch"))
        })
    }

    async fn create_branch(&self, payload: &BranchPayload) -> GatewayResult<Branch> {
        self.call("create_branch", |state| {
            validate_branch(payload)?;
            let branch = Branch {
                id: BranchId(state.next_id()),
                name: payload.name.clone(),
                location: payload.location.clone(),
            };
            state.branches.push(branch.clone());
            Ok(branch)
        })
    }

    async fn update_branch(&self, id: BranchId, payload: &BranchPayload) -> GatewayResult<Branch> {
        self.call("update_branch", |state| {
            let branch = state
                .branches
                .iter_mut()
                .find(|b| b.id == id)
                .ok_or_else(|| not_found("Branch"))?;
            validate_branch(payload)?;
            branch.name = payload.name.clone();
            branch.location = payload.location.clone();
            Ok(branch.clone())
        })
    }

    async fn delete_branch(&self, id: BranchId) -> GatewayResult<()> {
        self.call("delete_branch", |state| {
            let before = state.branches.len();
            state.branches.retain(|b| b.id != id);
            if state.branches.len() == before {
                return Err(not_found("Branch"));
            }
            state.stock.retain(|s| s.branch != id);
            state.sales.retain(|s| s.branch != id);
            Ok(())
        })
    }

    async fn list_products(&self) -> GatewayResult<Vec<Product>> {
        self.call("list_products", |state| Ok(state.products.clone()))
    }

    async fn get_product(&self, id: ProductId) -> GatewayResult<Product> {
        self.call("get_product", |state| {
            state.product(id).cloned().ok_or_else(|| not_found("Product"))
        })
    }

    async fn create_product(&self, payload: &ProductPayload) -> GatewayResult<Product> {
        self.call("create_product", |state| {
            validate_product(payload)?;
            let initial_stock = match (payload.branch, payload.stock_quantity) {
                (Some(branch), Some(quantity)) => {
                    if state.branch(branch).is_none() {
                        return Err(GatewayError::NonField("Branch not found".to_string()));
                    }
                    Some((branch, quantity))
                }
                _ => None,
            };

            let product = Product {
                id: ProductId(state.next_id()),
                name: payload.name.clone(),
                price: payload.price,
            };
            state.products.push(product.clone());
            if let Some((branch, quantity)) = initial_stock {
                state.add_stock(branch, product.id, quantity)?;
            }
            Ok(product)
        })
    }

    async fn update_product(
        &self,
        id: ProductId,
        payload: &ProductPayload,
    ) -> GatewayResult<Product> {
        self.call("update_product", |state| {
            let product = state
                .products
                .iter_mut()
                .find(|p| p.id == id)
                .ok_or_else(|| not_found("Product"))?;
            validate_product(payload)?;
            product.name = payload.name.clone();
            product.price = payload.price;
            Ok(product.clone())
        })
    }

    async fn delete_product(&self, id: ProductId) -> GatewayResult<()> {
        self.call("delete_product", |state| {
            let before = state.products.len();
            state.products.retain(|p| p.id != id);
            if state.products.len() == before {
                return Err(not_found("Product"));
            }
            state.stock.retain(|s| s.product != id);
            state.sales.retain(|s| s.product != id);
            Ok(())
        })
    }

    async fn list_stock(&self) -> GatewayResult<Vec<StockRecord>> {
        self.call("list_stock", |state| {
            Ok(state.stock.iter().map(|row| state.stock_record(row)).collect())
        })
    }

    async fn get_stock(&self, id: StockId) -> GatewayResult<StockRecord> {
        self.call("get_stock", |state| {
            state
                .stock
                .iter()
                .find(|s| s.id == id)
                .map(|row| state.stock_record(row))
                .ok_or_else(|| not_found("Stock"))
        })
    }

    async fn create_stock(&self, payload: &StockPayload) -> GatewayResult<StockRecord> {
        self.call("create_stock", |state| {
            if payload.quantity == 0 {
                return Err(GatewayError::NonField(
                    "Quantity must be greater than 0".to_string(),
                ));
            }
            if state.branch(payload.branch).is_none() {
                return Err(GatewayError::NonField(format!(
                    "Branch with ID {} does not exist",
                    payload.branch
                )));
            }
            if state.product(payload.product).is_none() {
                return Err(GatewayError::NonField(format!(
                    "Product with ID {} does not exist",
                    payload.product
                )));
            }

            let id = state.add_stock(payload.branch, payload.product, payload.quantity)?;
            let row = state
                .stock
                .iter()
                .find(|s| s.id == id)
                .ok_or_else(|| not_found("Stock"))?;
            Ok(state.stock_record(row))
        })
    }

    async fn update_stock(
        &self,
        id: StockId,
        payload: &StockPayload,
    ) -> GatewayResult<StockRecord> {
        self.call("update_stock", |state| {
            let index = state
                .stock
                .iter()
                .position(|s| s.id == id)
                .ok_or_else(|| not_found("Stock"))?;
            state.check_related(payload.branch, payload.product)?;
            let clash = state
                .stock
                .iter()
                .any(|s| s.id != id && s.branch == payload.branch && s.product == payload.product);
            if clash {
                return Err(GatewayError::NonField(
                    "The fields branch, product must make a unique set.".to_string(),
                ));
            }

            let row = &mut state.stock[index];
            row.branch = payload.branch;
            row.product = payload.product;
            row.quantity = payload.quantity;
            Ok(state.stock_record(&state.stock[index]))
        })
    }

    async fn delete_stock(&self, id: StockId) -> GatewayResult<()> {
        self.call("delete_stock", |state| {
            let before = state.stock.len();
            state.stock.retain(|s| s.id != id);
            if state.stock.len() == before {
                return Err(not_found("Stock"));
            }
            Ok(())
        })
    }

    async fn list_sales(&self) -> GatewayResult<Vec<Sale>> {
        self.call("list_sales", |state| {
            Ok(state.sales.iter().map(|row| state.sale(row)).collect())
        })
    }

    async fn record_sale(&self, payload: &SalePayload) -> GatewayResult<Sale> {
        self.call("record_sale", |state| {
            state.check_related(payload.branch, payload.product)?;
            let stock = state
                .stock_for(payload.branch, payload.product)
                .ok_or_else(|| {
                    GatewayError::NonField("Stock not found for this branch and product".to_string())
                })?;
            if stock.quantity < payload.quantity {
                return Err(GatewayError::NonField(
                    "Not enough stock available".to_string(),
                ));
            }
            stock.quantity -= payload.quantity;

            let row = SaleRow {
                id: SaleId(state.next_id()),
                branch: payload.branch,
                product: payload.product,
                quantity: payload.quantity,
                date: Utc::now(),
            };
            let sale = state.sale(&row);
            state.sales.push(row);
            Ok(sale)
        })
    }

    async fn delete_sale(&self, id: SaleId) -> GatewayResult<()> {
        self.call("delete_sale", |state| {
            let index = state
                .sales
                .iter()
                .position(|s| s.id == id)
                .ok_or_else(|| not_found("Sale"))?;
            let sale = state.sales.remove(index);
            state.add_stock(sale.branch, sale.product, sale.quantity)?;
            Ok(())
        })
    }
}

#[async_trait]
impl AuthGateway for InMemoryGateway {
    async fn login(&self, username: &str, password: &SecretString) -> GatewayResult<User> {
        self.call_public("login", |state| {
            if username.is_empty() || password.expose_secret().is_empty() {
                return Err(GatewayError::NonField(
                    "Username and password are required".to_string(),
                ));
            }
            let user = state
                .accounts
                .iter()
                .find(|a| {
                    a.user.username == username
                        && a.password.expose_secret() == password.expose_secret()
                })
                .map(|a| a.user.clone())
                .ok_or_else(|| {
                    GatewayError::NonField("Invalid username or password".to_string())
                })?;
            state.session = Some(user.id);
            Ok(user)
        })
    }

    async fn logout(&self) -> GatewayResult<()> {
        self.call_public("logout", |state| {
            state.session = None;
            Ok(())
        })
    }

    async fn current_user(&self) -> GatewayResult<Option<User>> {
        self.call_public("current_user", |state| {
            Ok(state.session.and_then(|id| state.user(id).cloned()))
        })
    }

    async fn signup(&self, payload: &SignupPayload) -> GatewayResult<()> {
        self.call_public("signup", |state| {
            if payload.username.is_empty() || payload.password.expose_secret().is_empty() {
                return Err(GatewayError::NonField(
                    "Username and password are required".to_string(),
                ));
            }
            if state
                .accounts
                .iter()
                .any(|a| a.user.username == payload.username)
            {
                return Err(GatewayError::field("username", "Username already exists."));
            }
            let user = User {
                id: UserId(state.next_id()),
                username: payload.username.clone(),
                email: payload.email.clone(),
                is_staff: false,
            };
            state.accounts.push(Account {
                user,
                password: SecretString::new(payload.password.expose_secret().into()),
            });
            Ok(())
        })
    }

    async fn request_password_reset(&self, email: &str) -> GatewayResult<()> {
        self.call_public("request_password_reset", |state| {
            if email.trim().is_empty() {
                return Err(GatewayError::field("email", "This field is required."));
            }
            // Unknown addresses succeed silently so the endpoint does not
            // reveal which emails have accounts.
            let Some(user) = state
                .accounts
                .iter()
                .find(|a| a.user.email == email)
                .map(|a| a.user.id)
            else {
                return Ok(());
            };
            let token = format!("reset-{}", state.next_id());
            state.resets.push(ResetTicket {
                uid: user.to_string(),
                token,
                user,
            });
            Ok(())
        })
    }

    async fn confirm_password_reset(&self, payload: &PasswordResetConfirm) -> GatewayResult<()> {
        self.call_public("confirm_password_reset", |state| {
            let new_password = payload.new_password.expose_secret();
            if payload.uid.is_empty() || payload.token.is_empty() || new_password.is_empty() {
                return Err(GatewayError::NonField("Missing required fields".to_string()));
            }
            if new_password != payload.confirm_password.expose_secret() {
                return Err(GatewayError::field(
                    "new_password2",
                    "The two password fields didn't match.",
                ));
            }
            let index = state
                .resets
                .iter()
                .position(|r| r.uid == payload.uid && r.token == payload.token)
                .ok_or_else(|| {
                    GatewayError::NonField("Invalid link or expired token".to_string())
                })?;
            let ticket = state.resets.remove(index);
            if let Some(account) = state.accounts.iter_mut().find(|a| a.user.id == ticket.user) {
                account.password = SecretString::new(new_password.into());
            }
            Ok(())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seeded() -> (InMemoryGateway, Branch, Branch, Product) {
        let gateway = InMemoryGateway::new();
        let main = gateway.seed_branch("Main Store", "High Street");
        let north = gateway.seed_branch("North", "Ring Road");
        let pen = gateway.seed_product("Pen", Decimal::new(150, 2));
        (gateway, main, north, pen)
    }

    #[tokio::test]
    async fn add_stock_merges_existing_pair() {
        let (gateway, main, north, pen) = seeded();
        let payload = StockPayload { branch: main.id, product: pen.id, quantity: 4 };

        let first = gateway.create_stock(&payload).await.unwrap();
        let merged = gateway.create_stock(&payload).await.unwrap();
        assert_eq!(first.id, merged.id);
        assert_eq!(merged.quantity, 8);
        assert_eq!(merged.branch_name, "Main Store");

        gateway
            .create_stock(&StockPayload { branch: north.id, ..payload })
            .await
            .unwrap();
        assert_eq!(gateway.list_stock().await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn add_stock_rejects_zero_and_unknown_ids() {
        let (gateway, main, _, pen) = seeded();
        let err = gateway
            .create_stock(&StockPayload { branch: main.id, product: pen.id, quantity: 0 })
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Quantity must be greater than 0");

        let err = gateway
            .create_stock(&StockPayload { branch: BranchId(999), product: pen.id, quantity: 1 })
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Branch with ID 999 does not exist");
    }

    #[tokio::test]
    async fn update_stock_keeps_pairs_unique() {
        let (gateway, main, north, pen) = seeded();
        let a = gateway.seed_stock(main.id, pen.id, 3);
        let b = gateway.seed_stock(north.id, pen.id, 5);

        let err = gateway
            .update_stock(b.id, &StockPayload { branch: main.id, product: pen.id, quantity: 1 })
            .await
            .unwrap_err();
        assert!(matches!(err, GatewayError::NonField(_)));

        let updated = gateway
            .update_stock(a.id, &StockPayload { branch: main.id, product: pen.id, quantity: 9 })
            .await
            .unwrap();
        assert_eq!(updated.quantity, 9);

        let err = gateway
            .update_stock(StockId(404), &StockPayload { branch: main.id, product: pen.id, quantity: 1 })
            .await
            .unwrap_err();
        assert!(matches!(err, GatewayError::NotFound { .. }));
    }

    #[tokio::test]
    async fn sales_decrement_and_restore_stock() {
        let (gateway, main, _, pen) = seeded();
        gateway.seed_stock(main.id, pen.id, 5);
        let sale_payload = SalePayload { branch: main.id, product: pen.id, quantity: 3 };

        let sale = gateway.record_sale(&sale_payload).await.unwrap();
        assert_eq!(sale.product_name, "Pen");
        assert_eq!(gateway.list_stock().await.unwrap()[0].quantity, 2);

        let err = gateway.record_sale(&sale_payload).await.unwrap_err();
        assert_eq!(err.to_string(), "Not enough stock available");

        gateway.delete_sale(sale.id).await.unwrap();
        assert_eq!(gateway.list_stock().await.unwrap()[0].quantity, 5);
        assert!(gateway.list_sales().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn sale_without_stock_record_is_rejected() {
        let (gateway, _, north, pen) = seeded();
        let err = gateway
            .record_sale(&SalePayload { branch: north.id, product: pen.id, quantity: 1 })
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Stock not found for this branch and product");
    }

    #[tokio::test]
    async fn deleting_a_branch_cascades() {
        let (gateway, main, north, pen) = seeded();
        gateway.seed_stock(main.id, pen.id, 5);
        gateway.seed_stock(north.id, pen.id, 1);

        gateway.delete_branch(main.id).await.unwrap();
        let stock = gateway.list_stock().await.unwrap();
        assert_eq!(stock.len(), 1);
        assert_eq!(stock[0].branch, north.id);

        assert!(matches!(
            gateway.delete_branch(main.id).await,
            Err(GatewayError::NotFound { .. })
        ));
    }

    #[tokio::test]
    async fn product_with_initial_stock() {
        let (gateway, main, _, _) = seeded();
        let product = gateway
            .create_product(&ProductPayload::new("Book", Decimal::new(999, 2)).with_initial_stock(main.id, 7))
            .await
            .unwrap();
        let stock = gateway.list_stock().await.unwrap();
        assert_eq!(stock.len(), 1);
        assert_eq!((stock[0].product, stock[0].quantity), (product.id, 7));

        let err = gateway
            .create_product(&ProductPayload::new("Bad", Decimal::new(-1, 0)))
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Price: Ensure this value is greater than or equal to 0.");
    }

    #[tokio::test]
    async fn auth_required_until_login() {
        let gateway = InMemoryGateway::new().requiring_auth();
        gateway.seed_user("ana", "ana@example.com", "s3cret");

        assert!(gateway.list_stock().await.unwrap_err().is_unauthorized());
        assert_eq!(gateway.current_user().await.unwrap(), None);

        let bad = gateway
            .login("ana", &SecretString::new("nope".into()))
            .await
            .unwrap_err();
        assert_eq!(bad.to_string(), "Invalid username or password");

        let user = gateway
            .login("ana", &SecretString::new("s3cret".into()))
            .await
            .unwrap();
        assert_eq!(gateway.current_user().await.unwrap(), Some(user));
        assert!(gateway.list_stock().await.is_ok());

        gateway.expire_session();
        assert!(gateway.list_stock().await.unwrap_err().is_unauthorized());
    }

    #[tokio::test]
    async fn password_reset_flow() {
        let gateway = InMemoryGateway::new();
        gateway.seed_user("ana", "ana@example.com", "old");

        gateway.request_password_reset("nobody@example.com").await.unwrap();
        gateway.request_password_reset("ana@example.com").await.unwrap();
        let (uid, token) = gateway.pending_reset("ana@example.com").unwrap();

        let confirm = PasswordResetConfirm {
            uid,
            token,
            new_password: SecretString::new("new".into()),
            confirm_password: SecretString::new("new".into()),
        };
        gateway.confirm_password_reset(&confirm).await.unwrap();
        assert!(gateway.confirm_password_reset(&confirm).await.is_err());
        assert!(gateway.login("ana", &SecretString::new("new".into())).await.is_ok());
    }

    #[tokio::test]
    async fn injected_failures_fire_once_in_order() {
        let (gateway, ..) = seeded();
        gateway.inject_failure(GatewayError::Server { status: 503 });

        assert!(matches!(
            gateway.list_branches().await,
            Err(GatewayError::Server { status: 503 })
        ));
        assert_eq!(gateway.list_branches().await.unwrap().len(), 2);
        assert_eq!(gateway.calls(), vec!["list_branches", "list_branches"]);
    }
}
