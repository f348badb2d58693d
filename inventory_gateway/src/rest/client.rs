use std::sync::Arc;

use async_trait::async_trait;
use reqwest::{Client, Method, StatusCode, cookie::Jar, header};
use secrecy::{ExposeSecret, SecretString};
use serde::{Serialize, de::DeserializeOwned};
use snafu::ResultExt;
use tracing::{debug, info, warn};

use crate::{
    config::GatewayConfig,
    errors::{GatewayError, classify_body},
    gateway::{AuthGateway, ClientBuildSnafu, DataGateway, GatewayInitError, GatewayResult},
    models::{
        AuthStatus, Branch, BranchId, BranchPayload, PasswordResetConfirm, Product, ProductId,
        ProductPayload, Sale, SaleId, SalePayload, SignupPayload, StockId, StockPayload,
        StockRecord, User,
        user::{LoginBody, LoginResponse},
    },
    rest::csrf,
};

/// Data Gateway backed by the inventory REST API.
///
/// Holds the session cookie in its own jar, so one `RestGateway` is one login
/// session. Unauthorized responses come back as [`GatewayError::Unauthorized`];
/// deciding whether to redirect is left to the caller.
pub struct RestGateway {
    client: Client,
    jar: Arc<Jar>,
    config: GatewayConfig,
}

impl RestGateway {
    pub fn new(config: GatewayConfig) -> Result<Self, GatewayInitError> {
        let mut headers = header::HeaderMap::new();
        headers.insert(
            header::CONTENT_TYPE,
            header::HeaderValue::from_static("application/json"),
        );
        headers.insert(
            header::ACCEPT,
            header::HeaderValue::from_static("application/json"),
        );

        let jar = Arc::new(Jar::default());
        let mut builder = Client::builder()
            .default_headers(headers)
            .cookie_provider(Arc::clone(&jar));
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder.build().context(ClientBuildSnafu)?;

        Ok(Self {
            client,
            jar,
            config,
        })
    }

    /// Creates a gateway configured from the environment.
    ///
    /// See [`GatewayConfig::from_env`].
    pub fn from_env() -> Result<Self, GatewayInitError> {
        Self::new(GatewayConfig::from_env()?)
    }

    pub fn config(&self) -> &GatewayConfig {
        &self.config
    }

    /// Sends a request and returns the raw status and body.
    ///
    /// Unsafe methods carry the CSRF token from the cookie jar. Only failures
    /// where no response arrived are errors at this level.
    async fn fetch<B>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
    ) -> GatewayResult<(StatusCode, String)>
    where
        B: Serialize + Sync + ?Sized,
    {
        let url = self.config.endpoint(path)?;
        let mut request = self.client.request(method.clone(), url.clone());

        if method != Method::GET {
            if let Some(token) = csrf::token(&self.jar, &url) {
                request = request.header(csrf::CSRF_HEADER, token);
            }
            request = request.header(header::REFERER, self.config.base_url.as_str());
        }
        if let Some(body) = body {
            request = request.json(body);
        }

        debug!(%method, path, "gateway request");
        let response = request.send().await.map_err(GatewayError::connectivity)?;
        let status = response.status();
        let text = response.text().await.map_err(GatewayError::connectivity)?;
        Ok((status, text))
    }

    /// Like [`fetch`](Self::fetch) but classifies non-success responses.
    async fn execute<B>(&self, method: Method, path: &str, body: Option<&B>) -> GatewayResult<String>
    where
        B: Serialize + Sync + ?Sized,
    {
        let (status, text) = self.fetch(method.clone(), path, body).await?;
        if status.is_success() {
            return Ok(text);
        }

        let err = GatewayError::from_response(status.as_u16(), &text);
        warn!(%method, path, status = status.as_u16(), error = %err, "gateway request rejected");
        Err(err)
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> GatewayResult<T> {
        let text = self.execute::<()>(Method::GET, path, None).await?;
        Ok(serde_json::from_str(&text)?)
    }

    async fn send<B, T>(&self, method: Method, path: &str, body: &B) -> GatewayResult<T>
    where
        B: Serialize + Sync + ?Sized,
        T: DeserializeOwned,
    {
        let text = self.execute(method, path, Some(body)).await?;
        Ok(serde_json::from_str(&text)?)
    }

    /// Sends a request whose response body is informational only.
    async fn send_unit<B>(&self, method: Method, path: &str, body: Option<&B>) -> GatewayResult<()>
    where
        B: Serialize + Sync + ?Sized,
    {
        self.execute(method, path, body).await.map(|_| ())
    }

    async fn delete(&self, path: &str) -> GatewayResult<()> {
        self.send_unit::<()>(Method::DELETE, path, None).await
    }
}

#[async_trait]
impl DataGateway for RestGateway {
    async fn list_branches(&self) -> GatewayResult<Vec<Branch>> {
        self.get("branches/").await
    }

    async fn get_branch(&self, id: BranchId) -> GatewayResult<Branch> {
        self.get(&format!("branches/{id}/")).await
    }

    async fn create_branch(&self, payload: &BranchPayload) -> GatewayResult<Branch> {
        self.send(Method::POST, "add-branch/", payload).await
    }

    async fn update_branch(&self, id: BranchId, payload: &BranchPayload) -> GatewayResult<Branch> {
        self.send(Method::PUT, &format!("branches/{id}/update/"), payload)
            .await
    }

    async fn delete_branch(&self, id: BranchId) -> GatewayResult<()> {
        self.delete(&format!("branches/{id}/delete/")).await
    }

    async fn list_products(&self) -> GatewayResult<Vec<Product>> {
        self.get("products/").await
    }

    async fn get_product(&self, id: ProductId) -> GatewayResult<Product> {
        self.get(&format!("products/{id}/")).await
    }

    async fn create_product(&self, payload: &ProductPayload) -> GatewayResult<Product> {
        self.send(Method::POST, "add-product/", payload).await
    }

    async fn update_product(
        &self,
        id: ProductId,
        payload: &ProductPayload,
    ) -> GatewayResult<Product> {
        self.send(Method::PUT, &format!("products/{id}/update/"), payload)
            .await
    }

    async fn delete_product(&self, id: ProductId) -> GatewayResult<()> {
        self.delete(&format!("products/{id}/delete/")).await
    }

    async fn list_stock(&self) -> GatewayResult<Vec<StockRecord>> {
        self.get("stock/").await
    }

    async fn get_stock(&self, id: StockId) -> GatewayResult<StockRecord> {
        self.get(&format!("stock/{id}/")).await
    }

    async fn create_stock(&self, payload: &StockPayload) -> GatewayResult<StockRecord> {
        self.send(Method::POST, "add-stock/", payload).await
    }

    async fn update_stock(
        &self,
        id: StockId,
        payload: &StockPayload,
    ) -> GatewayResult<StockRecord> {
        self.send(Method::PUT, &format!("stock/{id}/update/"), payload)
            .await
    }

    async fn delete_stock(&self, id: StockId) -> GatewayResult<()> {
        self.delete(&format!("stock/{id}/delete/")).await
    }

    async fn list_sales(&self) -> GatewayResult<Vec<Sale>> {
        self.get("sales/").await
    }

    async fn record_sale(&self, payload: &SalePayload) -> GatewayResult<Sale> {
        self.send(Method::POST, "add-sale/", payload).await
    }

    async fn delete_sale(&self, id: SaleId) -> GatewayResult<()> {
        self.delete(&format!("sales/{id}/delete/")).await
    }
}

#[async_trait]
impl AuthGateway for RestGateway {
    async fn login(&self, username: &str, password: &SecretString) -> GatewayResult<User> {
        let body = LoginBody {
            username,
            password: password.expose_secret(),
        };
        let (status, text) = self.fetch(Method::POST, "login/", Some(&body)).await?;

        // Bad credentials are a 401 too, but they are a rejection of this
        // request, not an expired session.
        if status == StatusCode::UNAUTHORIZED {
            warn!(username, "login rejected");
            return Err(classify_body(status.as_u16(), &text));
        }
        if !status.is_success() {
            return Err(GatewayError::from_response(status.as_u16(), &text));
        }

        let response: LoginResponse = serde_json::from_str(&text)?;
        info!(username = %response.user.username, "logged in");
        Ok(response.user)
    }

    async fn logout(&self) -> GatewayResult<()> {
        self.send_unit::<()>(Method::POST, "logout/", None).await
    }

    async fn current_user(&self) -> GatewayResult<Option<User>> {
        match self.get::<AuthStatus>("check-auth/").await {
            Ok(status) if status.authenticated => Ok(status.user),
            Ok(_) | Err(GatewayError::Unauthorized) => Ok(None),
            Err(err) => Err(err),
        }
    }

    async fn signup(&self, payload: &SignupPayload) -> GatewayResult<()> {
        self.send_unit(Method::POST, "accounts/signup/", Some(payload))
            .await
    }

    async fn request_password_reset(&self, email: &str) -> GatewayResult<()> {
        let body = serde_json::json!({ "email": email });
        self.send_unit(Method::POST, "accounts/password-reset/", Some(&body))
            .await
    }

    async fn confirm_password_reset(&self, payload: &PasswordResetConfirm) -> GatewayResult<()> {
        self.send_unit(Method::POST, "accounts/password-reset-confirm/", Some(payload))
            .await
    }
}
