use std::net::SocketAddr;

use axum::{
    Json, Router,
    extract::Path,
    http::{HeaderMap, StatusCode, header},
    response::IntoResponse,
    routing::{get, post, put},
};
use inventory_gateway::{
    AuthGateway, DataGateway, GatewayConfig, GatewayError, RestGateway,
    models::{BranchId, ProductId, StockId, StockPayload},
};
use secrecy::SecretString;
use serde_json::{Value, json};
use tokio::net::TcpListener;

const TOKEN: &str = "stub-csrf-token";

async fn list_stock() -> Json<Value> {
    Json(json!([
        {"id": 1, "branch": 1, "product": 2, "quantity": 5,
         "branch_name": "Main Store", "product_name": "Pen"},
        {"id": 2, "branch": 3, "product": 2, "quantity": 7}
    ]))
}

async fn check_auth() -> impl IntoResponse {
    (
        StatusCode::UNAUTHORIZED,
        [(header::SET_COOKIE, format!("csrftoken={TOKEN}; Path=/"))],
        Json(json!({"authenticated": false})),
    )
}

async fn add_stock(headers: HeaderMap, Json(body): Json<Value>) -> impl IntoResponse {
    let token = headers
        .get("x-csrftoken")
        .and_then(|v| v.to_str().ok());
    if token != Some(TOKEN) || !headers.contains_key(header::REFERER) {
        return (
            StatusCode::FORBIDDEN,
            Json(json!({"detail": "CSRF Failed: CSRF token missing."})),
        );
    }
    let quantity = body["quantity"].as_u64().unwrap_or_default();
    if quantity == 0 {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({"error": "Quantity must be greater than 0"})),
        );
    }
    (
        StatusCode::OK,
        Json(json!({"id": 9, "branch": body["branch"], "product": body["product"],
                    "quantity": quantity})),
    )
}

async fn update_stock(Path(id): Path<i64>) -> impl IntoResponse {
    match id {
        404 => (StatusCode::NOT_FOUND, Json(json!({"error": "Stock not found"}))),
        500 => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({"error": "boom"})),
        ),
        _ => (
            StatusCode::BAD_REQUEST,
            Json(json!({"quantity": ["A valid integer is required."],
                        "non_field_errors": ["Check the form."]})),
        ),
    }
}

async fn login(Json(body): Json<Value>) -> impl IntoResponse {
    if body["username"] == "ana" && body["password"] == "s3cret" {
        (
            StatusCode::OK,
            Json(json!({"user": {"id": 4, "username": "ana", "email": "ana@example.com"}})),
        )
    } else {
        (
            StatusCode::UNAUTHORIZED,
            Json(json!({"error": "Invalid username or password"})),
        )
    }
}

async fn expired() -> impl IntoResponse {
    (
        StatusCode::UNAUTHORIZED,
        Json(json!({"detail": "Authentication credentials were not provided."})),
    )
}

async fn serve() -> SocketAddr {
    let app = Router::new()
        .route("/api/stock/", get(list_stock))
        .route("/api/check-auth/", get(check_auth))
        .route("/api/add-stock/", post(add_stock))
        .route("/api/stock/{id}/update/", put(update_stock))
        .route("/api/login/", post(login))
        .route("/api/sales/", get(expired));

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    addr
}

fn gateway(addr: SocketAddr) -> RestGateway {
    let config = GatewayConfig::new(&format!("http://{addr}/api")).unwrap();
    RestGateway::new(config).unwrap()
}

fn payload(quantity: u32) -> StockPayload {
    StockPayload {
        branch: BranchId(1),
        product: ProductId(2),
        quantity,
    }
}

#[tokio::test]
async fn lists_stock_with_optional_names() {
    let gateway = gateway(serve().await);
    let stock = gateway.list_stock().await.unwrap();

    assert_eq!(stock.len(), 2);
    assert_eq!(stock[0].branch_name, "Main Store");
    assert_eq!(stock[1].branch, BranchId(3));
    assert_eq!(stock[1].product_name, "");
}

#[tokio::test]
async fn sends_csrf_token_from_cookie() {
    let gateway = gateway(serve().await);

    // No cookie yet, so the stub refuses the write.
    let err = gateway.create_stock(&payload(3)).await.unwrap_err();
    assert!(matches!(err, GatewayError::NonField(ref m) if m.starts_with("CSRF Failed")));

    assert_eq!(gateway.current_user().await.unwrap(), None);
    let record = gateway.create_stock(&payload(3)).await.unwrap();
    assert_eq!(record.id, StockId(9));
    assert_eq!(record.quantity, 3);
}

#[tokio::test]
async fn error_bodies_are_classified() {
    let gateway = gateway(serve().await);
    gateway.current_user().await.unwrap();

    let err = gateway.create_stock(&payload(0)).await.unwrap_err();
    assert_eq!(err.to_string(), "Quantity must be greater than 0");

    match gateway.update_stock(StockId(1), &payload(1)).await {
        Err(GatewayError::Field(errors)) => {
            assert_eq!(
                errors.get("quantity"),
                Some(&["A valid integer is required.".to_string()][..])
            );
            assert_eq!(errors.non_field(), ["Check the form.".to_string()]);
        }
        other => panic!("expected field errors, got {other:?}"),
    }

    assert!(matches!(
        gateway.update_stock(StockId(404), &payload(1)).await,
        Err(GatewayError::NotFound { message: Some(ref m) }) if m == "Stock not found"
    ));
    assert!(matches!(
        gateway.update_stock(StockId(500), &payload(1)).await,
        Err(GatewayError::Server { status: 500 })
    ));
}

#[tokio::test]
async fn expired_session_is_unauthorized() {
    let gateway = gateway(serve().await);
    assert!(gateway.list_sales().await.unwrap_err().is_unauthorized());
}

#[tokio::test]
async fn bad_credentials_are_not_an_expired_session() {
    let gateway = gateway(serve().await);

    let err = gateway
        .login("ana", &SecretString::new("wrong".into()))
        .await
        .unwrap_err();
    assert!(!err.is_unauthorized());
    assert_eq!(err.to_string(), "Invalid username or password");

    let user = gateway
        .login("ana", &SecretString::new("s3cret".into()))
        .await
        .unwrap();
    assert_eq!(user.username, "ana");
}

#[tokio::test]
async fn unreachable_server_is_a_connectivity_error() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let err = gateway(addr).list_stock().await.unwrap_err();
    assert!(matches!(err, GatewayError::Connectivity(_)), "{err:?}");
}
