//! Gateway Integration Tests
//!
//! Boots the full server (auth layer plus all four services) over the
//! in-memory backend and drives it through the outbound client facades.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use tonic::Code;
use tonic::Request;

use hub_grpc_gateway::{
    AuthClient, AuthServiceTokenValidator, ClientConfig, ClientError, Container, GrpcServer,
    InMemoryBackend, OrderClient, OrderStatus, PositionClient, TokenValidator,
    proto::{
        ApiResponse, CreatePositionRequest, GetMarketDataRequest, SubmitOrderRequest,
        UpdatePositionRequest, market_data_service_client::MarketDataServiceClient,
    },
};

struct TestGateway {
    addr: SocketAddr,
    backend: Arc<InMemoryBackend>,
    server: GrpcServer,
    handle: tokio::task::JoinHandle<()>,
}

impl TestGateway {
    fn config(&self) -> ClientConfig {
        ClientConfig::new(self.addr.to_string()).with_timeout(Duration::from_secs(5))
    }

    async fn shutdown(self) {
        self.server.stop();
        tokio::time::timeout(Duration::from_secs(5), self.handle)
            .await
            .expect("server did not stop")
            .unwrap();
    }
}

/// Start the gateway on a random loopback port.
async fn start_gateway() -> TestGateway {
    let backend = InMemoryBackend::demo();
    let container = backend.container().unwrap();
    let validator: Arc<dyn TokenValidator> =
        Arc::new(AuthServiceTokenValidator::new(container.auth_service()));

    let (server, listener) =
        GrpcServer::create_with_validator(&container, validator, "127.0.0.1:0".parse().unwrap())
            .await
            .unwrap();
    let addr = listener.local_addr().unwrap();

    let serving = server.clone();
    let handle = tokio::spawn(async move {
        serving.serve(listener).await.unwrap();
    });

    TestGateway {
        addr,
        backend,
        server,
        handle,
    }
}

async fn login(gateway: &TestGateway, email: &str) -> String {
    let response = AuthClient::new(gateway.config())
        .login(email, "password")
        .await
        .unwrap();
    assert!(response.api_response.unwrap().success);
    response.token
}

fn limit_order(user_id: &str, symbol: &str) -> SubmitOrderRequest {
    SubmitOrderRequest {
        user_id: user_id.to_string(),
        symbol: symbol.to_string(),
        order_type: "LIMIT".to_string(),
        order_side: "BUY".to_string(),
        quantity: 10.0,
        price: Some(150.0),
    }
}

fn assert_populated(envelope: Option<&ApiResponse>) {
    let envelope = envelope.expect("envelope missing");
    assert!(!envelope.message.is_empty());
    assert!(envelope.timestamp > 0);
}

fn assert_status(result: Result<impl std::fmt::Debug, ClientError>, expected: Code) {
    match result {
        Err(err) => assert_eq!(err.code(), Some(expected), "unexpected error: {err}"),
        Ok(response) => panic!("expected {expected:?}, got {response:?}"),
    }
}

// =============================================================================
// Auth
// =============================================================================

#[tokio::test]
async fn login_then_validate_token() {
    let gateway = start_gateway().await;
    let auth = AuthClient::new(gateway.config());

    let login = auth.login("alice@example.com", "password").await.unwrap();
    let envelope = login.api_response.clone().unwrap();
    assert!(envelope.success);
    assert_eq!(envelope.code, Code::Ok as i32);
    assert_eq!(envelope.message, "Login successful");
    assert!(!login.token.is_empty());
    assert_eq!(login.user_info.unwrap().user_id, "u-1");

    let validated = auth.validate_token(&login.token).await.unwrap();
    assert!(validated.is_valid);
    assert_eq!(validated.user_info.unwrap().user_id, "u-1");
    assert!(validated.expires_at > 0);
    assert_populated(validated.api_response.as_ref());

    gateway.shutdown().await;
}

#[tokio::test]
async fn login_with_wrong_password_is_in_envelope() {
    let gateway = start_gateway().await;

    let response = AuthClient::new(gateway.config())
        .login("alice@example.com", "wrong")
        .await
        .unwrap();
    let envelope = response.api_response.unwrap();
    assert!(!envelope.success);
    assert_eq!(envelope.code, Code::Unauthenticated as i32);
    assert!(response.token.is_empty());

    gateway.shutdown().await;
}

// =============================================================================
// Auth layer
// =============================================================================

#[tokio::test]
async fn guarded_methods_require_a_token() {
    let gateway = start_gateway().await;
    let orders = OrderClient::new(gateway.config());
    let positions = PositionClient::new(gateway.config());

    assert_status(
        orders.submit_order(limit_order("u-1", "AAPL"), None).await,
        Code::Unauthenticated,
    );
    assert_status(
        orders.get_order_status("ord-1", "u-1", None).await,
        Code::Unauthenticated,
    );
    assert_status(
        orders.get_order_details("ord-1", "u-1", None).await,
        Code::Unauthenticated,
    );
    assert_status(
        orders.cancel_order("ord-1", "u-1", None).await,
        Code::Unauthenticated,
    );
    assert_status(positions.get_positions("u-1", None).await, Code::Unauthenticated);
    assert_status(
        positions.get_position_aggregation("u-1", None).await,
        Code::Unauthenticated,
    );

    let mut market = MarketDataServiceClient::connect(format!("http://{}", gateway.addr))
        .await
        .unwrap();
    let status = market
        .get_market_data(GetMarketDataRequest {
            symbols: vec!["AAPL".to_string()],
        })
        .await
        .unwrap_err();
    assert_eq!(status.code(), Code::Unauthenticated);

    gateway.shutdown().await;
}

#[tokio::test]
async fn unknown_token_is_rejected() {
    let gateway = start_gateway().await;
    let orders = OrderClient::new(gateway.config());

    assert_status(
        orders.get_order_status("ord-1", "u-1", Some("not-a-token")).await,
        Code::Unauthenticated,
    );

    gateway.shutdown().await;
}

#[tokio::test]
async fn mismatched_user_is_permission_denied() {
    let gateway = start_gateway().await;
    let token = login(&gateway, "alice@example.com").await;
    let orders = OrderClient::new(gateway.config());
    let positions = PositionClient::new(gateway.config());

    assert_status(
        orders.submit_order(limit_order("u-2", "AAPL"), Some(&token)).await,
        Code::PermissionDenied,
    );
    assert_status(
        orders.get_order_status("ord-1", "u-2", Some(&token)).await,
        Code::PermissionDenied,
    );
    assert_status(
        orders.cancel_order("ord-1", "u-2", Some(&token)).await,
        Code::PermissionDenied,
    );
    assert_status(
        positions.get_positions("u-2", Some(&token)).await,
        Code::PermissionDenied,
    );
    assert_status(
        positions.get_position_aggregation("u-2", Some(&token)).await,
        Code::PermissionDenied,
    );

    gateway.shutdown().await;
}

// =============================================================================
// Orders
// =============================================================================

#[tokio::test]
async fn order_lifecycle() {
    let gateway = start_gateway().await;
    let token = login(&gateway, "alice@example.com").await;
    let orders = OrderClient::new(gateway.config());

    let submitted = orders
        .submit_order(limit_order("u-1", "aapl"), Some(&token))
        .await
        .unwrap();
    let envelope = submitted.api_response.clone().unwrap();
    assert!(envelope.success);
    assert_eq!(envelope.message, "Order submitted successfully");
    assert_eq!(submitted.status, "PENDING");
    assert_eq!(submitted.estimated_price, Some(150.0));
    assert_eq!(submitted.market_price, Some(190.0));
    assert!(chrono::DateTime::parse_from_rfc3339(&submitted.submitted_at).is_ok());

    let details = orders
        .get_order_details(&submitted.order_id, "u-1", Some(&token))
        .await
        .unwrap();
    let order = details.order.unwrap();
    assert_eq!(order.symbol, "AAPL");
    assert_eq!(order.order_type, "LIMIT");
    assert_eq!(order.order_side, "BUY");
    assert_eq!(order.price, Some(150.0));

    let status = orders
        .get_order_status(&submitted.order_id, "u-1", Some(&token))
        .await
        .unwrap();
    assert_eq!(status.status, "PENDING");
    assert_eq!(status.status_message, "Order is currently PENDING");

    let cancelled = orders
        .cancel_order(&submitted.order_id, "u-1", Some(&token))
        .await
        .unwrap();
    assert!(cancelled.api_response.unwrap().success);
    assert_eq!(cancelled.status, "CANCELLED");

    let again = orders
        .cancel_order(&submitted.order_id, "u-1", Some(&token))
        .await
        .unwrap();
    let envelope = again.api_response.unwrap();
    assert!(!envelope.success);
    assert_eq!(envelope.code, Code::FailedPrecondition as i32);
    assert!(envelope.message.starts_with("Failed to cancel order"));

    gateway.shutdown().await;
}

#[tokio::test]
async fn executed_order_cannot_be_cancelled() {
    let gateway = start_gateway().await;
    let token = login(&gateway, "alice@example.com").await;
    let orders = OrderClient::new(gateway.config());

    let submitted = orders
        .submit_order(limit_order("u-1", "MSFT"), Some(&token))
        .await
        .unwrap();
    gateway
        .backend
        .set_order_status(&submitted.order_id, OrderStatus::Executed)
        .unwrap();

    let response = orders
        .cancel_order(&submitted.order_id, "u-1", Some(&token))
        .await
        .unwrap();
    assert_eq!(
        response.api_response.unwrap().code,
        Code::FailedPrecondition as i32
    );

    gateway.shutdown().await;
}

#[tokio::test]
async fn other_users_order_is_hidden() {
    let gateway = start_gateway().await;
    let alice = login(&gateway, "alice@example.com").await;
    let bob = login(&gateway, "bob@example.com").await;
    let orders = OrderClient::new(gateway.config());

    let submitted = orders
        .submit_order(limit_order("u-1", "AAPL"), Some(&alice))
        .await
        .unwrap();

    let response = orders
        .get_order_status(&submitted.order_id, "u-2", Some(&bob))
        .await
        .unwrap();
    let envelope = response.api_response.unwrap();
    assert!(!envelope.success);
    assert_eq!(envelope.code, Code::PermissionDenied as i32);

    gateway.shutdown().await;
}

#[tokio::test]
async fn empty_order_id_is_invalid_argument() {
    let gateway = start_gateway().await;
    let token = login(&gateway, "alice@example.com").await;

    let response = OrderClient::new(gateway.config())
        .get_order_status("", "u-1", Some(&token))
        .await
        .unwrap();
    let envelope = response.api_response.unwrap();
    assert!(!envelope.success);
    assert_eq!(envelope.code, Code::InvalidArgument as i32);
    assert_eq!(envelope.message, "Order ID is required");
    assert!(envelope.timestamp > 0);

    gateway.shutdown().await;
}

// =============================================================================
// Positions
// =============================================================================

#[tokio::test]
async fn positions_are_projected_from_aggregation() {
    let gateway = start_gateway().await;
    let token = login(&gateway, "alice@example.com").await;
    let positions = PositionClient::new(gateway.config());

    let response = positions.get_positions("u-1", Some(&token)).await.unwrap();
    let envelope = response.api_response.unwrap();
    assert!(envelope.success);
    assert_eq!(envelope.message, "Retrieved 2 positions");
    assert_eq!(response.total_count, 2);

    let ids: Vec<_> = response
        .positions
        .iter()
        .map(|p| p.position_id.as_str())
        .collect();
    assert_eq!(ids, ["pos-AAPL", "pos-HGLG11"]);
    assert!(response
        .positions
        .iter()
        .all(|p| p.position_type == "LONG" && p.status == "ACTIVE" && p.user_id == "u-1"));

    let aggregation = positions
        .get_position_aggregation("u-1", Some(&token))
        .await
        .unwrap()
        .aggregation
        .unwrap();
    assert_eq!(aggregation.categories.len(), 2);
    assert_eq!(aggregation.total_positions, 2);
    assert!((aggregation.total_invested - (10.0 * 150.0 + 5.0 * 155.0)).abs() < 1e-9);

    gateway.shutdown().await;
}

#[tokio::test]
async fn position_writes_are_unimplemented() {
    let gateway = start_gateway().await;
    let token = login(&gateway, "alice@example.com").await;
    let positions = PositionClient::new(gateway.config());

    let created = positions
        .create_position(
            CreatePositionRequest {
                user_id: "u-1".to_string(),
                symbol: "MSFT".to_string(),
                quantity: 1.0,
                price: 400.0,
                position_type: "LONG".to_string(),
            },
            Some(&token),
        )
        .await
        .unwrap();
    let envelope = created.api_response.unwrap();
    assert!(!envelope.success);
    assert_eq!(envelope.code, Code::Unimplemented as i32);
    assert!(created.position.is_none());

    let updated = positions
        .update_position(
            UpdatePositionRequest {
                position_id: "pos-AAPL".to_string(),
                user_id: "u-1".to_string(),
                quantity: 1.0,
                price: 1.0,
            },
            Some(&token),
        )
        .await
        .unwrap();
    assert_eq!(
        updated.api_response.unwrap().code,
        Code::Unimplemented as i32
    );

    let listed = positions.get_positions("u-1", Some(&token)).await.unwrap();
    assert_eq!(listed.total_count, 2);

    gateway.shutdown().await;
}

// =============================================================================
// Market data
// =============================================================================

#[tokio::test]
async fn market_data_for_known_symbols() {
    let gateway = start_gateway().await;
    let token = login(&gateway, "alice@example.com").await;

    let mut client = MarketDataServiceClient::connect(format!("http://{}", gateway.addr))
        .await
        .unwrap();
    let mut request = Request::new(GetMarketDataRequest {
        symbols: vec!["aapl".to_string(), " msft ".to_string()],
    });
    request
        .metadata_mut()
        .insert("authorization", format!("Bearer {token}").parse().unwrap());

    let response = client.get_market_data(request).await.unwrap().into_inner();
    let envelope = response.api_response.unwrap();
    assert!(envelope.success);
    assert_eq!(envelope.message, "Retrieved 2 market data entries");

    let symbols: Vec<_> = response
        .market_data
        .iter()
        .map(|m| m.symbol.as_str())
        .collect();
    assert_eq!(symbols, ["AAPL", "MSFT"]);

    gateway.shutdown().await;
}
