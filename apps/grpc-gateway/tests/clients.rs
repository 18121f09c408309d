//! Outbound Client Integration Tests
//!
//! Connection lifecycle of the client facades against a live gateway, and
//! token validation delegated to a stand-in User service.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use tonic::transport::Server;
use tonic::{Code, Request, Response, Status};

use hub_grpc_gateway::{
    AuthServiceTokenValidator, ClientConfig, ClientError, ClientManager, ClosableClient, Container,
    GrpcServer, InMemoryBackend, OrderClient, TokenValidator, UserServiceClient,
    proto::{
        ApiResponse, GetUserProfileRequest, GetUserProfileResponse, SubmitOrderRequest, UserInfo,
        UserValidateTokenRequest, UserValidateTokenResponse,
        user_service_server::{UserService, UserServiceServer},
    },
};

const USER_TOKEN: &str = "user-service-token";
const REVOKED_TOKEN: &str = "revoked-token";

/// Accepts only [`USER_TOKEN`], which belongs to `u-1`, and answers
/// [`REVOKED_TOKEN`] with an `Unauthenticated` status.
struct StubUserService;

#[tonic::async_trait]
impl UserService for StubUserService {
    async fn validate_token(
        &self,
        request: Request<UserValidateTokenRequest>,
    ) -> Result<Response<UserValidateTokenResponse>, Status> {
        if request.get_ref().token == REVOKED_TOKEN {
            return Err(Status::unauthenticated("token revoked"));
        }
        let valid = request.get_ref().token == USER_TOKEN;
        Ok(Response::new(UserValidateTokenResponse {
            api_response: Some(ApiResponse {
                success: valid,
                message: if valid { "ok" } else { "invalid" }.to_string(),
                code: 0,
                timestamp: 1,
            }),
            is_valid: valid,
            user_info: valid.then(|| UserInfo {
                user_id: "u-1".to_string(),
                email: "alice@example.com".to_string(),
                first_name: String::new(),
                last_name: String::new(),
            }),
            expires_at: 0,
        }))
    }

    async fn get_user_profile(
        &self,
        _request: Request<GetUserProfileRequest>,
    ) -> Result<Response<GetUserProfileResponse>, Status> {
        Err(Status::unimplemented("not used"))
    }
}

async fn start_user_service() -> SocketAddr {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        Server::builder()
            .add_service(UserServiceServer::new(StubUserService))
            .serve_with_incoming(tokio_stream::wrappers::TcpListenerStream::new(listener))
            .await
            .unwrap();
    });
    addr
}

/// Start the gateway, validating tokens locally unless `validator` is given.
async fn start_gateway(validator: Option<Arc<dyn TokenValidator>>) -> (SocketAddr, GrpcServer) {
    let container = InMemoryBackend::demo().container().unwrap();
    let addr: SocketAddr = "127.0.0.1:0".parse().unwrap();
    let validator = validator.unwrap_or_else(|| -> Arc<dyn TokenValidator> {
        Arc::new(AuthServiceTokenValidator::new(container.auth_service()))
    });
    let (server, listener) = GrpcServer::create_with_validator(&container, validator, addr)
        .await
        .unwrap();
    let addr = listener.local_addr().unwrap();

    let serving = server.clone();
    tokio::spawn(async move { serving.serve(listener).await.unwrap() });
    (addr, server)
}

fn config(addr: SocketAddr) -> ClientConfig {
    ClientConfig::new(addr.to_string()).with_timeout(Duration::from_secs(5))
}

/// A loopback address with nothing listening on it.
fn dead_address() -> SocketAddr {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    listener.local_addr().unwrap()
}

fn market_order(user_id: &str) -> SubmitOrderRequest {
    SubmitOrderRequest {
        user_id: user_id.to_string(),
        symbol: "AAPL".to_string(),
        order_type: "MARKET".to_string(),
        order_side: "BUY".to_string(),
        quantity: 1.0,
        price: None,
    }
}

#[tokio::test]
async fn closed_client_redials_on_next_call() {
    let (addr, server) = start_gateway(None).await;
    let orders = OrderClient::new(config(addr));
    assert!(!orders.is_connected().await);

    orders.connect().await.unwrap();
    assert!(orders.is_connected().await);

    ClosableClient::close(&orders).await.unwrap();
    ClosableClient::close(&orders).await.unwrap();
    assert!(!orders.is_connected().await);

    let err = orders
        .get_order_status("ord-1", "u-1", None)
        .await
        .unwrap_err();
    assert_eq!(err.code(), Some(Code::Unauthenticated));
    assert!(orders.is_connected().await);

    server.stop();
}

#[tokio::test]
async fn unreachable_server_is_a_connect_error() {
    let orders = OrderClient::new(
        ClientConfig::new(dead_address().to_string()).with_timeout(Duration::from_secs(2)),
    );

    let err = orders.submit_order(market_order("u-1"), Some("TKN")).await;
    assert!(matches!(err, Err(ClientError::Connect { .. })));
    assert!(!orders.is_connected().await);
}

#[tokio::test]
async fn invalid_address_is_reported() {
    let orders = OrderClient::new(ClientConfig::new("not a uri"));
    assert!(matches!(
        orders.connect().await,
        Err(ClientError::InvalidAddress { .. })
    ));
}

#[tokio::test]
async fn manager_shares_configuration_and_closes_everything() {
    let (addr, server) = start_gateway(None).await;
    let user_service = Arc::new(UserServiceClient::new(config(dead_address())));

    let mut manager = ClientManager::new(config(addr));
    manager.attach(user_service);
    assert_eq!(manager.config().server_address, addr.to_string());

    manager.connect_all().await.unwrap();
    assert!(manager.auth().is_connected().await);
    assert!(manager.order().is_connected().await);
    assert!(manager.position().is_connected().await);

    manager.close().await.unwrap();
    assert!(!manager.auth().is_connected().await);
    assert!(!manager.order().is_connected().await);
    assert!(!manager.position().is_connected().await);

    let login = manager
        .auth()
        .login("alice@example.com", "password")
        .await
        .unwrap();
    assert!(login.api_response.unwrap().success);

    server.stop();
}

#[tokio::test]
async fn remote_validation_uses_the_user_service() {
    let user_addr = start_user_service().await;
    let validator: Arc<dyn TokenValidator> = Arc::new(UserServiceClient::new(config(user_addr)));
    let (addr, server) = start_gateway(Some(validator)).await;
    let orders = OrderClient::new(config(addr));

    let submitted = orders
        .submit_order(market_order("u-1"), Some(USER_TOKEN))
        .await
        .unwrap();
    let envelope = submitted.api_response.unwrap();
    assert!(envelope.success, "{}", envelope.message);
    assert_eq!(submitted.market_price, Some(190.0));

    let err = orders
        .submit_order(market_order("u-1"), Some("forged"))
        .await
        .unwrap_err();
    assert_eq!(err.code(), Some(Code::Unauthenticated));

    server.stop();
}

#[tokio::test]
async fn user_service_rejection_is_an_invalid_token() {
    let user_addr = start_user_service().await;
    let validator: Arc<dyn TokenValidator> = Arc::new(UserServiceClient::new(config(user_addr)));
    let (addr, server) = start_gateway(Some(validator)).await;

    let err = OrderClient::new(config(addr))
        .get_order_status("ord-1", "u-1", Some(REVOKED_TOKEN))
        .await
        .unwrap_err();
    match err {
        ClientError::Rpc { status, .. } => {
            assert_eq!(status.code(), Code::Unauthenticated);
            assert_eq!(status.message(), "Invalid token");
        }
        other => panic!("unexpected error: {other}"),
    }

    server.stop();
}

#[tokio::test]
async fn unreachable_user_service_rejects_calls() {
    let validator: Arc<dyn TokenValidator> =
        Arc::new(UserServiceClient::new(config(dead_address())));
    let (addr, server) = start_gateway(Some(validator)).await;

    let err = OrderClient::new(config(addr))
        .get_order_status("ord-1", "u-1", Some(USER_TOKEN))
        .await
        .unwrap_err();
    match err {
        ClientError::Rpc { status, .. } => {
            assert_eq!(status.code(), Code::Unauthenticated);
            assert_eq!(status.message(), "Token validation unavailable");
        }
        other => panic!("unexpected error: {other}"),
    }

    server.stop();
}
