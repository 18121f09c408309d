//! HubInvestments gRPC Gateway Binary
//!
//! Serves the Auth, Order, Position and MarketData services backed by the
//! in-memory development adapters.
//!
//! # Usage
//!
//! ```bash
//! cargo run --bin hub-grpc-gateway
//! ```
//!
//! # Environment Variables
//!
//! - `HUB_GRPC_PORT`: gRPC server port (default: 50051)
//! - `HUB_TOKEN_VALIDATION`: local | remote (default: local)
//! - `HUB_USER_SERVICE_ADDR`: User service address for remote validation (default: localhost:50052)
//! - `HUB_CLIENT_TIMEOUT_SECS`: outbound call deadline (default: 30)
//! - `HUB_TOKEN_TTL_SECS`: lifetime of issued tokens (default: 86400)
//! - `RUST_LOG`: Log level (default: info)

use std::sync::Arc;

use anyhow::Context;
use hub_grpc_gateway::{
    AuthServiceTokenValidator, Container, GatewayConfig, GrpcServer, InMemoryBackend,
    TokenValidationMode, TokenValidator, UserServiceClient, init_telemetry,
};
use tokio::signal;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    load_dotenv();
    init_telemetry();

    tracing::info!(version = env!("CARGO_PKG_VERSION"), "Starting HubInvestments gRPC gateway");

    let config = GatewayConfig::from_env().context("invalid configuration")?;
    log_config(&config);

    let backend = Arc::new(InMemoryBackend::new(config.token_ttl).with_demo_data());
    let container = backend
        .container()
        .context("failed to assemble service container")?;

    let validator: Arc<dyn TokenValidator> = match config.token_validation {
        TokenValidationMode::Local => {
            Arc::new(AuthServiceTokenValidator::new(container.auth_service()))
        }
        TokenValidationMode::Remote => {
            Arc::new(UserServiceClient::new(config.user_service.clone()))
        }
    };

    let addr = std::net::SocketAddr::from(([0, 0, 0, 0], config.grpc_port));
    let (server, listener) = GrpcServer::create_with_validator(&container, validator, addr)
        .await
        .context("failed to start gRPC server")?;

    let shutdown = server.clone();
    tokio::spawn(async move {
        await_shutdown().await;
        shutdown.stop();
    });

    server.serve(listener).await.context("gRPC server error")?;

    tracing::info!("Gateway stopped");
    Ok(())
}

/// Log the parsed configuration.
fn log_config(config: &GatewayConfig) {
    tracing::info!(
        grpc_port = config.grpc_port,
        token_validation = config.token_validation.as_str(),
        token_ttl_secs = config.token_ttl.as_secs(),
        "Configuration loaded"
    );
    if config.token_validation == TokenValidationMode::Remote {
        tracing::info!(
            user_service = %config.user_service.server_address,
            timeout_secs = config.user_service.timeout.as_secs(),
            "Validating tokens with the User service"
        );
    }
}

/// Load .env file from current directory or any ancestor directory.
fn load_dotenv() {
    if dotenvy::dotenv().is_ok() {
        return;
    }

    if let Ok(cwd) = std::env::current_dir() {
        let mut dir = cwd.as_path();
        while let Some(parent) = dir.parent() {
            let env_path = parent.join(".env");
            if env_path.exists() {
                let _ = dotenvy::from_path(&env_path);
                return;
            }
            dir = parent;
        }
    }
}

/// Wait for shutdown signal (SIGTERM or SIGINT).
async fn await_shutdown() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            tracing::info!("Received Ctrl+C, initiating shutdown");
        }
        () = terminate => {
            tracing::info!("Received SIGTERM, initiating shutdown");
        }
    }
}
