//! gRPC Server
//!
//! Exposes the Auth, Order, Position and MarketData services on a single
//! endpoint.
//!
//! # Architecture
//!
//! Every inbound call passes through the same stages:
//!
//! 1. [`AuthLayer`] reads the `authorization` header, validates the bearer
//!    token and attaches a `Principal` to the request (allowlisted methods
//!    skip this step)
//! 2. The service handler reads the principal back and checks that the body
//!    `user_id`, when present, matches it
//! 3. Input is validated and translated into an application command
//! 4. The use case resolved from the container runs
//! 5. The outcome is mapped to an `ApiResponse` envelope or a transport status

pub mod auth;
pub mod auth_service;
pub mod envelope;
pub mod guard;
pub mod market_data_service;
pub mod order_service;
pub mod position_service;
pub mod server;

// Allow clippy warnings and missing docs in generated code
#[allow(
    missing_docs,
    clippy::all,
    clippy::pedantic,
    clippy::nursery,
    clippy::unwrap_used,
    clippy::expect_used
)]
pub mod proto {
    pub mod hub {
        pub mod v1 {
            include!(concat!(env!("OUT_DIR"), "/hub.v1.rs"));
        }
    }
}

pub use auth::{AuthLayer, AuthMiddleware, AuthServiceTokenValidator, MethodPolicy};
pub use auth_service::AuthServiceImpl;
pub use market_data_service::MarketDataServiceImpl;
pub use order_service::OrderServiceImpl;
pub use position_service::PositionServiceImpl;
pub use server::{GrpcServer, ServerError};
