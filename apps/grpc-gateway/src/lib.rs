#![cfg_attr(
    test,
    allow(
        clippy::unwrap_used,
        clippy::expect_used,
        clippy::float_cmp,
        clippy::too_many_lines,
        clippy::needless_pass_by_value,
        clippy::items_after_statements
    )
)]

//! HubInvestments gRPC Gateway
//!
//! The gRPC edge of the HubInvestments backend. A single endpoint exposes the
//! Auth, Order, Position and MarketData services; every call passes through an
//! authentication middleware, a principal/ownership check and a use case
//! resolved from a dependency container, and every response carries a uniform
//! status envelope.
//!
//! # Layers (inside → outside)
//!
//! - **Domain**: Identity, order, position and market data types
//!   - `identity`: `Principal` and `User`
//!   - `order`: order type/side/status value objects
//!   - `position`: position aggregation read models
//!   - `market_data`: market quotes
//!
//! - **Application**: Ports and dependency wiring
//!   - `ports`: one narrow trait per use case (`LoginUseCase`, `SubmitOrderUseCase`, ...)
//!   - `container`: `Container` trait and the `ServiceContainer` builder
//!   - `errors`: `UseCaseError` and `TokenError`
//!
//! - **Infrastructure**: Adapters
//!   - `grpc`: auth middleware, service handlers, envelope, transport endpoint
//!   - `client`: outbound client facades and `ClientManager`
//!   - `persistence`: in-memory development adapters for every port
//!   - `config`: environment configuration for the binary
//!   - `telemetry`: tracing subscriber set-up
//!
//! # Request Flow
//!
//! ```text
//! caller ──► transport ──► AuthLayer ──► handler ──► validate ──► authorize
//!                                                                    │
//!              response ◄── envelope ◄── use case (via Container) ◄──┘
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::pedantic)]

// =============================================================================
// Module Declarations
// =============================================================================

/// Domain layer - Core types with no transport dependencies.
pub mod domain;

/// Application layer - Ports, commands and the dependency container.
pub mod application;

/// Infrastructure layer - gRPC server, clients and adapters.
pub mod infrastructure;

// =============================================================================
// Re-exports
// =============================================================================

// Domain types
pub use domain::identity::{Principal, User};
pub use domain::market_data::MarketQuote;
pub use domain::order::{OrderFieldError, OrderSide, OrderStatus, OrderType};
pub use domain::position::{AggregationSummary, AssetSummary, CategorySummary};

// Application ports and wiring
pub use application::container::{Container, ContainerError, ServiceContainer};
pub use application::errors::{TokenError, UseCaseError};
pub use application::ports::{
    CancelOrderCommand, CancelOrderResult, CancelOrderUseCase, GetOrderStatusUseCase,
    LoginUseCase, MarketDataUseCase, OrderView, PositionAggregationUseCase, SubmitOrderCommand,
    SubmitOrderResult, SubmitOrderUseCase, TokenClaims, TokenService, TokenValidator,
};

// gRPC server
pub use infrastructure::grpc::{
    AuthLayer, AuthServiceTokenValidator, GrpcServer, MethodPolicy, ServerError,
    proto::hub::v1 as proto,
};

// Outbound clients
pub use infrastructure::client::{
    AuthClient, ClientConfig, ClientError, ClientManager, ClosableClient, OrderClient,
    PositionClient, UserServiceClient,
};

// Development adapters
pub use infrastructure::persistence::InMemoryBackend;

// Configuration and telemetry
pub use infrastructure::config::{ConfigError, GatewayConfig, TokenValidationMode};
pub use infrastructure::telemetry::init as init_telemetry;
