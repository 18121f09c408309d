//! Domain Layer - Identity, order, position and market data types.
//!
//! Pure Rust types with serialization support. Nothing here knows about
//! gRPC or the dependency container.

/// Authenticated principals and platform users.
pub mod identity;

/// Market quotes.
pub mod market_data;

/// Order value objects (type, side, status).
pub mod order;

/// Position aggregation read models.
pub mod position;
