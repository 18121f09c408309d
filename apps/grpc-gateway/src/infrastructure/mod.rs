//! Infrastructure Layer - Adapters for transport, clients and storage.

/// Outbound client facades.
pub mod client;

/// Environment configuration for the binary.
pub mod config;

/// gRPC server: middleware, handlers and transport endpoint.
pub mod grpc;

/// In-memory development adapters.
pub mod persistence;

/// Tracing subscriber set-up.
pub mod telemetry;
