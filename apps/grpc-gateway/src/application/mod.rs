//! Application Layer - Ports, commands and the dependency container.
//!
//! Handlers in the gRPC layer reach business logic only through the narrow
//! ports declared here, resolved from a [`container::Container`].

/// Dependency container.
pub mod container;

/// Use-case and token errors.
pub mod errors;

/// Driven ports (one trait per use case).
pub mod ports;
