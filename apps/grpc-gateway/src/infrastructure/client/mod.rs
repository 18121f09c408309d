//! Outbound Client Facades
//!
//! Thin wrappers over the generated stubs used by peer services.
//!
//! # Connection Model
//!
//! Each facade owns one lazily dialled stub behind an async mutex:
//!
//! - the first RPC (or an explicit `connect()`) dials; concurrent first use
//!   dials exactly once
//! - `close()` drops the stub; the next RPC dials again
//! - every RPC carries a deadline derived from [`ClientConfig::timeout`]
//!
//! Order and position calls attach `authorization: Bearer <token>` when a
//! token is supplied.

mod auth;
mod config;
mod connection;
mod error;
mod manager;
mod order;
mod position;
mod user;

pub use auth::AuthClient;
pub use config::{ClientConfig, DEFAULT_SERVER_ADDRESS, DEFAULT_TIMEOUT, DEFAULT_USER_SERVICE_ADDRESS};
pub use connection::ClosableClient;
pub use error::ClientError;
pub use manager::ClientManager;
pub use order::OrderClient;
pub use position::PositionClient;
pub use user::UserServiceClient;
