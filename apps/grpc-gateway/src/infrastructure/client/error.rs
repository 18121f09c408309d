//! Error types for outbound clients.

use thiserror::Error;

/// Errors returned by the client facades.
#[derive(Debug, Error)]
pub enum ClientError {
    /// The configured address is not a valid URI.
    #[error("invalid server address {address}: {source}")]
    InvalidAddress {
        /// Configured address.
        address: String,
        /// Parse error.
        #[source]
        source: tonic::transport::Error,
    },

    /// Dialling the server failed.
    #[error("failed to connect to {address}: {source}")]
    Connect {
        /// Dialled URI.
        address: String,
        /// Transport error.
        #[source]
        source: tonic::transport::Error,
    },

    /// The bearer token cannot be carried in metadata.
    #[error("invalid authorization token")]
    InvalidToken,

    /// The server answered with a non-OK status.
    #[error("{method} failed: {status}")]
    Rpc {
        /// RPC name, e.g. `SubmitOrder`.
        method: &'static str,
        /// Status returned by the server.
        status: Box<tonic::Status>,
    },

    /// One or more clients failed to close.
    #[error("failed to close {} client(s)", .0.len())]
    Close(Vec<ClientError>),
}

impl ClientError {
    /// Wrap a status returned by `method`.
    #[must_use]
    pub fn rpc(method: &'static str, status: tonic::Status) -> Self {
        Self::Rpc {
            method,
            status: Box::new(status),
        }
    }

    /// gRPC code of an `Rpc` error.
    #[must_use]
    pub fn code(&self) -> Option<tonic::Code> {
        match self {
            Self::Rpc { status, .. } => Some(status.code()),
            _ => None,
        }
    }
}
