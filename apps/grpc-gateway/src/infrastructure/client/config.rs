//! Configuration for outbound clients.

use std::time::Duration;

/// Default HubInvestments gRPC address.
pub const DEFAULT_SERVER_ADDRESS: &str = "localhost:50051";

/// Default User service address.
pub const DEFAULT_USER_SERVICE_ADDRESS: &str = "localhost:50052";

/// Default per-call deadline.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Where to dial and how long each call may take.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// `host:port` or a full `http://` URI.
    pub server_address: String,
    /// Per-call deadline, also used as the connect timeout.
    pub timeout: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            server_address: DEFAULT_SERVER_ADDRESS.to_string(),
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

impl ClientConfig {
    /// Configuration for `server_address` with the default timeout.
    #[must_use]
    pub fn new(server_address: impl Into<String>) -> Self {
        Self {
            server_address: server_address.into(),
            ..Default::default()
        }
    }

    /// Configuration for the User service.
    #[must_use]
    pub fn user_service() -> Self {
        Self::new(DEFAULT_USER_SERVICE_ADDRESS)
    }

    /// Set the per-call deadline.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Address as a URI; bare `host:port` gets an `http://` scheme.
    #[must_use]
    pub fn endpoint_uri(&self) -> String {
        if self.server_address.contains("://") {
            self.server_address.clone()
        } else {
            format!("http://{}", self.server_address)
        }
    }
}
