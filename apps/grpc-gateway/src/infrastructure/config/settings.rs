//! Gateway Configuration Settings
//!
//! Loaded from environment variables (after `.env` is applied by the binary).
//!
//! | Variable | Default |
//! |----------|---------|
//! | `HUB_GRPC_PORT` | `50051` |
//! | `HUB_TOKEN_VALIDATION` | `local` (`local` or `remote`) |
//! | `HUB_USER_SERVICE_ADDR` | `localhost:50052` |
//! | `HUB_CLIENT_TIMEOUT_SECS` | `30` |
//! | `HUB_TOKEN_TTL_SECS` | `86400` |

use std::time::Duration;

use crate::infrastructure::client::{ClientConfig, DEFAULT_TIMEOUT, DEFAULT_USER_SERVICE_ADDRESS};

const DEFAULT_GRPC_PORT: u16 = 50051;
const DEFAULT_TOKEN_TTL: Duration = Duration::from_secs(86_400);

/// Where bearer tokens are validated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TokenValidationMode {
    /// The container's own auth service.
    #[default]
    Local,
    /// The remote User service.
    Remote,
}

impl TokenValidationMode {
    /// Parse `local` / `remote`, case-insensitively.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "local" => Some(Self::Local),
            "remote" => Some(Self::Remote),
            _ => None,
        }
    }

    /// Name used in logs.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Local => "local",
            Self::Remote => "remote",
        }
    }
}

/// Gateway configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GatewayConfig {
    /// Port the gRPC server binds on `0.0.0.0`.
    pub grpc_port: u16,
    /// Token validation strategy.
    pub token_validation: TokenValidationMode,
    /// User service client settings (used in remote mode).
    pub user_service: ClientConfig,
    /// Lifetime of tokens issued by the development auth service.
    pub token_ttl: Duration,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            grpc_port: DEFAULT_GRPC_PORT,
            token_validation: TokenValidationMode::Local,
            user_service: ClientConfig::user_service(),
            token_ttl: DEFAULT_TOKEN_TTL,
        }
    }
}

impl GatewayConfig {
    /// Create configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if a variable is set to an unparsable value.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Create configuration from an arbitrary variable source.
    ///
    /// # Errors
    ///
    /// Returns an error if a variable is set to an unparsable value.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let grpc_port = parse_var(&lookup, "HUB_GRPC_PORT", DEFAULT_GRPC_PORT)?;

        let token_validation = match lookup("HUB_TOKEN_VALIDATION") {
            Some(value) => TokenValidationMode::parse(&value)
                .ok_or_else(|| ConfigError::invalid("HUB_TOKEN_VALIDATION", &value))?,
            None => TokenValidationMode::default(),
        };

        let address = lookup("HUB_USER_SERVICE_ADDR")
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_USER_SERVICE_ADDRESS.to_string());
        let timeout = Duration::from_secs(parse_var(
            &lookup,
            "HUB_CLIENT_TIMEOUT_SECS",
            DEFAULT_TIMEOUT.as_secs(),
        )?);
        let token_ttl = Duration::from_secs(parse_var(
            &lookup,
            "HUB_TOKEN_TTL_SECS",
            DEFAULT_TOKEN_TTL.as_secs(),
        )?);

        Ok(Self {
            grpc_port,
            token_validation,
            user_service: ClientConfig::new(address).with_timeout(timeout),
            token_ttl,
        })
    }
}

/// Configuration error.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    /// Environment variable has a value that cannot be parsed.
    #[error("invalid value for {key}: {value:?}")]
    InvalidValue {
        /// Variable name.
        key: String,
        /// Offending value.
        value: String,
    },
}

impl ConfigError {
    fn invalid(key: &str, value: &str) -> Self {
        Self::InvalidValue {
            key: key.to_string(),
            value: value.to_string(),
        }
    }
}

fn parse_var<F, T>(lookup: &F, key: &str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
{
    match lookup(key) {
        Some(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::invalid(key, &value)),
        None => Ok(default),
    }
}
