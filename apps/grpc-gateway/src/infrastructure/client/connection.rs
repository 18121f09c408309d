//! Lazily dialled stub shared by every facade.

use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::Mutex;
use tonic::Request;
use tonic::metadata::{Ascii, MetadataValue};
use tonic::transport::{Channel, Endpoint};

use super::config::ClientConfig;
use super::error::ClientError;

/// A client that can release its connection.
#[async_trait]
pub trait ClosableClient: Send + Sync {
    /// Name used in logs.
    fn name(&self) -> &'static str;

    /// Drop the connection. Idempotent.
    async fn close(&self) -> Result<(), ClientError>;
}

/// One generated stub, dialled on first use.
pub(crate) struct LazyStub<C> {
    config: ClientConfig,
    make: fn(Channel) -> C,
    stub: Mutex<Option<C>>,
}

impl<C: Clone> LazyStub<C> {
    pub(crate) fn new(config: ClientConfig, make: fn(Channel) -> C) -> Self {
        Self {
            config,
            make,
            stub: Mutex::new(None),
        }
    }

    pub(crate) const fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// The connected stub, dialling if needed.
    ///
    /// The lock is held while dialling so concurrent first callers share one
    /// connection.
    pub(crate) async fn get(&self) -> Result<C, ClientError> {
        let mut guard = self.stub.lock().await;
        if let Some(stub) = guard.as_ref() {
            return Ok(stub.clone());
        }
        let channel = dial(&self.config).await?;
        let stub = (self.make)(channel);
        *guard = Some(stub.clone());
        Ok(stub)
    }

    pub(crate) async fn connect(&self) -> Result<(), ClientError> {
        self.get().await.map(|_| ())
    }

    pub(crate) async fn is_connected(&self) -> bool {
        self.stub.lock().await.is_some()
    }

    pub(crate) async fn close(&self) {
        if self.stub.lock().await.take().is_some() {
            tracing::debug!(address = %self.config.server_address, "Client connection closed");
        }
    }
}

async fn dial(config: &ClientConfig) -> Result<Channel, ClientError> {
    let uri = config.endpoint_uri();
    let endpoint = Endpoint::from_shared(uri.clone())
        .map_err(|source| ClientError::InvalidAddress {
            address: config.server_address.clone(),
            source,
        })?
        .connect_timeout(config.timeout)
        .tcp_nodelay(true);

    let channel = endpoint
        .connect()
        .await
        .map_err(|source| ClientError::Connect {
            address: uri.clone(),
            source,
        })?;
    tracing::info!(address = %uri, "Connected");
    Ok(channel)
}

/// Wrap `message` with a deadline and, when given, a bearer token.
pub(crate) fn outbound<T>(
    message: T,
    timeout: Duration,
    token: Option<&str>,
) -> Result<Request<T>, ClientError> {
    let mut request = Request::new(message);
    request.set_timeout(timeout);
    if let Some(token) = token.filter(|t| !t.is_empty()) {
        let value: MetadataValue<Ascii> = MetadataValue::try_from(format!("Bearer {token}"))
            .map_err(|_| ClientError::InvalidToken)?;
        request.metadata_mut().insert("authorization", value);
    }
    Ok(request)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn outbound_sets_deadline_and_bearer() {
        let request = outbound((), Duration::from_secs(3), Some("TKN")).unwrap();
        assert_eq!(
            request.metadata().get("authorization").unwrap(),
            "Bearer TKN"
        );
        assert!(request.metadata().get("grpc-timeout").is_some());
    }

    #[test]
    fn outbound_without_token_has_no_authorization() {
        let request = outbound((), Duration::from_secs(1), None).unwrap();
        assert!(request.metadata().get("authorization").is_none());

        let request = outbound((), Duration::from_secs(1), Some("")).unwrap();
        assert!(request.metadata().get("authorization").is_none());
    }

    #[test]
    fn token_with_control_characters_is_rejected() {
        assert!(matches!(
            outbound((), Duration::from_secs(1), Some("bad\ntoken")),
            Err(ClientError::InvalidToken)
        ));
    }
}
