//! Client Manager
//!
//! Holds the Auth, Order and Position clients under one configuration and
//! fans `close()` across them.

use std::sync::Arc;

use super::auth::AuthClient;
use super::config::ClientConfig;
use super::connection::ClosableClient;
use super::error::ClientError;
use super::order::OrderClient;
use super::position::PositionClient;

/// The three HubInvestments clients sharing one configuration.
pub struct ClientManager {
    config: ClientConfig,
    auth: Arc<AuthClient>,
    order: Arc<OrderClient>,
    position: Arc<PositionClient>,
    attached: Vec<Arc<dyn ClosableClient>>,
}

impl ClientManager {
    /// Create the three clients. Nothing is dialled until first use.
    #[must_use]
    pub fn new(config: ClientConfig) -> Self {
        Self {
            auth: Arc::new(AuthClient::new(config.clone())),
            order: Arc::new(OrderClient::new(config.clone())),
            position: Arc::new(PositionClient::new(config.clone())),
            attached: Vec::new(),
            config,
        }
    }

    /// Shared configuration.
    #[must_use]
    pub const fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Auth client.
    #[must_use]
    pub fn auth(&self) -> Arc<AuthClient> {
        Arc::clone(&self.auth)
    }

    /// Order client.
    #[must_use]
    pub fn order(&self) -> Arc<OrderClient> {
        Arc::clone(&self.order)
    }

    /// Position client.
    #[must_use]
    pub fn position(&self) -> Arc<PositionClient> {
        Arc::clone(&self.position)
    }

    /// Also close `client` when the manager closes (e.g. a User service client).
    pub fn attach(&mut self, client: Arc<dyn ClosableClient>) {
        self.attached.push(client);
    }

    /// Dial every client.
    pub async fn connect_all(&self) -> Result<(), ClientError> {
        self.auth.connect().await?;
        self.order.connect().await?;
        self.position.connect().await?;
        Ok(())
    }

    fn closables(&self) -> Vec<Arc<dyn ClosableClient>> {
        let mut clients: Vec<Arc<dyn ClosableClient>> = vec![
            Arc::clone(&self.auth) as Arc<dyn ClosableClient>,
            Arc::clone(&self.order) as Arc<dyn ClosableClient>,
            Arc::clone(&self.position) as Arc<dyn ClosableClient>,
        ];
        clients.extend(self.attached.iter().cloned());
        clients
    }

    /// Close every client, even when some fail.
    ///
    /// # Errors
    ///
    /// [`ClientError::Close`] carrying every individual failure.
    pub async fn close(&self) -> Result<(), ClientError> {
        let mut failures = Vec::new();
        for client in self.closables() {
            if let Err(e) = client.close().await {
                tracing::warn!(client = client.name(), error = %e, "Failed to close client");
                failures.push(e);
            }
        }
        if failures.is_empty() {
            Ok(())
        } else {
            Err(ClientError::Close(failures))
        }
    }
}
