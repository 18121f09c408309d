//! In-Memory Backend
//!
//! One struct implementing every port. Users, tokens, orders, holdings and
//! quotes live in `parking_lot` maps.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use parking_lot::RwLock;
use uuid::Uuid;

use crate::application::container::{ContainerError, ServiceContainer};
use crate::application::errors::{TokenError, UseCaseError};
use crate::application::ports::{
    CancelOrderCommand, CancelOrderResult, CancelOrderUseCase, GetOrderStatusUseCase,
    LoginUseCase, MarketDataUseCase, OrderView, PositionAggregationUseCase, SubmitOrderCommand,
    SubmitOrderResult, SubmitOrderUseCase, TokenClaims, TokenService,
};
use crate::domain::identity::User;
use crate::domain::market_data::MarketQuote;
use crate::domain::order::OrderStatus;
use crate::domain::position::{AggregationSummary, AssetSummary, CategorySummary};

/// Default token lifetime.
pub const DEFAULT_TOKEN_TTL: Duration = Duration::from_secs(24 * 60 * 60);

struct Account {
    user: User,
    password: String,
}

/// In-memory implementation of every port.
///
/// Passwords are stored in plain text; this backend is for development only.
pub struct InMemoryBackend {
    token_ttl: chrono::Duration,
    accounts: RwLock<HashMap<String, Account>>,
    tokens: RwLock<HashMap<String, TokenClaims>>,
    orders: RwLock<HashMap<String, OrderView>>,
    holdings: RwLock<HashMap<String, Vec<AssetSummary>>>,
    quotes: RwLock<HashMap<String, MarketQuote>>,
}

impl std::fmt::Debug for InMemoryBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InMemoryBackend")
            .field("accounts", &self.accounts.read().len())
            .field("tokens", &self.tokens.read().len())
            .field("orders", &self.orders.read().len())
            .finish_non_exhaustive()
    }
}

impl Default for InMemoryBackend {
    fn default() -> Self {
        Self::new(DEFAULT_TOKEN_TTL)
    }
}

impl InMemoryBackend {
    /// Empty backend issuing tokens valid for `token_ttl`.
    #[must_use]
    pub fn new(token_ttl: Duration) -> Self {
        Self {
            token_ttl: chrono::Duration::from_std(token_ttl)
                .unwrap_or_else(|_| chrono::Duration::days(1)),
            accounts: RwLock::new(HashMap::new()),
            tokens: RwLock::new(HashMap::new()),
            orders: RwLock::new(HashMap::new()),
            holdings: RwLock::new(HashMap::new()),
            quotes: RwLock::new(HashMap::new()),
        }
    }

    /// Backend seeded with a demo account (`alice@example.com` / `password`,
    /// user `u-1`), a few holdings and quotes.
    #[must_use]
    pub fn demo() -> Arc<Self> {
        Arc::new(Self::default().with_demo_data())
    }

    /// Seed the demo data into this backend.
    #[must_use]
    pub fn with_demo_data(self) -> Self {
        self.add_user(
            User::new("u-1", "alice@example.com").with_name("Alice", "Liddell"),
            "password",
        );
        self.add_user(
            User::new("u-2", "bob@example.com").with_name("Bob", "Builder"),
            "password",
        );

        for (symbol, name, last_quote, category) in [
            ("AAPL", "Apple Inc.", 190.0, 1),
            ("MSFT", "Microsoft Corporation", 410.0, 1),
            ("HGLG11", "CSHG Logistica FII", 160.0, 2),
        ] {
            self.add_quote(MarketQuote {
                symbol: symbol.to_string(),
                name: name.to_string(),
                last_quote,
                category,
            });
        }

        self.add_holding("u-1", "AAPL", 10.0, 150.0);
        self.add_holding("u-1", "HGLG11", 5.0, 155.0);
        self
    }

    /// Register a user.
    pub fn add_user(&self, user: User, password: impl Into<String>) {
        self.accounts.write().insert(
            user.email.to_lowercase(),
            Account {
                user,
                password: password.into(),
            },
        );
    }

    /// Register or replace a quote.
    pub fn add_quote(&self, quote: MarketQuote) {
        self.quotes.write().insert(quote.symbol.to_uppercase(), quote);
    }

    /// Add a holding for `user_id`, priced and categorized from the quote table.
    pub fn add_holding(&self, user_id: &str, symbol: &str, quantity: f64, average_price: f64) {
        let symbol = symbol.to_uppercase();
        let (last_price, category) = self
            .quotes
            .read()
            .get(&symbol)
            .map_or((average_price, 0), |q| (q.last_quote, q.category));
        self.holdings
            .write()
            .entry(user_id.to_string())
            .or_default()
            .push(AssetSummary {
                symbol,
                quantity,
                average_price,
                last_price,
                category,
            });
    }

    /// Move an order to `status`, e.g. to simulate an execution.
    pub fn set_order_status(&self, order_id: &str, status: OrderStatus) -> Result<(), UseCaseError> {
        let mut orders = self.orders.write();
        let order = orders
            .get_mut(order_id)
            .ok_or_else(|| UseCaseError::not_found("order", order_id))?;
        let now = Utc::now();
        order.status = status;
        order.updated_at = now;
        if status == OrderStatus::Executed {
            order.executed_at = Some(now);
            order.execution_price = order.price.or(order.market_price_at_submission);
        }
        Ok(())
    }

    /// Build a container backed entirely by this backend.
    pub fn container(self: &Arc<Self>) -> Result<ServiceContainer, ContainerError> {
        ServiceContainer::builder().with_backend(self).build()
    }

    fn owned_order(&self, order_id: &str, user_id: &str) -> Result<OrderView, UseCaseError> {
        let orders = self.orders.read();
        let order = orders
            .get(order_id)
            .ok_or_else(|| UseCaseError::not_found("order", order_id))?;
        if order.user_id != user_id {
            return Err(UseCaseError::PermissionDenied(format!(
                "order {order_id} belongs to another user"
            )));
        }
        Ok(order.clone())
    }
}

#[async_trait]
impl LoginUseCase for InMemoryBackend {
    async fn execute(&self, email: &str, password: &str) -> Result<User, UseCaseError> {
        let accounts = self.accounts.read();
        match accounts.get(&email.to_lowercase()) {
            Some(account) if account.password == password => Ok(account.user.clone()),
            _ => Err(UseCaseError::InvalidCredentials),
        }
    }
}

#[async_trait]
impl TokenService for InMemoryBackend {
    async fn create_token(&self, email: &str, user_id: &str) -> Result<String, UseCaseError> {
        if user_id.is_empty() {
            return Err(UseCaseError::InvalidInput("user id is empty".to_string()));
        }
        let now = Utc::now();
        let token = Uuid::new_v4().simple().to_string();
        let claims = TokenClaims {
            user_id: user_id.to_string(),
            email: Some(email.to_string()),
            expires_at: Some(now + self.token_ttl),
        };

        let mut tokens = self.tokens.write();
        // Drop expired tokens before issuing.
        tokens.retain(|_, issued| issued.expires_at.is_none_or(|at| at > now));
        tokens.insert(token.clone(), claims);
        Ok(token)
    }

    async fn validate_token(&self, token: &str) -> Result<TokenClaims, TokenError> {
        if token.is_empty() {
            return Err(TokenError::Empty);
        }
        let claims = self
            .tokens
            .read()
            .get(token)
            .cloned()
            .ok_or(TokenError::Invalid)?;
        if claims.expires_at.is_some_and(|at| at <= Utc::now()) {
            self.tokens.write().remove(token);
            return Err(TokenError::Expired);
        }
        Ok(claims)
    }
}

#[async_trait]
impl SubmitOrderUseCase for InMemoryBackend {
    async fn execute(&self, command: SubmitOrderCommand) -> Result<SubmitOrderResult, UseCaseError> {
        let market_price = self.quotes.read().get(&command.symbol).map(|q| q.last_quote);
        let estimated_price = command.price.or(market_price);
        let now = Utc::now();
        let order_id = Uuid::new_v4().to_string();

        let view = OrderView {
            order_id: order_id.clone(),
            user_id: command.user_id,
            symbol: command.symbol,
            order_type: command.order_type,
            order_side: command.order_side,
            quantity: command.quantity,
            price: command.price,
            status: OrderStatus::Pending,
            created_at: now,
            updated_at: now,
            executed_at: None,
            execution_price: None,
            market_price_at_submission: market_price,
        };
        self.orders.write().insert(order_id.clone(), view);

        Ok(SubmitOrderResult {
            order_id,
            status: OrderStatus::Pending,
            estimated_price,
            market_price,
        })
    }
}

#[async_trait]
impl GetOrderStatusUseCase for InMemoryBackend {
    async fn execute(&self, order_id: &str, user_id: &str) -> Result<OrderView, UseCaseError> {
        self.owned_order(order_id, user_id)
    }
}

#[async_trait]
impl CancelOrderUseCase for InMemoryBackend {
    async fn execute(&self, command: CancelOrderCommand) -> Result<CancelOrderResult, UseCaseError> {
        let mut orders = self.orders.write();
        let order = orders
            .get_mut(&command.order_id)
            .ok_or_else(|| UseCaseError::not_found("order", command.order_id.as_str()))?;
        if order.user_id != command.user_id {
            return Err(UseCaseError::PermissionDenied(format!(
                "order {} belongs to another user",
                command.order_id
            )));
        }
        if !order.status.is_cancellable() {
            return Err(UseCaseError::FailedPrecondition(format!(
                "order {} is already {}",
                command.order_id, order.status
            )));
        }

        let now = Utc::now();
        order.status = OrderStatus::Cancelled;
        order.updated_at = now;
        tracing::debug!(order_id = %command.order_id, reason = %command.reason, "Order cancelled");

        Ok(CancelOrderResult {
            order_id: command.order_id,
            cancelled_at: now,
        })
    }
}

#[async_trait]
impl PositionAggregationUseCase for InMemoryBackend {
    async fn execute(&self, user_id: &str) -> Result<AggregationSummary, UseCaseError> {
        let holdings = self.holdings.read();
        let mut by_category: BTreeMap<i32, Vec<AssetSummary>> = BTreeMap::new();
        for asset in holdings.get(user_id).into_iter().flatten() {
            by_category
                .entry(asset.category)
                .or_default()
                .push(asset.clone());
        }
        Ok(AggregationSummary::from_categories(
            by_category
                .into_iter()
                .map(|(category, assets)| CategorySummary::from_assets(category, assets))
                .collect(),
        ))
    }
}

#[async_trait]
impl MarketDataUseCase for InMemoryBackend {
    async fn execute(&self, symbols: &[String]) -> Result<Vec<MarketQuote>, UseCaseError> {
        let quotes = self.quotes.read();
        Ok(symbols
            .iter()
            .filter_map(|symbol| quotes.get(symbol).cloned())
            .collect())
    }
}
