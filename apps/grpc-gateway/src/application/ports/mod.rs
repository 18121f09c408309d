//! Driven Ports
//!
//! One narrow trait per use case so each handler depends on exactly what it
//! calls and can be tested with a hand-written mock.

mod auth_port;
mod market_data_port;
mod order_port;
mod position_port;

pub use auth_port::{LoginUseCase, TokenClaims, TokenService, TokenValidator};
pub use market_data_port::MarketDataUseCase;
pub use order_port::{
    CancelOrderCommand, CancelOrderResult, CancelOrderUseCase, GetOrderStatusUseCase, OrderView,
    SubmitOrderCommand, SubmitOrderResult, SubmitOrderUseCase,
};
pub use position_port::PositionAggregationUseCase;
