//! Configuration Module
//!
//! Environment configuration for the gateway binary. The library itself takes
//! ports and addresses as parameters and never reads the environment.

mod settings;

pub use settings::{ConfigError, GatewayConfig, TokenValidationMode};
