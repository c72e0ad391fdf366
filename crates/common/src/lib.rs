//! Shared types, config, and error definitions for options-scout.

pub mod config;
pub mod error;
pub mod source;
pub mod types;

pub use config::{AppConfig, ScanConfig};
pub use error::Error;
pub use source::{MarketDataProvider, SentimentSource};
pub use types::*;

/// Convenience Result alias.
pub type Result<T> = std::result::Result<T, Error>;
