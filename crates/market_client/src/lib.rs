//! Market-data provider client.
//!
//! Provides rate-limited, bearer-authenticated access to the option chain endpoint.

pub mod rate_limit;
pub mod rest;

pub use rate_limit::RateLimiter;
pub use rest::MarketDataClient;
