//! Collaborator abstractions consumed by the scan pipeline.
//!
//! HTTP clients implement these for production; tests plug in fakes.

use async_trait::async_trait;

use crate::types::{OptionChain, TickerMention};
use crate::Result;

/// Ranked list of tickers people are talking about.
#[async_trait]
pub trait SentimentSource: Send + Sync {
    /// Fails with `Error::SourceUnavailable` on network or parse failure.
    /// An empty list is a valid answer.
    async fn get_trending_tickers(&self, limit: usize) -> Result<Vec<TickerMention>>;
}

/// Option chains for a single underlying.
#[async_trait]
pub trait MarketDataProvider: Send + Sync {
    /// Fetch the chain restricted to expirations within `max_days_to_expiry`.
    ///
    /// Any failure (auth, transport, status, payload) is `Error::ChainUnavailable`.
    async fn get_option_chain(&self, symbol: &str, max_days_to_expiry: i64) -> Result<OptionChain>;
}
