//! Unified error type for the scan pipeline.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Sentiment source unavailable: {0}")]
    SourceUnavailable(String),

    #[error("No trending tickers found")]
    NoTrendingTickers,

    #[error("Option chain unavailable for {symbol}: {reason}")]
    ChainUnavailable { symbol: String, reason: String },

    #[error("Config error: {0}")]
    Config(String),

    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Build a `ChainUnavailable` for `symbol`.
    pub fn chain(symbol: impl Into<String>, reason: impl Into<String>) -> Self {
        Error::ChainUnavailable {
            symbol: symbol.into(),
            reason: reason.into(),
        }
    }

    /// True for errors that must abort a whole scan rather than a single ticker.
    pub fn is_fatal_to_scan(&self) -> bool {
        !matches!(self, Error::ChainUnavailable { .. })
    }
}
