//! Scanner configuration types.

use serde::{Deserialize, Serialize};

use crate::Error;

/// Top-level application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Market-data provider connection.
    #[serde(default)]
    pub market_data: MarketDataConfig,

    /// Sentiment source connection.
    #[serde(default)]
    pub sentiment: SentimentConfig,

    /// Per-scan filter thresholds.
    #[serde(default)]
    pub scan: ScanConfig,

    /// Number of ranked picks to report.
    #[serde(default = "default_top_n")]
    pub top_n: usize,

    /// Deadline for a whole scan (seconds). In-flight fetches are cancelled after it.
    #[serde(default = "default_scan_timeout")]
    pub scan_timeout_secs: u64,
}

/// Market-data provider settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MarketDataConfig {
    #[serde(default = "default_market_data_base_url")]
    pub base_url: String,

    /// Bearer token. Session refresh happens outside this tool.
    #[serde(default)]
    pub access_token: String,

    /// Client-side request quota.
    #[serde(default = "default_requests_per_minute")]
    pub requests_per_minute: u32,

    #[serde(default = "default_market_data_timeout")]
    pub timeout_secs: u64,
}

/// Sentiment source settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SentimentConfig {
    #[serde(default = "default_sentiment_base_url")]
    pub base_url: String,

    #[serde(default = "default_sentiment_timeout")]
    pub timeout_secs: u64,

    /// Retries on 429 and transport errors.
    #[serde(default = "default_sentiment_retries")]
    pub max_retries: u32,
}

/// Thresholds applied to every contract during one scan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScanConfig {
    /// Max cost to open one contract in dollars (ask × 100).
    #[serde(default = "default_max_premium")]
    pub max_premium: f64,

    /// Max days until expiration.
    #[serde(default = "default_max_days_to_expiry")]
    pub max_days_to_expiry: i64,

    /// Min contracts traded today.
    #[serde(default = "default_min_volume")]
    pub min_volume: i64,

    /// Min open interest.
    #[serde(default = "default_min_open_interest")]
    pub min_open_interest: i64,

    /// Max tickers pulled from the sentiment source.
    #[serde(default = "default_ticker_limit")]
    pub ticker_limit: usize,
}

impl ScanConfig {
    /// Every violated constraint, in field order.
    pub fn issues(&self) -> Vec<String> {
        let mut issues = Vec::new();

        if self.max_premium.is_nan() || self.max_premium <= 0.0 {
            issues.push("scan.max_premium must be > 0".into());
        }
        if self.max_days_to_expiry <= 0 {
            issues.push("scan.max_days_to_expiry must be > 0".into());
        }
        if self.min_volume < 0 {
            issues.push("scan.min_volume must be >= 0".into());
        }
        if self.min_open_interest < 0 {
            issues.push("scan.min_open_interest must be >= 0".into());
        }
        if self.ticker_limit == 0 {
            issues.push("scan.ticker_limit must be > 0".into());
        }

        issues
    }

    pub fn validate(&self) -> Result<(), Error> {
        into_result(self.issues())
    }
}

/// Collapse a list of validation issues into a single `Error::Config`.
pub fn into_result(issues: Vec<String>) -> Result<(), Error> {
    if issues.is_empty() {
        Ok(())
    } else {
        Err(Error::Config(format!(
            "Invalid config:\n - {}",
            issues.join("\n - ")
        )))
    }
}

// ── Defaults ──────────────────────────────────────────────────────────

fn default_top_n() -> usize {
    10
}
fn default_scan_timeout() -> u64 {
    300
}

fn default_market_data_base_url() -> String {
    "https://api.schwabapi.com/marketdata/v1".into()
}
fn default_requests_per_minute() -> u32 {
    120
}
fn default_market_data_timeout() -> u64 {
    30
}

fn default_sentiment_base_url() -> String {
    "http://127.0.0.1:8090".into()
}
fn default_sentiment_timeout() -> u64 {
    15
}
fn default_sentiment_retries() -> u32 {
    2
}

fn default_max_premium() -> f64 {
    500.0
}
fn default_max_days_to_expiry() -> i64 {
    7
}
fn default_min_volume() -> i64 {
    100
}
fn default_min_open_interest() -> i64 {
    50
}
fn default_ticker_limit() -> usize {
    20
}

impl Default for MarketDataConfig {
    fn default() -> Self {
        Self {
            base_url: default_market_data_base_url(),
            access_token: String::new(),
            requests_per_minute: default_requests_per_minute(),
            timeout_secs: default_market_data_timeout(),
        }
    }
}

impl Default for SentimentConfig {
    fn default() -> Self {
        Self {
            base_url: default_sentiment_base_url(),
            timeout_secs: default_sentiment_timeout(),
            max_retries: default_sentiment_retries(),
        }
    }
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            max_premium: default_max_premium(),
            max_days_to_expiry: default_max_days_to_expiry(),
            min_volume: default_min_volume(),
            min_open_interest: default_min_open_interest(),
            ticker_limit: default_ticker_limit(),
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            market_data: MarketDataConfig::default(),
            sentiment: SentimentConfig::default(),
            scan: ScanConfig::default(),
            top_n: default_top_n(),
            scan_timeout_secs: default_scan_timeout(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_scan_config_is_valid() {
        let config = ScanConfig::default();
        assert_eq!(config.max_premium, 500.0);
        assert_eq!(config.max_days_to_expiry, 7);
        assert_eq!(config.ticker_limit, 20);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_reports_every_issue() {
        let config = ScanConfig {
            max_premium: 0.0,
            max_days_to_expiry: 0,
            min_volume: -1,
            min_open_interest: -1,
            ticker_limit: 0,
        };
        assert_eq!(config.issues().len(), 5);

        match config.validate() {
            Err(Error::Config(msg)) => assert!(msg.contains("scan.max_premium")),
            other => panic!("expected config error, got {:?}", other),
        }
    }

    #[test]
    fn test_nan_premium_rejected() {
        let config = ScanConfig {
            max_premium: f64::NAN,
            ..ScanConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_partial_toml_falls_back_to_defaults() {
        let config: AppConfig = toml::from_str(
            r#"
            top_n = 3

            [scan]
            max_premium = 250.0
            "#,
        )
        .unwrap();

        assert_eq!(config.top_n, 3);
        assert_eq!(config.scan.max_premium, 250.0);
        assert_eq!(config.scan.min_volume, 100);
        assert_eq!(config.market_data.requests_per_minute, 120);
        assert_eq!(config.scan_timeout_secs, 300);
    }
}
