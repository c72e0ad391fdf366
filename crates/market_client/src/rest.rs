//! REST client for the market-data provider's option chain endpoint.
//!
//! Every request is rate-limited and carries the configured bearer token.
//! All failures surface as `Error::ChainUnavailable` so the scanner can skip
//! the ticker.

use std::error::Error as StdError;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{Days, Utc};
use common::config::MarketDataConfig;
use common::{Error, MarketDataProvider, OptionChain};
use tracing::{debug, instrument};

use crate::rate_limit::RateLimiter;

const CHAIN_STATUS_FAILED: &str = "FAILED";

fn normalize_base_url(raw: &str) -> String {
    raw.trim().trim_end_matches('/').to_string()
}

fn format_reqwest_error(err: &reqwest::Error) -> String {
    // Keep chained causes so DNS/TLS/socket failures are visible.
    let mut message = err.to_string();
    let mut source = err.source();

    while let Some(cause) = source {
        let cause_msg = cause.to_string();
        if !cause_msg.is_empty() && !message.contains(&cause_msg) {
            message.push_str(": ");
            message.push_str(&cause_msg);
        }
        source = cause.source();
    }

    message
}

fn summarize_response_body(raw: &str) -> String {
    const MAX_CHARS: usize = 300;
    let compact = raw.replace(['\n', '\r'], " ");
    match compact.char_indices().nth(MAX_CHARS) {
        Some((cut, _)) => format!("{}…", &compact[..cut]),
        None => compact,
    }
}

/// Last expiration date (inclusive) to request, `YYYY-MM-DD`.
fn to_date(max_days_to_expiry: i64) -> String {
    let days = u64::try_from(max_days_to_expiry).unwrap_or(0);
    let today = Utc::now().date_naive();
    today
        .checked_add_days(Days::new(days))
        .unwrap_or(today)
        .format("%Y-%m-%d")
        .to_string()
}

/// Async client for `GET /chains`.
#[derive(Debug, Clone)]
pub struct MarketDataClient {
    client: reqwest::Client,
    base_url: String,
    access_token: String,
    limiter: RateLimiter,
}

impl MarketDataClient {
    pub fn new(config: &MarketDataConfig) -> Result<Self, Error> {
        let client = reqwest::Client::builder()
            .pool_max_idle_per_host(8)
            .tcp_keepalive(Duration::from_secs(30))
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| Error::Config(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: normalize_base_url(&config.base_url),
            access_token: config.access_token.clone(),
            limiter: RateLimiter::per_minute(config.requests_per_minute),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Fetch every single-leg contract for `symbol` expiring within `max_days_to_expiry`.
    #[instrument(skip(self), fields(base_url = %self.base_url))]
    pub async fn get_option_chain(
        &self,
        symbol: &str,
        max_days_to_expiry: i64,
    ) -> Result<OptionChain, Error> {
        if self.access_token.is_empty() {
            return Err(Error::chain(symbol, "not authenticated"));
        }

        self.limiter.wait().await;

        let to_date = to_date(max_days_to_expiry);
        let resp = self
            .client
            .get(self.url("/chains"))
            .bearer_auth(&self.access_token)
            .header(reqwest::header::ACCEPT, "application/json")
            .query(&[
                ("symbol", symbol),
                ("contractType", "ALL"),
                ("strategy", "SINGLE"),
                ("range", "ALL"),
                ("toDate", to_date.as_str()),
            ])
            .send()
            .await
            .map_err(|e| Error::chain(symbol, format_reqwest_error(&e)))?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(Error::chain(
                symbol,
                format!(
                    "API error {}: {}",
                    status.as_u16(),
                    summarize_response_body(&body)
                ),
            ));
        }

        let body = resp
            .text()
            .await
            .map_err(|e| Error::chain(symbol, format_reqwest_error(&e)))?;
        let chain: OptionChain = serde_json::from_str(&body)
            .map_err(|e| Error::chain(symbol, format!("failed to parse option chain: {}", e)))?;

        if chain.status.eq_ignore_ascii_case(CHAIN_STATUS_FAILED) {
            return Err(Error::chain(symbol, "provider returned status FAILED"));
        }

        debug!(
            "Fetched {} contracts for {} (through {})",
            chain.contract_count(),
            symbol,
            to_date
        );

        Ok(chain)
    }
}

#[async_trait]
impl MarketDataProvider for MarketDataClient {
    async fn get_option_chain(
        &self,
        symbol: &str,
        max_days_to_expiry: i64,
    ) -> common::Result<OptionChain> {
        MarketDataClient::get_option_chain(self, symbol, max_days_to_expiry).await
    }
}
