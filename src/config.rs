//! Configuration loader. Merges env vars, the .env file, and config.toml.

use std::path::Path;

use common::config::into_result;
use common::{AppConfig, Error};

fn parse_positive_f64(raw: &str, env_name: &str) -> Result<f64, Error> {
    let parsed = raw
        .trim()
        .parse::<f64>()
        .map_err(|_| Error::Config(format!("{env_name} must be a number > 0")))?;
    if parsed.is_nan() || parsed <= 0.0 {
        return Err(Error::Config(format!("{env_name} must be a number > 0")));
    }
    Ok(parsed)
}

fn parse_non_negative_i64(raw: &str, env_name: &str) -> Result<i64, Error> {
    let parsed = raw
        .trim()
        .parse::<i64>()
        .map_err(|_| Error::Config(format!("{env_name} must be an integer >= 0")))?;
    if parsed < 0 {
        return Err(Error::Config(format!("{env_name} must be an integer >= 0")));
    }
    Ok(parsed)
}

fn parse_positive_usize(raw: &str, env_name: &str) -> Result<usize, Error> {
    match raw.trim().parse::<usize>() {
        Ok(parsed) if parsed > 0 => Ok(parsed),
        _ => Err(Error::Config(format!("{env_name} must be an integer > 0"))),
    }
}

pub fn validate_config(config: &AppConfig) -> Result<(), Error> {
    let mut issues = config.scan.issues();

    if config.market_data.access_token.trim().is_empty() {
        issues.push("MARKET_DATA_ACCESS_TOKEN (market_data.access_token) is required".into());
    }
    if config.market_data.base_url.trim().is_empty() {
        issues.push("market_data.base_url must not be empty".into());
    }
    if config.market_data.requests_per_minute == 0 {
        issues.push("market_data.requests_per_minute must be > 0".into());
    }
    if config.market_data.timeout_secs == 0 {
        issues.push("market_data.timeout_secs must be > 0".into());
    }
    if config.sentiment.base_url.trim().is_empty() {
        issues.push("sentiment.base_url must not be empty".into());
    }
    if config.sentiment.timeout_secs == 0 {
        issues.push("sentiment.timeout_secs must be > 0".into());
    }
    if config.top_n == 0 {
        issues.push("top_n must be > 0".into());
    }
    if config.scan_timeout_secs == 0 {
        issues.push("scan_timeout_secs must be > 0".into());
    }

    into_result(issues)
}

/// Apply environment overrides on top of `config`.
fn apply_env_overrides(config: &mut AppConfig) -> Result<(), Error> {
    if let Ok(token) = std::env::var("MARKET_DATA_ACCESS_TOKEN") {
        config.market_data.access_token = token;
    }
    if let Ok(url) = std::env::var("MARKET_DATA_BASE_URL") {
        config.market_data.base_url = url;
    }
    if let Ok(url) = std::env::var("SENTIMENT_BASE_URL") {
        config.sentiment.base_url = url;
    }
    if let Ok(raw) = std::env::var("SCAN_MAX_PREMIUM") {
        config.scan.max_premium = parse_positive_f64(&raw, "SCAN_MAX_PREMIUM")?;
    }
    if let Ok(raw) = std::env::var("SCAN_MAX_DAYS_TO_EXPIRY") {
        let parsed = parse_non_negative_i64(&raw, "SCAN_MAX_DAYS_TO_EXPIRY")?;
        if parsed == 0 {
            return Err(Error::Config(
                "SCAN_MAX_DAYS_TO_EXPIRY must be an integer > 0".into(),
            ));
        }
        config.scan.max_days_to_expiry = parsed;
    }
    if let Ok(raw) = std::env::var("SCAN_MIN_VOLUME") {
        config.scan.min_volume = parse_non_negative_i64(&raw, "SCAN_MIN_VOLUME")?;
    }
    if let Ok(raw) = std::env::var("SCAN_MIN_OPEN_INTEREST") {
        config.scan.min_open_interest = parse_non_negative_i64(&raw, "SCAN_MIN_OPEN_INTEREST")?;
    }
    if let Ok(raw) = std::env::var("SCAN_TICKER_LIMIT") {
        config.scan.ticker_limit = parse_positive_usize(&raw, "SCAN_TICKER_LIMIT")?;
    }
    if let Ok(raw) = std::env::var("SCAN_TOP_N") {
        config.top_n = parse_positive_usize(&raw, "SCAN_TOP_N")?;
    }
    Ok(())
}

/// Load configuration from `.env`, an optional TOML file, and the environment.
///
/// Validation is left to the caller so CLI overrides can be applied first.
pub fn load_config(path: &Path) -> Result<AppConfig, Error> {
    // 1. Load .env file from the working directory or its parents.
    if let Err(e) = dotenvy::dotenv() {
        tracing::debug!("No .env file loaded: {}", e);
    }

    // 2. Defaults, replaced by the TOML file if present.
    let mut config = AppConfig::default();
    if path.exists() {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("Failed to read {}: {}", path.display(), e)))?;
        config = toml::from_str(&contents)
            .map_err(|e| Error::Config(format!("Failed to parse {}: {}", path.display(), e)))?;
    }

    // 3. Environment wins.
    apply_env_overrides(&mut config)?;

    Ok(config)
}
