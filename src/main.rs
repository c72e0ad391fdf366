//! options-scout: sentiment-driven short-dated options scanner.
//!
//! Single-shot Tokio application that:
//! 1. Pulls trending tickers from the sentiment source
//! 2. Fetches option chains for them (5 at a time)
//! 3. Filters out illiquid or expensive contracts
//! 4. Scores, ranks, and prints the top picks as JSON

mod config;
mod report;

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use candidate_engine::{top_picks, Scanner};
use clap::Parser;
use common::{AppConfig, Error};
use market_client::MarketDataClient;
use sentiment_client::SentimentClient;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

use crate::report::{summary_line, ScanReport, TrendingReport};

/// Sentiment-driven options scanner
#[derive(Parser)]
#[command(name = "options-scout", about = "Rank short-dated options on trending tickers")]
struct Cli {
    /// Path to the TOML config file.
    #[arg(long, default_value = "config.toml")]
    config: PathBuf,

    /// Print the trending tickers and exit.
    #[arg(long)]
    trending: bool,

    /// Number of picks to print.
    #[arg(long)]
    top_n: Option<usize>,

    /// Max premium per contract in dollars.
    #[arg(long)]
    max_premium: Option<f64>,

    /// Max days to expiration.
    #[arg(long)]
    max_days: Option<i64>,
}

impl Cli {
    fn apply(&self, config: &mut AppConfig) {
        if let Some(n) = self.top_n {
            config.top_n = n;
        }
        if let Some(premium) = self.max_premium {
            config.scan.max_premium = premium;
        }
        if let Some(days) = self.max_days {
            config.scan.max_days_to_expiry = days;
        }
    }
}

/// Cancel `token` on Ctrl-C or when `deadline` elapses.
fn spawn_cancel_triggers(token: CancellationToken, deadline: Duration) {
    tokio::spawn(async move {
        tokio::select! {
            _ = tokio::time::sleep(deadline) => {
                warn!("Scan deadline of {}s reached, cancelling", deadline.as_secs());
            }
            res = tokio::signal::ctrl_c() => {
                if res.is_ok() {
                    warn!("Interrupted, cancelling scan");
                }
            }
            _ = token.cancelled() => return,
        }
        token.cancel();
    });
}

#[tokio::main]
async fn main() {
    // Initialize logging.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "options_scout=info,candidate_engine=info,market_client=info,sentiment_client=info"
                    .into()
            }),
        )
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        match e.downcast_ref::<Error>() {
            Some(Error::NoTrendingTickers) => {
                error!("No trending tickers available; nothing to scan");
            }
            _ => error!("{:#}", e),
        }
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<()> {
    let mut cfg = config::load_config(&cli.config)?;
    cli.apply(&mut cfg);
    config::validate_config(&cfg)?;

    info!(
        "Scan: max_premium=${}, max_days={}, min_volume={}, min_oi={}, tickers={}, top_n={}",
        cfg.scan.max_premium,
        cfg.scan.max_days_to_expiry,
        cfg.scan.min_volume,
        cfg.scan.min_open_interest,
        cfg.scan.ticker_limit,
        cfg.top_n
    );

    let sentiment = Arc::new(SentimentClient::new(&cfg.sentiment)?);
    let market_data = Arc::new(MarketDataClient::new(&cfg.market_data)?);
    let scanner = Scanner::new(sentiment, market_data);

    if cli.trending {
        let tickers = scanner
            .trending(cfg.scan.ticker_limit)
            .await
            .context("failed to get trending tickers")?;
        println!("{}", serde_json::to_string_pretty(&TrendingReport::new(&tickers))?);
        return Ok(());
    }

    let cancel = CancellationToken::new();
    spawn_cancel_triggers(cancel.clone(), Duration::from_secs(cfg.scan_timeout_secs));

    let ranked = scanner.scan(&cfg.scan, &cancel).await?;
    cancel.cancel();

    let picks = top_picks(ranked, cfg.top_n);
    if picks.is_empty() {
        info!("Scan complete: no contracts met the criteria");
    }
    for (i, pick) in picks.iter().enumerate() {
        info!("{}", summary_line(i + 1, pick));
    }

    println!("{}", serde_json::to_string_pretty(&ScanReport::new(&picks))?);
    Ok(())
}
