use std::sync::Arc;

use common::{Error, MarketDataProvider, ScanConfig, SentimentSource, TickerMention};
use tokio_util::sync::CancellationToken;
use tracing::info;

use crate::fetcher::ChainFetcher;
use crate::ranker::rank;
use crate::scorer::score_all;
use crate::types::OptionCandidate;

pub struct Scanner {
    sentiment: Arc<dyn SentimentSource>,
    fetcher: ChainFetcher,
}

impl Scanner {
    pub fn new(sentiment: Arc<dyn SentimentSource>, market_data: Arc<dyn MarketDataProvider>) -> Self {
        Self {
            sentiment,
            fetcher: ChainFetcher::new(market_data),
        }
    }

    /// Currently trending tickers, straight from the sentiment source.
    pub async fn trending(&self, limit: usize) -> Result<Vec<TickerMention>, Error> {
        self.sentiment.get_trending_tickers(limit).await
    }

    /// Full scan: trending tickers -> chains -> filter -> score -> rank.
    ///
    /// Fails only when the config is invalid or the sentiment lookup fails
    /// or comes back empty. Zero qualifying contracts is a successful,
    /// empty result.
    pub async fn scan(
        &self,
        config: &ScanConfig,
        cancel: &CancellationToken,
    ) -> Result<Vec<OptionCandidate>, Error> {
        config.validate()?;
        info!("Starting options scan...");

        let tickers = self.trending(config.ticker_limit).await?;
        if tickers.is_empty() {
            return Err(Error::NoTrendingTickers);
        }
        info!(
            "Found {} trending tickers: {:?}",
            tickers.len(),
            tickers.iter().map(|t| t.symbol.as_str()).collect::<Vec<_>>()
        );

        let mut candidates = self.fetcher.fetch(&tickers, config, cancel).await;
        score_all(&mut candidates);
        let ranked = rank(candidates);

        info!("Found {} option candidates", ranked.len());
        Ok(ranked)
    }
}
