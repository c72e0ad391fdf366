//! Concurrent option chain retrieval.
//!
//! One task per ticker, at most `MAX_CONCURRENT_CHAIN_REQUESTS` in flight.
//! Each task returns its own candidates; the fetcher concatenates them as
//! tasks finish, so result order follows completion order.

use std::sync::Arc;

use common::{Error, MarketDataProvider, OptionChain, ScanConfig, TickerMention};
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, trace, warn};

use crate::filter::check_contract;
use crate::types::OptionCandidate;

/// Chain requests allowed in flight at once.
pub const MAX_CONCURRENT_CHAIN_REQUESTS: usize = 5;

enum TickerOutcome {
    Fetched {
        symbol: String,
        candidates: Vec<OptionCandidate>,
    },
    Failed(Error),
    Cancelled(String),
}

/// Decompose a chain into candidates that pass the filter.
pub fn collect_candidates(
    chain: &OptionChain,
    mention: &TickerMention,
    config: &ScanConfig,
) -> Vec<OptionCandidate> {
    chain
        .contracts()
        .filter(|(_, contract)| match check_contract(contract, config) {
            Ok(()) => true,
            Err(rejection) => {
                trace!("{} {} rejected: {}", mention.symbol, contract.symbol, rejection);
                false
            }
        })
        .map(|(contract_type, contract)| {
            OptionCandidate::from_contract(contract, contract_type, &chain.underlying, mention)
        })
        .collect()
}

pub struct ChainFetcher {
    provider: Arc<dyn MarketDataProvider>,
}

impl ChainFetcher {
    pub fn new(provider: Arc<dyn MarketDataProvider>) -> Self {
        Self { provider }
    }

    /// Fetch and filter chains for every ticker.
    ///
    /// Never fails: a ticker whose chain cannot be fetched is logged and
    /// skipped. When `cancel` fires, pending and in-flight tickers are
    /// abandoned and whatever already finished is returned.
    pub async fn fetch(
        &self,
        tickers: &[TickerMention],
        config: &ScanConfig,
        cancel: &CancellationToken,
    ) -> Vec<OptionCandidate> {
        let permits = Arc::new(Semaphore::new(MAX_CONCURRENT_CHAIN_REQUESTS));
        let config = Arc::new(config.clone());
        let mut join_set = JoinSet::new();

        for mention in tickers.iter().cloned() {
            let provider = Arc::clone(&self.provider);
            let permits = Arc::clone(&permits);
            let config = Arc::clone(&config);
            let cancel = cancel.clone();

            join_set.spawn(async move {
                let _permit = tokio::select! {
                    biased;
                    _ = cancel.cancelled() => return TickerOutcome::Cancelled(mention.symbol),
                    permit = permits.acquire_owned() => match permit {
                        Ok(permit) => permit,
                        Err(_) => return TickerOutcome::Cancelled(mention.symbol),
                    },
                };

                let result = tokio::select! {
                    biased;
                    _ = cancel.cancelled() => return TickerOutcome::Cancelled(mention.symbol),
                    result = provider.get_option_chain(&mention.symbol, config.max_days_to_expiry) => result,
                };

                match result {
                    Ok(chain) => {
                        let candidates = collect_candidates(&chain, &mention, &config);
                        debug!(
                            "{}: kept {} of {} contracts",
                            mention.symbol,
                            candidates.len(),
                            chain.contract_count()
                        );
                        TickerOutcome::Fetched {
                            symbol: mention.symbol,
                            candidates,
                        }
                    }
                    Err(e) => TickerOutcome::Failed(e),
                }
            });
        }

        let mut candidates = Vec::new();
        let mut fetched = 0usize;
        let mut failed = 0usize;
        let mut cancelled = 0usize;

        while let Some(joined) = join_set.join_next().await {
            match joined {
                Ok(TickerOutcome::Fetched {
                    symbol,
                    candidates: found,
                }) => {
                    fetched += 1;
                    trace!("{} contributed {} candidates", symbol, found.len());
                    candidates.extend(found);
                }
                Ok(TickerOutcome::Failed(e)) => {
                    failed += 1;
                    warn!("Failed to get option chain: {}", e);
                }
                Ok(TickerOutcome::Cancelled(symbol)) => {
                    cancelled += 1;
                    debug!("Chain fetch for {} cancelled", symbol);
                }
                Err(join_err) => {
                    failed += 1;
                    warn!("Chain fetch task aborted: {}", join_err);
                }
            }
        }

        if cancelled > 0 {
            warn!(
                "Scan cancelled with {} of {} tickers outstanding; returning partial results",
                cancelled,
                tickers.len()
            );
        }
        info!(
            "Fetched chains for {} tickers ({} failed), {} candidates passed filters",
            fetched,
            failed,
            candidates.len()
        );

        candidates
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use async_trait::async_trait;
    use common::{ContractType, OptionContract, Underlying};
    use std::collections::{BTreeMap, HashSet};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    pub(crate) fn make_contract(symbol: &str, bid: f64, ask: f64) -> OptionContract {
        OptionContract {
            symbol: symbol.into(),
            bid,
            ask,
            total_volume: 500,
            open_interest: 200,
            delta: 0.3,
            days_to_expiry: 1,
            expiration_date: "2026-10-18".into(),
            strike_price: 25.0,
            ..Default::default()
        }
    }

    pub(crate) fn make_chain(symbol: &str, calls: Vec<OptionContract>, puts: Vec<OptionContract>) -> OptionChain {
        let bucket = |contracts: Vec<OptionContract>| {
            let mut strikes = BTreeMap::new();
            strikes.insert("25.0".to_string(), contracts);
            let mut expirations = BTreeMap::new();
            expirations.insert("2026-10-18:1".to_string(), strikes);
            expirations
        };
        OptionChain {
            symbol: symbol.into(),
            status: "SUCCESS".into(),
            underlying: Underlying {
                symbol: symbol.into(),
                last: 24.5,
                ..Default::default()
            },
            call_exp_date_map: bucket(calls),
            put_exp_date_map: bucket(puts),
        }
    }

    pub(crate) fn mention(symbol: &str) -> TickerMention {
        TickerMention {
            symbol: symbol.into(),
            sentiment: 0.5,
            mentions: 10,
        }
    }

    /// Serves a one-call chain per symbol and records peak concurrency.
    #[derive(Default)]
    pub(crate) struct FakeProvider {
        pub(crate) delay: Duration,
        pub(crate) failing: HashSet<String>,
        pub(crate) hanging: HashSet<String>,
        pub(crate) in_flight: AtomicUsize,
        pub(crate) peak: AtomicUsize,
        pub(crate) calls: AtomicUsize,
    }

    #[async_trait]
    impl MarketDataProvider for FakeProvider {
        async fn get_option_chain(
            &self,
            symbol: &str,
            _max_days_to_expiry: i64,
        ) -> common::Result<OptionChain> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.peak.fetch_max(now, Ordering::SeqCst);

            if self.hanging.contains(symbol) {
                tokio::time::sleep(Duration::from_secs(30)).await;
            } else {
                tokio::time::sleep(self.delay).await;
            }
            self.in_flight.fetch_sub(1, Ordering::SeqCst);

            if self.failing.contains(symbol) {
                return Err(Error::chain(symbol, "API error 500"));
            }
            Ok(make_chain(
                symbol,
                vec![make_contract(&format!("{symbol}_C25"), 1.0, 1.1)],
                Vec::new(),
            ))
        }
    }

    #[test]
    fn test_collect_candidates_walks_both_buckets_and_duplicates() {
        let chain = make_chain(
            "GME",
            vec![
                make_contract("GME_C25_A", 1.0, 1.1),
                make_contract("GME_C25_B", 1.0, 1.1),
                make_contract("GME_C25_WIDE", 1.0, 1.5),
            ],
            vec![
                make_contract("GME_P25", 0.0, 0.8),
                make_contract("GME_P25_RICH", 0.0, 600.0),
            ],
        );

        let candidates = collect_candidates(&chain, &mention("GME"), &ScanConfig::default());
        let symbols: Vec<&str> = candidates.iter().map(|c| c.option_symbol.as_str()).collect();
        assert_eq!(symbols, vec!["GME_C25_A", "GME_C25_B", "GME_P25"]);
        assert_eq!(candidates[2].contract_type, ContractType::Put);
        assert!(candidates.iter().all(|c| c.score == 0.0 && c.reasons.is_empty()));
        assert!(candidates.iter().all(|c| c.sentiment_score == 0.5 && c.mentions == 10));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_fetch_never_exceeds_concurrency_limit() {
        let provider = Arc::new(FakeProvider {
            delay: Duration::from_millis(30),
            ..Default::default()
        });
        let fetcher = ChainFetcher::new(provider.clone());
        let tickers: Vec<_> = (0..17).map(|i| mention(&format!("T{i}"))).collect();

        let candidates = fetcher
            .fetch(&tickers, &ScanConfig::default(), &CancellationToken::new())
            .await;

        assert_eq!(candidates.len(), 17);
        assert_eq!(provider.calls.load(Ordering::SeqCst), 17);
        let peak = provider.peak.load(Ordering::SeqCst);
        assert!(peak <= MAX_CONCURRENT_CHAIN_REQUESTS, "peak {peak}");
        assert!(peak > 1, "expected concurrent requests, peak {peak}");
    }

    #[tokio::test]
    async fn test_failed_ticker_does_not_drop_siblings() {
        let provider = Arc::new(FakeProvider {
            failing: ["BAD".to_string()].into_iter().collect(),
            ..Default::default()
        });
        let fetcher = ChainFetcher::new(provider);
        let tickers = vec![mention("GME"), mention("BAD"), mention("AMC")];

        let candidates = fetcher
            .fetch(&tickers, &ScanConfig::default(), &CancellationToken::new())
            .await;

        let mut symbols: Vec<&str> = candidates.iter().map(|c| c.symbol.as_str()).collect();
        symbols.sort();
        assert_eq!(symbols, vec!["AMC", "GME"]);
    }

    #[tokio::test]
    async fn test_all_tickers_failing_is_empty_not_error() {
        let provider = Arc::new(FakeProvider {
            failing: ["A".to_string(), "B".to_string()].into_iter().collect(),
            ..Default::default()
        });
        let fetcher = ChainFetcher::new(provider);
        let candidates = fetcher
            .fetch(
                &[mention("A"), mention("B")],
                &ScanConfig::default(),
                &CancellationToken::new(),
            )
            .await;
        assert!(candidates.is_empty());
    }

    #[tokio::test]
    async fn test_cancel_returns_partial_results() {
        let provider = Arc::new(FakeProvider {
            hanging: ["SLOW1".to_string(), "SLOW2".to_string()].into_iter().collect(),
            ..Default::default()
        });
        let fetcher = ChainFetcher::new(provider);
        let tickers = vec![mention("SLOW1"), mention("FAST"), mention("SLOW2")];

        let cancel = CancellationToken::new();
        let trigger = cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(100)).await;
            trigger.cancel();
        });

        let candidates = tokio::time::timeout(
            Duration::from_secs(5),
            fetcher.fetch(&tickers, &ScanConfig::default(), &cancel),
        )
        .await
        .expect("fetch must return promptly after cancellation");

        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].symbol, "FAST");
    }

    #[tokio::test]
    async fn test_already_cancelled_skips_provider() {
        let provider = Arc::new(FakeProvider::default());
        let fetcher = ChainFetcher::new(provider.clone());
        let cancel = CancellationToken::new();
        cancel.cancel();

        let candidates = fetcher
            .fetch(&[mention("GME")], &ScanConfig::default(), &cancel)
            .await;

        assert!(candidates.is_empty());
        assert_eq!(provider.calls.load(Ordering::SeqCst), 0);
    }

    struct PanickingProvider;

    #[async_trait]
    impl MarketDataProvider for PanickingProvider {
        async fn get_option_chain(&self, symbol: &str, _days: i64) -> common::Result<OptionChain> {
            if symbol == "BOOM" {
                panic!("malformed chain");
            }
            Ok(make_chain(symbol, vec![make_contract("OK_C", 1.0, 1.1)], Vec::new()))
        }
    }

    #[tokio::test]
    async fn test_panicking_ticker_task_is_isolated() {
        let fetcher = ChainFetcher::new(Arc::new(PanickingProvider));
        let candidates = fetcher
            .fetch(
                &[mention("BOOM"), mention("OK")],
                &ScanConfig::default(),
                &CancellationToken::new(),
            )
            .await;
        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].symbol, "OK");
    }
}
