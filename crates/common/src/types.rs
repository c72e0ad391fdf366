//! Wire and domain types shared by the clients and the candidate engine.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

// ── Sentiment ─────────────────────────────────────────────────────────

/// One ticker surfaced by the sentiment source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TickerMention {
    pub symbol: String,
    /// Aggregate sentiment in [-1, 1].
    pub sentiment: f64,
    /// Number of mentions in the sampled window.
    #[serde(default)]
    pub mentions: u32,
}

/// Payload of the sentiment source's trending endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct TrendingResponse {
    #[serde(default)]
    pub tickers: Vec<TickerMention>,
    #[serde(default)]
    pub count: usize,
}

// ── Option chains ─────────────────────────────────────────────────────

/// Contract side, taken from the chain bucket a contract was found in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ContractType {
    Call,
    Put,
}

impl ContractType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ContractType::Call => "CALL",
            ContractType::Put => "PUT",
        }
    }
}

impl fmt::Display for ContractType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Quote for the underlying equity/ETF.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Underlying {
    #[serde(default)]
    pub symbol: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub bid: f64,
    #[serde(default)]
    pub ask: f64,
    #[serde(default)]
    pub last: f64,
    #[serde(default)]
    pub mark: f64,
    #[serde(default)]
    pub close: f64,
    #[serde(default)]
    pub percent_change: f64,
    #[serde(default)]
    pub total_volume: i64,
}

/// A single listed contract as returned by the market-data provider.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OptionContract {
    #[serde(default)]
    pub put_call: String,
    /// Provider option symbol (OSI-style).
    #[serde(default)]
    pub symbol: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub bid: f64,
    #[serde(default)]
    pub ask: f64,
    #[serde(default)]
    pub last: f64,
    #[serde(default)]
    pub mark: f64,
    #[serde(default)]
    pub total_volume: i64,
    #[serde(default)]
    pub open_interest: i64,
    #[serde(default, rename = "volatility")]
    pub implied_volatility: f64,
    #[serde(default)]
    pub delta: f64,
    #[serde(default)]
    pub gamma: f64,
    #[serde(default)]
    pub theta: f64,
    #[serde(default)]
    pub vega: f64,
    #[serde(default)]
    pub strike_price: f64,
    #[serde(default)]
    pub expiration_date: String,
    #[serde(default, rename = "daysToExpiration")]
    pub days_to_expiry: i64,
    #[serde(default)]
    pub in_the_money: bool,
}

/// `expiration -> strike -> contracts`. Several contracts may share a strike.
pub type ExpirationMap = BTreeMap<String, BTreeMap<String, Vec<OptionContract>>>;

/// Option chain for one underlying.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OptionChain {
    #[serde(default)]
    pub symbol: String,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub underlying: Underlying,
    #[serde(default)]
    pub call_exp_date_map: ExpirationMap,
    #[serde(default)]
    pub put_exp_date_map: ExpirationMap,
}

impl OptionChain {
    /// Iterate every contract in both buckets, tagged with its side.
    pub fn contracts(&self) -> impl Iterator<Item = (ContractType, &OptionContract)> + '_ {
        let calls = flatten(&self.call_exp_date_map).map(|c| (ContractType::Call, c));
        let puts = flatten(&self.put_exp_date_map).map(|c| (ContractType::Put, c));
        calls.chain(puts)
    }

    /// Number of contracts across both buckets.
    pub fn contract_count(&self) -> usize {
        self.contracts().count()
    }
}

fn flatten(map: &ExpirationMap) -> impl Iterator<Item = &OptionContract> + '_ {
    map.values()
        .flat_map(|strikes| strikes.values())
        .flat_map(|contracts| contracts.iter())
}
