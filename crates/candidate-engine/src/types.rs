use std::fmt;

use common::{ContractType, OptionContract, TickerMention, Underlying};
use serde::{Deserialize, Serialize};

/// Cash cost multiplier: one contract controls 100 shares.
pub const CONTRACT_MULTIPLIER: f64 = 100.0;

/// Reasoning shown when no scoring bonus fired.
pub const FALLBACK_REASONING: &str = "Meets basic criteria";

/// One filtered contract, annotated with the sentiment that surfaced it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OptionCandidate {
    pub symbol: String,
    pub option_symbol: String,
    pub contract_type: ContractType,
    pub strike_price: f64,
    pub expiration_date: String,
    pub days_to_expiry: i64,
    pub bid: f64,
    pub ask: f64,
    /// Cost to open one contract (ask × 100).
    pub premium: f64,
    pub volume: i64,
    pub open_interest: i64,
    pub implied_volatility: f64,
    pub delta: f64,
    pub underlying_price: f64,
    pub sentiment_score: f64,
    pub mentions: u32,
    /// Zero until scored.
    pub score: f64,
    pub breakdown: ScoreBreakdown,
    /// Triggered bonuses in evaluation order. Empty until scored.
    pub reasons: Vec<ScanReason>,
}

impl OptionCandidate {
    pub fn from_contract(
        contract: &OptionContract,
        contract_type: ContractType,
        underlying: &Underlying,
        mention: &TickerMention,
    ) -> Self {
        let symbol = if underlying.symbol.is_empty() {
            mention.symbol.clone()
        } else {
            underlying.symbol.clone()
        };

        Self {
            symbol,
            option_symbol: contract.symbol.clone(),
            contract_type,
            strike_price: contract.strike_price,
            expiration_date: contract.expiration_date.clone(),
            days_to_expiry: contract.days_to_expiry,
            bid: contract.bid,
            ask: contract.ask,
            premium: premium_of(contract),
            volume: contract.total_volume,
            open_interest: contract.open_interest,
            implied_volatility: contract.implied_volatility,
            delta: contract.delta,
            underlying_price: underlying.last,
            sentiment_score: mention.sentiment,
            mentions: mention.mentions,
            score: 0.0,
            breakdown: ScoreBreakdown::default(),
            reasons: Vec::new(),
        }
    }

    /// Human-readable rationale rendered from `reasons`.
    pub fn reasoning(&self) -> String {
        if self.reasons.is_empty() {
            return FALLBACK_REASONING.to_string();
        }
        self.reasons
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join("; ")
    }
}

/// Premium for one contract at the ask.
pub fn premium_of(contract: &OptionContract) -> f64 {
    contract.ask * CONTRACT_MULTIPLIER
}

/// Per-factor contributions to a candidate's score.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ScoreBreakdown {
    pub sentiment: f64,
    pub mentions: f64,
    pub volume_vs_open_interest: f64,
    pub delta: f64,
    pub expiry: f64,
    pub premium: f64,
}

impl ScoreBreakdown {
    pub fn total(&self) -> f64 {
        self.sentiment
            + self.mentions
            + self.volume_vs_open_interest
            + self.delta
            + self.expiry
            + self.premium
    }
}

/// A scoring bonus that fired for a candidate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum ScanReason {
    StrongBullishSentiment(f64),
    HighMentionCount(u32),
    UnusualVolume,
    OptimalDelta,
    ZeroOrOneDte,
    ShortDatedExpiry,
}

impl fmt::Display for ScanReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScanReason::StrongBullishSentiment(s) => write!(f, "Strong bullish sentiment ({:.2})", s),
            ScanReason::HighMentionCount(n) => write!(f, "High social mention count ({})", n),
            ScanReason::UnusualVolume => f.write_str("Unusual volume vs open interest"),
            ScanReason::OptimalDelta => f.write_str("Optimal delta range"),
            ScanReason::ZeroOrOneDte => f.write_str("0DTE/1DTE opportunity"),
            ScanReason::ShortDatedExpiry => f.write_str("Short-dated expiry"),
        }
    }
}
