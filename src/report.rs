//! Presentation of scan results.

use candidate_engine::OptionCandidate;
use common::TickerMention;
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct ScanReport {
    pub candidates: Vec<CandidateReport>,
    pub count: usize,
}

#[derive(Debug, Serialize)]
pub struct CandidateReport {
    pub symbol: String,
    pub option_symbol: String,
    pub contract_type: String,
    pub strike_price: f64,
    pub expiration_date: String,
    pub days_to_expiry: i64,
    pub bid: f64,
    pub ask: f64,
    pub premium: f64,
    pub volume: i64,
    pub open_interest: i64,
    pub implied_volatility: f64,
    pub delta: f64,
    pub underlying_price: f64,
    pub sentiment_score: f64,
    pub mentions: u32,
    pub score: f64,
    pub reasoning: String,
}

impl From<&OptionCandidate> for CandidateReport {
    fn from(c: &OptionCandidate) -> Self {
        Self {
            symbol: c.symbol.clone(),
            option_symbol: c.option_symbol.clone(),
            contract_type: c.contract_type.to_string(),
            strike_price: c.strike_price,
            expiration_date: c.expiration_date.clone(),
            days_to_expiry: c.days_to_expiry,
            bid: c.bid,
            ask: c.ask,
            premium: c.premium,
            volume: c.volume,
            open_interest: c.open_interest,
            implied_volatility: c.implied_volatility,
            delta: c.delta,
            underlying_price: c.underlying_price,
            sentiment_score: c.sentiment_score,
            mentions: c.mentions,
            score: round2(c.score),
            reasoning: c.reasoning(),
        }
    }
}

impl ScanReport {
    pub fn new(picks: &[OptionCandidate]) -> Self {
        Self {
            candidates: picks.iter().map(CandidateReport::from).collect(),
            count: picks.len(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct TrendingReport<'a> {
    pub tickers: &'a [TickerMention],
    pub count: usize,
}

impl<'a> TrendingReport<'a> {
    pub fn new(tickers: &'a [TickerMention]) -> Self {
        Self {
            tickers,
            count: tickers.len(),
        }
    }
}

/// One-line log summary of a pick.
pub fn summary_line(rank: usize, c: &OptionCandidate) -> String {
    format!(
        "#{} {} {} ${:.2} exp {} ({}DTE) ask ${:.2} premium ${:.0} score {:.1} | {}",
        rank,
        c.symbol,
        c.contract_type,
        c.strike_price,
        c.expiration_date,
        c.days_to_expiry,
        c.ask,
        c.premium,
        c.score,
        c.reasoning()
    )
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
