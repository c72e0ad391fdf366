use crate::types::{OptionCandidate, ScanReason, ScoreBreakdown};

/// Premium at which the premium term reaches zero. Fixed, independent of
/// `ScanConfig::max_premium`.
pub const PREMIUM_SCORE_REFERENCE: f64 = 500.0;

const SENTIMENT_WEIGHT: f64 = 15.0;
const BULLISH_SENTIMENT_THRESHOLD: f64 = 0.3;
const MENTION_CAP: u32 = 20;
const HIGH_MENTION_COUNT: u32 = 5;
const VOLUME_OI_POINTS: f64 = 20.0;
const OPTIMAL_DELTA_POINTS: f64 = 15.0;
const ACCEPTABLE_DELTA_POINTS: f64 = 8.0;
const PREMIUM_POINTS: f64 = 10.0;

pub fn compute_score(candidate: &OptionCandidate) -> (ScoreBreakdown, Vec<ScanReason>) {
    let mut breakdown = ScoreBreakdown::default();
    let mut reasons = Vec::new();

    // 1. Sentiment (0-30): map -1..1 onto 0..30
    let sentiment = candidate.sentiment_score.clamp(-1.0, 1.0);
    breakdown.sentiment = (sentiment + 1.0) * SENTIMENT_WEIGHT;
    if sentiment > BULLISH_SENTIMENT_THRESHOLD {
        reasons.push(ScanReason::StrongBullishSentiment(sentiment));
    }

    // 2. Mentions (0-20)
    breakdown.mentions = f64::from(candidate.mentions.min(MENTION_CAP));
    if candidate.mentions >= HIGH_MENTION_COUNT {
        reasons.push(ScanReason::HighMentionCount(candidate.mentions));
    }

    // 3. Volume vs open interest (0-20). Skipped when nothing is open.
    if candidate.open_interest > 0 {
        let ratio = candidate.volume.max(0) as f64 / candidate.open_interest as f64;
        if ratio > 1.0 {
            breakdown.volume_vs_open_interest = VOLUME_OI_POINTS;
            reasons.push(ScanReason::UnusualVolume);
        } else {
            breakdown.volume_vs_open_interest = ratio * VOLUME_OI_POINTS;
        }
    }

    // 4. Delta (0/8/15): favor slightly OTM
    let abs_delta = candidate.delta.abs();
    if (0.25..=0.45).contains(&abs_delta) {
        breakdown.delta = OPTIMAL_DELTA_POINTS;
        reasons.push(ScanReason::OptimalDelta);
    } else if (0.15..=0.55).contains(&abs_delta) {
        breakdown.delta = ACCEPTABLE_DELTA_POINTS;
    }

    // 5. Time to expiry (5/10/15)
    breakdown.expiry = if candidate.days_to_expiry <= 1 {
        reasons.push(ScanReason::ZeroOrOneDte);
        15.0
    } else if candidate.days_to_expiry <= 3 {
        reasons.push(ScanReason::ShortDatedExpiry);
        10.0
    } else {
        5.0
    };

    // 6. Premium (0-10): cheaper is better
    let premium_points = (1.0 - candidate.premium / PREMIUM_SCORE_REFERENCE) * PREMIUM_POINTS;
    breakdown.premium = premium_points.clamp(0.0, PREMIUM_POINTS);

    (breakdown, reasons)
}

/// Score one candidate in place.
pub fn score_candidate(candidate: &mut OptionCandidate) {
    let (breakdown, reasons) = compute_score(candidate);
    candidate.score = breakdown.total();
    candidate.breakdown = breakdown;
    candidate.reasons = reasons;
}

/// Score every candidate in place. Order is untouched.
pub fn score_all(candidates: &mut [OptionCandidate]) {
    candidates.iter_mut().for_each(score_candidate);
}
