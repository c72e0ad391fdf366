//! Ordering and truncation of scored candidates.

use crate::types::OptionCandidate;

/// Sort by descending score. Stable: equal scores keep their input order.
pub fn rank(mut candidates: Vec<OptionCandidate>) -> Vec<OptionCandidate> {
    candidates.sort_by(|a, b| b.score.total_cmp(&a.score));
    candidates
}

/// First `n` of an already-ranked list; the whole list if it is shorter.
pub fn top_picks(mut ranked: Vec<OptionCandidate>, n: usize) -> Vec<OptionCandidate> {
    ranked.truncate(n);
    ranked
}
