//! Liquidity and cost filter applied to every contract in a chain.

use std::fmt;

use common::{OptionContract, ScanConfig};

use crate::types::premium_of;

/// Widest accepted (ask - bid) / bid.
pub const MAX_RELATIVE_SPREAD: f64 = 0.20;

/// Why a contract was dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Rejection {
    NoPremium,
    PremiumTooHigh,
    ExpiresTooLate,
    LowVolume,
    LowOpenInterest,
    WideSpread,
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Rejection::NoPremium => "no_premium",
            Rejection::PremiumTooHigh => "premium_too_high",
            Rejection::ExpiresTooLate => "expires_too_late",
            Rejection::LowVolume => "low_volume",
            Rejection::LowOpenInterest => "low_open_interest",
            Rejection::WideSpread => "wide_spread",
        };
        f.write_str(label)
    }
}

/// Accept or reject a contract. Checks run cheapest-first; the first failure wins.
pub fn check_contract(contract: &OptionContract, config: &ScanConfig) -> Result<(), Rejection> {
    let premium = premium_of(contract);

    if premium.is_nan() || premium <= 0.0 {
        return Err(Rejection::NoPremium);
    }
    if premium > config.max_premium {
        return Err(Rejection::PremiumTooHigh);
    }
    if contract.days_to_expiry > config.max_days_to_expiry {
        return Err(Rejection::ExpiresTooLate);
    }
    if contract.total_volume < config.min_volume {
        return Err(Rejection::LowVolume);
    }
    if contract.open_interest < config.min_open_interest {
        return Err(Rejection::LowOpenInterest);
    }
    // A zero bid has no meaningful relative spread.
    if contract.bid > 0.0 {
        let spread = (contract.ask - contract.bid) / contract.bid;
        if spread > MAX_RELATIVE_SPREAD {
            return Err(Rejection::WideSpread);
        }
    }

    Ok(())
}
