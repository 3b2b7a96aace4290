//! Premium arithmetic. Integer only, basis points at 4-decimal resolution,
//! floor division at every step.

use crate::types::{InsuranceError, TierConfig};

pub const BASIS_POINTS: i128 = 10_000;
pub const MULTIPLIER_BASE: i128 = 100;

/// `payout * probability / 10000 * (10000 + margin) / 10000`
pub fn quote(payout: i128, probability_bps: u32, margin_bps: u32) -> Result<i128, InsuranceError> {
    if payout < 0 {
        return Err(InsuranceError::InvalidAmount);
    }

    let expected_loss = payout
        .checked_mul(probability_bps as i128)
        .ok_or(InsuranceError::ArithmeticOverflow)?
        / BASIS_POINTS;

    let loaded = expected_loss
        .checked_mul(BASIS_POINTS + margin_bps as i128)
        .ok_or(InsuranceError::ArithmeticOverflow)?;

    Ok(loaded / BASIS_POINTS)
}

/// Premium charged for a tier, with the premium multiplier applied on top of
/// the quote.
pub fn tier_premium(config: &TierConfig) -> Result<i128, InsuranceError> {
    let base = quote(config.payout, config.probability_bps, config.margin_bps)?;
    let scaled = base
        .checked_mul(config.premium_multiplier as i128)
        .ok_or(InsuranceError::ArithmeticOverflow)?;
    Ok(scaled / MULTIPLIER_BASE)
}
