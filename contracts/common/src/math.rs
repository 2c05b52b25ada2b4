//! Mathematical Utilities for the synthUSD Engine
//!
//! Checked arithmetic and the valuation, health-factor, and seizure
//! formulas. All division is truncating; the order of operations in
//! [`health_factor`] is normative (threshold-adjustment first, then
//! scale-and-divide) because reordering changes rounding.

use primitive_types::U256;

use crate::constants::{liquidation, precision, ratios};
use crate::errors::{EngineError, EngineResult};

/// Safe addition with overflow check
pub fn safe_add(a: u128, b: u128) -> EngineResult<u128> {
    a.checked_add(b).ok_or(EngineError::Overflow)
}

/// Safe subtraction with underflow check
pub fn safe_sub(a: u128, b: u128) -> EngineResult<u128> {
    a.checked_sub(b).ok_or(EngineError::Underflow)
}

/// Safe multiplication with overflow check
pub fn safe_mul(a: u128, b: u128) -> EngineResult<u128> {
    a.checked_mul(b).ok_or(EngineError::Overflow)
}

/// Safe division with zero check
pub fn safe_div(a: u128, b: u128) -> EngineResult<u128> {
    a.checked_div(b).ok_or(EngineError::DivisionByZero)
}

/// Truncating `a * b / d` through a 256-bit intermediate.
///
/// An 18-decimal amount times a 1e18-scaled price does not fit in u128
/// (even 1 unit at $3,000 needs ~2^131), so every multiply-then-divide in
/// the valuation formulas routes through here. Only the final quotient must
/// fit back in u128.
pub fn mul_div(a: u128, b: u128, d: u128) -> EngineResult<u128> {
    if d == 0 {
        return Err(EngineError::DivisionByZero);
    }
    let wide = U256::from(a) * U256::from(b) / U256::from(d);
    if (wide >> 128).is_zero() {
        Ok(wide.low_u128())
    } else {
        Err(EngineError::Overflow)
    }
}

/// Brings an 8-decimal feed price up to the 1e18 scale.
///
/// The feed's signed price is reinterpreted unsigned without a sign screen;
/// feeds are trusted to report non-negative values.
fn scaled_price(price: i128) -> EngineResult<u128> {
    safe_mul(price as u128, precision::ADDITIONAL_FEED_PRECISION)
}

/// USD value (1e18 scale) of `amount` asset-native units at `price`.
///
/// `value = amount * (price * 1e10) / 1e18`
pub fn usd_value(price: i128, amount: u128) -> EngineResult<u128> {
    mul_div(amount, scaled_price(price)?, precision::SCALE)
}

/// Asset-native amount worth `value` USD (1e18 scale) at `price`.
///
/// Exact numeric inverse of [`usd_value`] up to integer-division truncation:
/// `amount = value * 1e18 / (price * 1e10)`
pub fn token_amount(price: i128, value: u128) -> EngineResult<u128> {
    mul_div(value, precision::SCALE, scaled_price(price)?)
}

/// Health factor of an account, at the 1e18 scale.
///
/// Debt-free accounts get the sentinel maximum (cannot be unhealthy).
/// Otherwise only [`ratios::LIQUIDATION_THRESHOLD`] percent of nominal
/// collateral value counts:
///
/// `adjusted = collateral_value * 50 / 100`
/// `health   = adjusted * SCALE / debt`
pub fn health_factor(collateral_value: u128, debt: u128) -> EngineResult<u128> {
    if debt == 0 {
        return Ok(ratios::MAX_HEALTH_FACTOR);
    }

    let adjusted = mul_div(
        collateral_value,
        ratios::LIQUIDATION_THRESHOLD,
        ratios::LIQUIDATION_PRECISION,
    )?;

    mul_div(adjusted, precision::SCALE, debt)
}

/// Largest debt that keeps a health factor at or above the minimum for the
/// given collateral value
pub fn debt_ceiling(collateral_value: u128) -> EngineResult<u128> {
    mul_div(
        collateral_value,
        ratios::LIQUIDATION_THRESHOLD,
        ratios::LIQUIDATION_PRECISION,
    )
}

/// Total collateral seized for a liquidation: the debt-equivalent amount
/// plus the [`liquidation::LIQUIDATION_BONUS`] percent incentive
pub fn seizure_with_bonus(base_amount: u128) -> EngineResult<u128> {
    let bonus = mul_div(
        base_amount,
        liquidation::LIQUIDATION_BONUS,
        ratios::LIQUIDATION_PRECISION,
    )?;
    safe_add(base_amount, bonus)
}
