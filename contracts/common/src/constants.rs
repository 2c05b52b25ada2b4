//! Protocol Constants
//!
//! All magic numbers and configuration values for the synthUSD engine.
//! The risk parameters mirror the classic 200%-collateralization CDP design:
//! only half of nominal collateral value counts toward solvency, and
//! liquidators earn a 10% bonus on seized collateral.

/// Token Metadata
pub mod token {
    /// Token name
    pub const NAME: &str = "synthUSD";
    /// Token symbol
    pub const SYMBOL: &str = "sUSD";
    /// Decimal places (18, like the unit-of-account scale)
    pub const DECIMALS: u8 = 18;
    /// One unit with decimals (1 synthUSD = 1e18 base units)
    pub const ONE: u128 = 1_000_000_000_000_000_000;
}

/// Precision constants
pub mod precision {
    /// Unit-of-account fixed-point scale (1e18)
    pub const SCALE: u128 = 1_000_000_000_000_000_000;

    /// Native precision of price feeds (8 decimals)
    pub const FEED_PRECISION: u128 = 100_000_000;

    /// Multiplier bringing an 8-decimal feed price up to the 1e18 scale
    pub const ADDITIONAL_FEED_PRECISION: u128 = 10_000_000_000;

    /// Percentage precision (100 = 100%)
    pub const PERCENT_PRECISION: u128 = 100;
}

/// Solvency Ratios
pub mod ratios {
    use super::precision::SCALE;

    /// Fraction of nominal collateral value counted toward solvency.
    /// 50 out of LIQUIDATION_PRECISION means a position must be 200%
    /// over-collateralized to sit exactly at the minimum health factor.
    pub const LIQUIDATION_THRESHOLD: u128 = 50;

    /// Denominator for LIQUIDATION_THRESHOLD
    pub const LIQUIDATION_PRECISION: u128 = 100;

    /// Minimum health factor, expressed at the 1e18 scale.
    ///
    /// The health factor itself is SCALE-denominated, so the minimum must be
    /// `1 * SCALE`; a bare `1` would make the solvency check pass for any
    /// account holding dust collateral.
    pub const MIN_HEALTH_FACTOR: u128 = SCALE;

    /// Sentinel health factor for debt-free accounts (cannot be unhealthy)
    pub const MAX_HEALTH_FACTOR: u128 = u128::MAX;
}

/// Liquidation Configuration
pub mod liquidation {
    /// Collateral bonus for liquidators, as a percentage of the
    /// debt-equivalent collateral amount (10 = 10%)
    pub const LIQUIDATION_BONUS: u128 = 10;
}

/// Asset Registry Configuration
pub mod registry {
    /// Upper bound on onboarded collateral assets. Valuation iterates the
    /// whole registry, so the bound also caps per-operation oracle reads.
    pub const MAX_COLLATERAL_ASSETS: usize = 16;
}
