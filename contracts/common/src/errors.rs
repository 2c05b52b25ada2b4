//! Error Types for the synthUSD Engine
//!
//! Every failure aborts the enclosing operation atomically; none are retried
//! internally and none are silently recovered. The typed variants carry the
//! values that were measured when the check failed, for diagnostics.

use crate::types::{Address, AssetId, FeedId};

/// Result type alias for engine operations
pub type EngineResult<T> = Result<T, EngineError>;

/// Main error enum for all synthUSD engine errors
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineError {
    // ============ Input Validation Errors ============
    /// Zero amount where a positive amount is required
    ZeroAmount,

    /// Asset is not registered as collateral
    AssetNotAllowed { asset: AssetId },

    /// Construction lists have different lengths
    LengthMismatch { assets: usize, feeds: usize },

    /// Invalid address (e.g., zero address)
    InvalidAddress {
        /// Description of why the address is invalid
        reason: &'static str,
    },

    /// Asset registered more than once
    DuplicateAsset { asset: AssetId },

    /// More assets than the registry supports
    RegistryTooLarge { count: usize, max: usize },

    // ============ Solvency Errors ============
    /// Health factor below minimum after a user-initiated mutation
    HealthFactorBroken { health_factor: u128 },

    // ============ Liquidation Errors ============
    /// Liquidation target is at or above the minimum health factor
    TargetHealthy { health_factor: u128 },

    /// Liquidation did not improve the target's health factor
    HealthFactorNotImproved { starting: u128, ending: u128 },

    // ============ Ledger Errors ============
    /// Debit would drive a balance below zero
    InsufficientBalance { available: u128, requested: u128 },

    // ============ Collaborator Errors ============
    /// Asset transfer returned failure
    TransferFailed {
        asset: AssetId,
        from: Address,
        to: Address,
        amount: u128,
    },

    /// Stablecoin issuer refused to mint
    MintFailed { to: Address, amount: u128 },

    /// Price feed unreachable or returned no data
    FeedUnavailable { feed: FeedId },

    /// Price observation older than the configured maximum age.
    /// Only produced by the opt-in staleness guard; core operation paths
    /// trust any price, however old.
    StalePrice {
        updated_at: u64,
        now: u64,
        max_age: u64,
    },

    // ============ Math Errors ============
    /// Arithmetic overflow occurred
    Overflow,

    /// Arithmetic underflow occurred
    Underflow,

    /// Division by zero
    DivisionByZero,

    // ============ Concurrency Errors ============
    /// Nested call into a guarded entry point
    ReentrantCall,
}

impl EngineError {
    /// Returns a human-readable error code for logging/debugging
    pub fn code(&self) -> &'static str {
        match self {
            Self::ZeroAmount => "E001_ZERO_AMOUNT",
            Self::AssetNotAllowed { .. } => "E002_ASSET_NOT_ALLOWED",
            Self::LengthMismatch { .. } => "E003_LENGTH_MISMATCH",
            Self::InvalidAddress { .. } => "E004_INVALID_ADDRESS",
            Self::DuplicateAsset { .. } => "E005_DUPLICATE_ASSET",
            Self::RegistryTooLarge { .. } => "E006_REGISTRY_TOO_LARGE",
            Self::HealthFactorBroken { .. } => "E010_HEALTH_FACTOR_BROKEN",
            Self::TargetHealthy { .. } => "E020_TARGET_HEALTHY",
            Self::HealthFactorNotImproved { .. } => "E021_HEALTH_NOT_IMPROVED",
            Self::InsufficientBalance { .. } => "E030_INSUFFICIENT_BALANCE",
            Self::TransferFailed { .. } => "E040_TRANSFER_FAILED",
            Self::MintFailed { .. } => "E041_MINT_FAILED",
            Self::FeedUnavailable { .. } => "E042_FEED_UNAVAILABLE",
            Self::StalePrice { .. } => "E043_STALE_PRICE",
            Self::Overflow => "E050_OVERFLOW",
            Self::Underflow => "E051_UNDERFLOW",
            Self::DivisionByZero => "E052_DIV_ZERO",
            Self::ReentrantCall => "E060_REENTRANT_CALL",
        }
    }

    /// Returns true if this error is recoverable (caller can fix it and retry)
    pub fn is_recoverable(&self) -> bool {
        match self {
            Self::HealthFactorBroken { .. } => true, // Add collateral or mint less
            Self::InsufficientBalance { .. } => true, // Reduce the requested amount
            Self::TargetHealthy { .. } => true,      // Wait for prices to move
            Self::FeedUnavailable { .. } => true,    // Feed may come back
            Self::StalePrice { .. } => true,         // Wait for an update
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;

    #[test]
    fn test_error_codes_unique() {
        // Ensure all error codes are unique
        let errors = [
            EngineError::ZeroAmount,
            EngineError::AssetNotAllowed { asset: [1u8; 32] },
            EngineError::LengthMismatch { assets: 2, feeds: 3 },
            EngineError::InvalidAddress { reason: "zero" },
            EngineError::DuplicateAsset { asset: [1u8; 32] },
            EngineError::RegistryTooLarge { count: 17, max: 16 },
            EngineError::HealthFactorBroken { health_factor: 0 },
            EngineError::TargetHealthy { health_factor: 0 },
            EngineError::HealthFactorNotImproved { starting: 0, ending: 0 },
            EngineError::InsufficientBalance { available: 0, requested: 1 },
            EngineError::TransferFailed {
                asset: [1u8; 32],
                from: [2u8; 32],
                to: [3u8; 32],
                amount: 1,
            },
            EngineError::MintFailed { to: [2u8; 32], amount: 1 },
            EngineError::FeedUnavailable { feed: [4u8; 32] },
            EngineError::StalePrice {
                updated_at: 0,
                now: 7200,
                max_age: 3600,
            },
            EngineError::Overflow,
            EngineError::Underflow,
            EngineError::DivisionByZero,
            EngineError::ReentrantCall,
        ];

        let codes: Vec<_> = errors.iter().map(|e| e.code()).collect();
        let unique: BTreeSet<_> = codes.iter().collect();
        assert_eq!(codes.len(), unique.len(), "Error codes must be unique");
    }

    #[test]
    fn test_recoverable_classification() {
        assert!(EngineError::HealthFactorBroken { health_factor: 1 }.is_recoverable());
        assert!(!EngineError::ZeroAmount.is_recoverable());
        assert!(!EngineError::ReentrantCall.is_recoverable());
    }
}
