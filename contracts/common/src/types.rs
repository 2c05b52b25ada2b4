//! Core Types for the synthUSD Engine
//!
//! This module defines the fundamental data structures: identifier aliases,
//! the immutable asset registry fixed at construction, the ledger's position
//! records, and oracle price data.

use borsh::{BorshDeserialize, BorshSerialize};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::constants::registry::MAX_COLLATERAL_ASSETS;
use crate::errors::{EngineError, EngineResult};
use crate::Vec;

/// Type alias for addresses (32-byte hash)
pub type Address = [u8; 32];

/// Type alias for collateral asset identifiers
pub type AssetId = [u8; 32];

/// Type alias for price feed identifiers
pub type FeedId = [u8; 32];

/// The all-zero address, never a valid identity
pub const ZERO_ADDRESS: Address = [0u8; 32];

/// Derives a deterministic 32-byte identifier from a domain tag and payload.
///
/// Used by tooling and tests to mint stable asset/feed/account identifiers
/// (e.g. `derive_id("asset", b"WETH")`).
pub fn derive_id(tag: &str, data: &[u8]) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(tag.as_bytes());
    hasher.update(data);
    hasher.finalize().into()
}

// ============ Registry Types ============

/// One onboarded collateral asset and the feed that prices it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, BorshSerialize, BorshDeserialize)]
pub struct AssetRegistration {
    /// Unique, non-zero asset identifier
    pub asset_id: AssetId,
    /// Non-zero identifier of the feed backing this asset
    pub price_feed_id: FeedId,
}

/// The fixed asset-to-feed mapping, built once at engine construction.
///
/// The registry is immutable for the lifetime of the engine: there is no
/// add/remove. Its ordered asset list is what valuation iterates, so every
/// registered asset is priced on every solvency check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, BorshSerialize, BorshDeserialize)]
pub struct AssetRegistry {
    entries: Vec<AssetRegistration>,
}

impl AssetRegistry {
    /// Builds a registry from parallel asset and feed id lists.
    ///
    /// # Errors
    /// - `LengthMismatch` if the lists differ in length
    /// - `RegistryTooLarge` above [`MAX_COLLATERAL_ASSETS`]
    /// - `InvalidAddress` for any zero asset or feed id
    /// - `DuplicateAsset` if an asset id appears twice
    pub fn new(assets: &[AssetId], feeds: &[FeedId]) -> EngineResult<Self> {
        if assets.len() != feeds.len() {
            return Err(EngineError::LengthMismatch {
                assets: assets.len(),
                feeds: feeds.len(),
            });
        }
        if assets.len() > MAX_COLLATERAL_ASSETS {
            return Err(EngineError::RegistryTooLarge {
                count: assets.len(),
                max: MAX_COLLATERAL_ASSETS,
            });
        }

        let mut entries = Vec::with_capacity(assets.len());
        for (i, (asset_id, price_feed_id)) in assets.iter().zip(feeds.iter()).enumerate() {
            if *asset_id == ZERO_ADDRESS {
                return Err(EngineError::InvalidAddress {
                    reason: "asset id cannot be zero",
                });
            }
            if *price_feed_id == ZERO_ADDRESS {
                return Err(EngineError::InvalidAddress {
                    reason: "price feed id cannot be zero",
                });
            }
            if assets[..i].contains(asset_id) {
                return Err(EngineError::DuplicateAsset { asset: *asset_id });
            }
            entries.push(AssetRegistration {
                asset_id: *asset_id,
                price_feed_id: *price_feed_id,
            });
        }

        Ok(Self { entries })
    }

    /// Returns the feed backing `asset`, or an `AssetNotAllowed` error
    pub fn feed_of(&self, asset: &AssetId) -> EngineResult<FeedId> {
        self.entries
            .iter()
            .find(|r| r.asset_id == *asset)
            .map(|r| r.price_feed_id)
            .ok_or(EngineError::AssetNotAllowed { asset: *asset })
    }

    /// Returns true if `asset` is registered as collateral
    pub fn is_registered(&self, asset: &AssetId) -> bool {
        self.entries.iter().any(|r| r.asset_id == *asset)
    }

    /// Iterates all registrations in onboarding order
    pub fn registrations(&self) -> impl Iterator<Item = &AssetRegistration> {
        self.entries.iter()
    }

    /// Number of onboarded assets
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if no assets are onboarded
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

// ============ Ledger Record Types ============

/// Per-account, per-asset collateral balance.
///
/// Created implicitly on first deposit, mutated by deposit and redeem/seize,
/// never explicitly destroyed (may sit at zero indefinitely).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, BorshSerialize, BorshDeserialize)]
pub struct CollateralPosition {
    /// Balance in asset-native units
    pub amount: u128,
}

/// Per-account minted-debt balance, in synthUSD base units (1e18 scale)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, BorshSerialize, BorshDeserialize)]
pub struct DebtPosition {
    /// Outstanding minted amount; never underflows below zero
    pub minted_amount: u128,
}

/// Read-only valuation snapshot of one account.
///
/// Always recomputed on demand from the ledger and oracle, never cached.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, BorshSerialize, BorshDeserialize)]
pub struct AccountSummary {
    /// Total collateral value in USD (1e18 scale), across all registered assets
    pub collateral_value: u128,
    /// Outstanding minted debt in synthUSD base units
    pub debt_minted: u128,
}

// ============ Oracle Types ============

/// A price observation from an external feed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, BorshSerialize, BorshDeserialize)]
pub struct PriceData {
    /// Price in USD with 8 decimal places; signed, as reported by the feed
    pub price: i128,
    /// Unix timestamp of the observation
    pub updated_at: u64,
}

impl PriceData {
    /// Creates a new price observation
    pub fn new(price: i128, updated_at: u64) -> Self {
        Self { price, updated_at }
    }
}
