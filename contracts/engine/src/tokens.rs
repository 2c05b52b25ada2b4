//! Collaborator Token Capabilities
//!
//! The engine does not implement any token. It consumes two capabilities:
//! a fungible-asset transfer surface for collateral custody, and the
//! synthUSD issuer's owner-gated mint/burn surface. Both follow standard
//! fungible-asset semantics: a `false` return is treated identically to a
//! thrown failure and aborts the whole enclosing operation.

use synthusd_common::types::{Address, AssetId};

/// Transfer surface over the onboarded collateral assets.
///
/// Implementations are bound to the engine's identity: `transfer` spends
/// from the engine's own custody balance.
pub trait AssetTransfer {
    /// Move `amount` of `asset` from `from` into `to`. Requires prior
    /// approval on the caller's side; returns false on refusal.
    fn transfer_from(&mut self, asset: &AssetId, from: &Address, to: &Address, amount: u128)
        -> bool;

    /// Move `amount` of `asset` out of the engine's custody into `to`
    fn transfer(&mut self, asset: &AssetId, to: &Address, amount: u128) -> bool;
}

/// The synthUSD token's owner-gated issue/retire surface.
///
/// Mint and burn are restricted to calls originating from the engine; the
/// engine treats a `false` return from mint as fatal for the enclosing
/// operation.
pub trait StablecoinIssuer {
    /// Issue `amount` of synthUSD to `to`; returns false on refusal
    fn mint(&mut self, to: &Address, amount: u128) -> bool;

    /// Destroy `amount` of synthUSD held in the engine's custody
    fn burn(&mut self, amount: u128);

    /// Move `amount` of synthUSD from `from` into `to`; returns false on
    /// refusal
    fn transfer_from(&mut self, from: &Address, to: &Address, amount: u128) -> bool;
}
