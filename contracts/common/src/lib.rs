//! synthUSD Common Library
//!
//! Shared types, constants, and utilities for the synthUSD engine.
//!
//! synthUSD is an over-collateralized synthetic dollar: users lock volatile
//! collateral assets and mint synthUSD against them, with supply capped at a
//! safety-adjusted fraction of collateral value. This crate holds the
//! foundation the engine is built on:
//!
//! - **Constants**: precision scales, the liquidation threshold and bonus,
//!   and the minimum health factor
//! - **Types**: addresses, the immutable asset registry, position records,
//!   and oracle price data
//! - **Errors**: the full typed error taxonomy with stable diagnostic codes
//! - **Math**: checked arithmetic and the valuation / health-factor formulas
//! - **Events**: the event enum and log consumed by off-engine indexers
//!
//! This crate is `no_std` compatible when built without the default `std`
//! feature.

#![cfg_attr(not(feature = "std"), no_std)]

#[cfg(not(feature = "std"))]
extern crate alloc;

// Re-export Vec for submodules based on feature
#[cfg(not(feature = "std"))]
pub use alloc::vec::Vec;
#[cfg(feature = "std")]
pub use std::vec::Vec;

pub mod constants;
pub mod errors;
pub mod types;
pub mod math;
pub mod events;

// Re-exports for convenience
pub use constants::*;
pub use errors::*;
pub use types::*;
pub use math::*;
pub use events::*;
