//! # keyward-cache
//!
//! Cache provider implementations for Keyward. The in-memory provider uses
//! [moka](https://crates.io/crates/moka) with per-entry TTLs; the provider is
//! selected at runtime based on configuration.

pub mod keys;
#[cfg(feature = "memory")]
pub mod memory;
pub mod provider;

pub use provider::CacheManager;
