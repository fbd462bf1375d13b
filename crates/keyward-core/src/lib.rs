//! # keyward-core
//!
//! Core crate for Keyward. Contains configuration schemas, the cache and
//! clock traits shared by the other crates, and the unified error system.
//!
//! This crate has **no** internal dependencies on other Keyward crates.

pub mod config;
pub mod error;
pub mod result;
pub mod traits;

pub use error::AppError;
pub use result::AppResult;
