//! # keyward-entity
//!
//! Domain entity models for Keyward. Every struct in this crate represents a
//! database row or a domain value object. Row types additionally derive
//! `sqlx::FromRow`.

pub mod claim;
pub mod principal;
pub mod role;
pub mod user;

pub use claim::Claim;
pub use principal::Principal;
pub use role::Role;
pub use user::{NewUser, User};
