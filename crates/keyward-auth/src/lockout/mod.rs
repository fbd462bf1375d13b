//! Failed-attempt lockout.

pub mod policy;

pub use policy::{FailedAttempt, FailureThreshold, LockoutPolicy, LockoutState};
