//! Typed key/value claims attached to a user.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A `(type, value)` fact about a user, e.g. `Department=Tech`.
///
/// A user may hold several claims of the same type; identical pairs collapse.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, FromRow)]
pub struct Claim {
    /// Claim type.
    pub claim_type: String,
    /// Claim value.
    #[sqlx(rename = "claim_value")]
    pub value: String,
}

impl Claim {
    /// Creates a claim.
    pub fn new(claim_type: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            claim_type: claim_type.into(),
            value: value.into(),
        }
    }

    /// Whether this claim satisfies a `(type, value)` requirement.
    ///
    /// Types compare case-insensitively, values exactly.
    pub fn satisfies(&self, claim_type: &str, value: &str) -> bool {
        self.claim_type.eq_ignore_ascii_case(claim_type) && self.value == value
    }
}

impl fmt::Display for Claim {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={}", self.claim_type, self.value)
    }
}

impl FromStr for Claim {
    type Err = keyward_core::AppError;

    /// Parses `Type=Value`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.split_once('=') {
            Some((claim_type, value)) if !claim_type.trim().is_empty() => {
                Ok(Self::new(claim_type.trim(), value.trim()))
            }
            _ => Err(keyward_core::AppError::validation(format!(
                "Invalid claim '{s}'. Expected Type=Value"
            ))),
        }
    }
}
