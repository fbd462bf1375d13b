//! The resolved identity used for authorization decisions.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::claim::Claim;

/// A user together with the roles and claims held right now.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Principal {
    /// The authenticated user.
    pub user_id: Uuid,
    /// Role names.
    pub roles: BTreeSet<String>,
    /// Claims.
    pub claims: BTreeSet<Claim>,
}

impl Principal {
    /// Creates a principal with no roles or claims.
    pub fn new(user_id: Uuid) -> Self {
        Self {
            user_id,
            roles: BTreeSet::new(),
            claims: BTreeSet::new(),
        }
    }

    /// Adds a role (builder style).
    pub fn with_role(mut self, role: impl Into<String>) -> Self {
        self.roles.insert(role.into());
        self
    }

    /// Adds a claim (builder style).
    pub fn with_claim(mut self, claim_type: impl Into<String>, value: impl Into<String>) -> Self {
        self.claims.insert(Claim::new(claim_type, value));
        self
    }

    /// Whether the principal holds `role`. Role names compare exactly.
    pub fn has_role(&self, role: &str) -> bool {
        self.roles.contains(role)
    }

    /// Whether any held claim satisfies `(claim_type, value)`.
    pub fn has_claim(&self, claim_type: &str, value: &str) -> bool {
        self.claims.iter().any(|c| c.satisfies(claim_type, value))
    }
}
