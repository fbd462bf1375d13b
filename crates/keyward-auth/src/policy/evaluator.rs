//! Policy evaluation against a principal.

use std::fmt;
use std::sync::Arc;

use keyward_core::config::SessionConfig;
use keyward_entity::principal::Principal;

use super::registry::PolicyRegistry;
use crate::error::AuthError;

/// Why a principal failed a policy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DenyReason {
    /// A required role is not assigned.
    MissingRole(String),
    /// A required claim is not held.
    MissingClaim {
        /// Claim type.
        claim_type: String,
        /// Required value.
        value: String,
    },
}

impl fmt::Display for DenyReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingRole(role) => write!(f, "missing role '{role}'"),
            Self::MissingClaim { claim_type, value } => {
                write!(f, "missing claim '{claim_type}={value}'")
            }
        }
    }
}

/// Outcome of an authorization check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    /// Every requirement is met.
    Allow,
    /// The first unmet requirement.
    Deny(DenyReason),
}

impl Decision {
    /// Whether access is granted.
    pub fn is_allowed(&self) -> bool {
        matches!(self, Self::Allow)
    }

    /// Page a cookie-based boundary should redirect a denied request to.
    pub fn redirect_path<'a>(&self, config: &'a SessionConfig) -> Option<&'a str> {
        match self {
            Self::Allow => None,
            Self::Deny(_) => Some(config.access_denied_path.as_str()),
        }
    }
}

/// Evaluates named policies.
#[derive(Debug, Clone)]
pub struct PolicyEvaluator {
    registry: Arc<PolicyRegistry>,
}

impl PolicyEvaluator {
    /// Creates an evaluator over `registry`.
    pub fn new(registry: Arc<PolicyRegistry>) -> Self {
        Self { registry }
    }

    /// The policy registry.
    pub fn registry(&self) -> &PolicyRegistry {
        &self.registry
    }

    /// Evaluates `policy` for `principal`. Pure: no I/O.
    pub fn evaluate(&self, policy: &str, principal: &Principal) -> Result<Decision, AuthError> {
        let definition = self
            .registry
            .get(policy)
            .ok_or_else(|| AuthError::UnknownPolicy(policy.to_string()))?;

        if let Some(role) = definition
            .required_roles
            .iter()
            .find(|role| !principal.has_role(role))
        {
            return Ok(Decision::Deny(DenyReason::MissingRole(role.clone())));
        }

        if let Some(claim) = definition
            .required_claims
            .iter()
            .find(|claim| !principal.has_claim(&claim.claim_type, &claim.value))
        {
            return Ok(Decision::Deny(DenyReason::MissingClaim {
                claim_type: claim.claim_type.clone(),
                value: claim.value.clone(),
            }));
        }

        Ok(Decision::Allow)
    }
}
