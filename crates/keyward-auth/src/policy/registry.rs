//! Immutable registry of policy definitions.

use std::collections::HashMap;

use keyward_core::config::{AuthorizationConfig, PolicyConfig};
use keyward_core::error::AppError;

/// A claim a policy requires: the type matches case-insensitively, the value exactly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClaimRequirement {
    /// Claim type.
    pub claim_type: String,
    /// Required value.
    pub value: String,
}

/// A named conjunction of role and claim requirements.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PolicyDefinition {
    /// Unique policy name.
    pub name: String,
    /// Roles the principal must hold.
    pub required_roles: Vec<String>,
    /// Claims the principal must hold.
    pub required_claims: Vec<ClaimRequirement>,
}

impl PolicyDefinition {
    fn from_config(config: &PolicyConfig) -> Result<Self, AppError> {
        let name = config.name.trim();
        if name.is_empty() {
            return Err(AppError::configuration("Policy name must not be empty"));
        }
        if config.roles.is_empty() && config.claims.is_empty() {
            return Err(AppError::configuration(format!(
                "Policy '{name}' has no requirements"
            )));
        }

        Ok(Self {
            name: name.to_string(),
            required_roles: config.roles.clone(),
            required_claims: config
                .claims
                .iter()
                .map(|c| ClaimRequirement {
                    claim_type: c.claim_type.clone(),
                    value: c.value.clone(),
                })
                .collect(),
        })
    }
}

/// Policy definitions keyed by name. Built once at startup and read-only after.
#[derive(Debug, Clone, Default)]
pub struct PolicyRegistry {
    policies: HashMap<String, PolicyDefinition>,
}

impl PolicyRegistry {
    /// Builds the registry, rejecting duplicate names and empty definitions.
    pub fn from_config(config: &AuthorizationConfig) -> Result<Self, AppError> {
        let mut policies = HashMap::with_capacity(config.policies.len());

        for policy in &config.policies {
            let definition = PolicyDefinition::from_config(policy)?;
            if policies.contains_key(&definition.name) {
                return Err(AppError::configuration(format!(
                    "Policy '{}' is defined more than once",
                    definition.name
                )));
            }
            policies.insert(definition.name.clone(), definition);
        }

        Ok(Self { policies })
    }

    /// Looks up a policy by exact name.
    pub fn get(&self, name: &str) -> Option<&PolicyDefinition> {
        self.policies.get(name)
    }

    /// Policy definitions sorted by name.
    pub fn definitions(&self) -> Vec<&PolicyDefinition> {
        let mut definitions: Vec<_> = self.policies.values().collect();
        definitions.sort_by(|a, b| a.name.cmp(&b.name));
        definitions
    }

    /// Number of registered policies.
    pub fn len(&self) -> usize {
        self.policies.len()
    }

    /// Whether no policies are registered.
    pub fn is_empty(&self) -> bool {
        self.policies.is_empty()
    }
}
