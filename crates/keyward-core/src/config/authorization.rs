//! Authorization policy configuration.

use serde::{Deserialize, Serialize};

/// Named authorization policies, loaded once at startup.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthorizationConfig {
    /// Policy definitions. Replaces the built-in set when present.
    #[serde(default = "default_policies")]
    pub policies: Vec<PolicyConfig>,
}

impl Default for AuthorizationConfig {
    fn default() -> Self {
        Self {
            policies: default_policies(),
        }
    }
}

/// A single policy: every listed role and claim is required.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PolicyConfig {
    /// Unique policy name.
    pub name: String,
    /// Roles the principal must hold.
    #[serde(default)]
    pub roles: Vec<String>,
    /// Claims the principal must hold.
    #[serde(default)]
    pub claims: Vec<ClaimRequirementConfig>,
}

/// A required `(type, value)` claim.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClaimRequirementConfig {
    /// Claim type, e.g. `Department`.
    #[serde(rename = "type")]
    pub claim_type: String,
    /// Required claim value, e.g. `Tech`.
    pub value: String,
}

fn default_policies() -> Vec<PolicyConfig> {
    let department = || ClaimRequirementConfig {
        claim_type: "Department".to_string(),
        value: "Tech".to_string(),
    };

    vec![
        PolicyConfig {
            name: "MemberDep".to_string(),
            roles: vec!["Member".to_string()],
            claims: vec![department()],
        },
        PolicyConfig {
            name: "AdminDep".to_string(),
            roles: vec!["Admin".to_string()],
            claims: vec![department()],
        },
    ]
}
