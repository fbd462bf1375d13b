//! Credential, password policy, and lockout configuration.

use serde::{Deserialize, Serialize};

/// Authentication and credential configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// Rules applied to new passwords.
    #[serde(default)]
    pub password: PasswordPolicyConfig,
    /// Argon2id work factor.
    #[serde(default)]
    pub hashing: HashingConfig,
    /// Failed-attempt lockout.
    #[serde(default)]
    pub lockout: LockoutConfig,
    /// Reject sign-in until the account's email address is confirmed.
    #[serde(default = "default_true")]
    pub require_confirmed_email: bool,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            password: PasswordPolicyConfig::default(),
            hashing: HashingConfig::default(),
            lockout: LockoutConfig::default(),
            require_confirmed_email: true,
        }
    }
}

/// Password strength requirements.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PasswordPolicyConfig {
    /// Minimum password length in characters.
    #[serde(default = "default_required_length")]
    pub required_length: usize,
    /// Require at least one ASCII digit.
    #[serde(default = "default_true")]
    pub require_digit: bool,
    /// Require at least one lowercase letter.
    #[serde(default = "default_true")]
    pub require_lowercase: bool,
    /// Require at least one uppercase letter.
    #[serde(default = "default_true")]
    pub require_uppercase: bool,
    /// Require at least one non-alphanumeric character.
    #[serde(default = "default_true")]
    pub require_non_alphanumeric: bool,
    /// Minimum zxcvbn score (0-4). `0` disables the entropy check.
    #[serde(default = "default_strength_score")]
    pub min_strength_score: u8,
}

impl Default for PasswordPolicyConfig {
    fn default() -> Self {
        Self {
            required_length: default_required_length(),
            require_digit: true,
            require_lowercase: true,
            require_uppercase: true,
            require_non_alphanumeric: true,
            min_strength_score: default_strength_score(),
        }
    }
}

/// Argon2id cost parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HashingConfig {
    /// Memory cost in KiB.
    #[serde(default = "default_memory_kib")]
    pub memory_kib: u32,
    /// Number of passes.
    #[serde(default = "default_iterations")]
    pub iterations: u32,
    /// Degree of parallelism.
    #[serde(default = "default_parallelism")]
    pub parallelism: u32,
}

impl Default for HashingConfig {
    fn default() -> Self {
        Self {
            memory_kib: default_memory_kib(),
            iterations: default_iterations(),
            parallelism: default_parallelism(),
        }
    }
}

/// Failed-attempt lockout configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LockoutConfig {
    /// Whether reaching the attempt limit locks the account.
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Consecutive failures that trigger a lockout.
    #[serde(default = "default_max_failed")]
    pub max_failed_attempts: u32,
    /// Lockout duration in minutes.
    #[serde(default = "default_lockout_minutes")]
    pub duration_minutes: u64,
}

impl Default for LockoutConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            max_failed_attempts: default_max_failed(),
            duration_minutes: default_lockout_minutes(),
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_required_length() -> usize {
    8
}

fn default_strength_score() -> u8 {
    3
}

fn default_memory_kib() -> u32 {
    19_456
}

fn default_iterations() -> u32 {
    2
}

fn default_parallelism() -> u32 {
    1
}

fn default_max_failed() -> u32 {
    3
}

fn default_lockout_minutes() -> u64 {
    10
}
