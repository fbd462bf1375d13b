//! Password policy enforcement for new passwords.

use keyward_core::config::PasswordPolicyConfig;

use crate::error::AuthError;

/// Validates password strength against the configured policy.
#[derive(Debug, Clone)]
pub struct PasswordValidator {
    policy: PasswordPolicyConfig,
}

impl PasswordValidator {
    /// Creates a new validator from the password policy.
    pub fn new(policy: &PasswordPolicyConfig) -> Self {
        Self {
            policy: policy.clone(),
        }
    }

    /// Validates a password against all configured rules.
    ///
    /// Returns the first violation found.
    pub fn validate(&self, password: &str) -> Result<(), AuthError> {
        let policy = &self.policy;

        if password.chars().count() < policy.required_length {
            return Err(AuthError::WeakPassword(format!(
                "Password must be at least {} characters long",
                policy.required_length
            )));
        }

        if policy.require_uppercase && !password.chars().any(|c| c.is_uppercase()) {
            return Err(AuthError::WeakPassword(
                "Password must contain at least one uppercase letter".into(),
            ));
        }

        if policy.require_lowercase && !password.chars().any(|c| c.is_lowercase()) {
            return Err(AuthError::WeakPassword(
                "Password must contain at least one lowercase letter".into(),
            ));
        }

        if policy.require_digit && !password.chars().any(|c| c.is_ascii_digit()) {
            return Err(AuthError::WeakPassword(
                "Password must contain at least one digit".into(),
            ));
        }

        if policy.require_non_alphanumeric && !password.chars().any(|c| !c.is_alphanumeric()) {
            return Err(AuthError::WeakPassword(
                "Password must contain at least one special character".into(),
            ));
        }

        if policy.min_strength_score > 0 {
            let estimate = zxcvbn::zxcvbn(password, &[]);
            if score_value(estimate.score()) < policy.min_strength_score {
                return Err(AuthError::WeakPassword(
                    "Password is too weak. Please use a stronger password with more entropy."
                        .into(),
                ));
            }
        }

        Ok(())
    }

    /// Validates that a new password differs from the old one.
    pub fn validate_not_same(&self, old_password: &str, new_password: &str) -> Result<(), AuthError> {
        if old_password == new_password {
            return Err(AuthError::WeakPassword(
                "New password must be different from the current password".into(),
            ));
        }
        Ok(())
    }
}

fn score_value(score: zxcvbn::Score) -> u8 {
    match score {
        zxcvbn::Score::Zero => 0,
        zxcvbn::Score::One => 1,
        zxcvbn::Score::Two => 2,
        zxcvbn::Score::Three => 3,
        _ => 4,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lenient() -> PasswordPolicyConfig {
        PasswordPolicyConfig {
            required_length: 3,
            require_digit: false,
            require_lowercase: true,
            require_uppercase: false,
            require_non_alphanumeric: false,
            min_strength_score: 0,
        }
    }

    #[test]
    fn test_default_policy_rejects_short_password() {
        let validator = PasswordValidator::new(&PasswordPolicyConfig::default());
        let err = validator.validate("Ab1!").unwrap_err();
        assert!(err.to_string().contains("at least 8 characters"));
    }

    #[test]
    fn test_default_policy_requires_character_classes() {
        let validator = PasswordValidator::new(&PasswordPolicyConfig::default());
        assert!(validator.validate("lowercase-only-1").is_err());
        assert!(validator.validate("NoDigitsHere!").is_err());
        assert!(validator.validate("NoSpecials123").is_err());
    }

    #[test]
    fn test_default_policy_accepts_strong_password() {
        let validator = PasswordValidator::new(&PasswordPolicyConfig::default());
        assert!(validator.validate("Quartz!Harbor7Lantern").is_ok());
    }

    #[test]
    fn test_entropy_check() {
        let validator = PasswordValidator::new(&PasswordPolicyConfig::default());
        let err = validator.validate("Password1!").unwrap_err();
        assert!(matches!(err, AuthError::WeakPassword(_)));
    }

    #[test]
    fn test_lenient_policy() {
        let validator = PasswordValidator::new(&lenient());
        assert!(validator.validate("p@ss").is_ok());
        assert!(validator.validate("ab").is_err());
    }

    #[test]
    fn test_length_counts_characters() {
        let validator = PasswordValidator::new(&lenient());
        assert!(validator.validate("ééé").is_ok());
    }

    #[test]
    fn test_not_same() {
        let validator = PasswordValidator::new(&lenient());
        assert!(validator.validate_not_same("old", "old").is_err());
        assert!(validator.validate_not_same("old", "new").is_ok());
    }
}
