//! Checks that the shipped configuration loads and matches the built-in defaults.

use keyward_auth::policy::PolicyRegistry;
use keyward_core::config::{AppConfig, SameSite};

fn shipped() -> AppConfig {
    AppConfig::from_toml(include_str!("../config/default.toml"))
        .expect("Failed to parse config/default.toml")
}

#[test]
fn test_shipped_config_matches_defaults() {
    let shipped = shipped();
    let defaults = AppConfig::default();

    assert_eq!(shipped.session.ttl_hours, defaults.session.ttl_hours);
    assert_eq!(shipped.session.cookie_name, defaults.session.cookie_name);
    assert_eq!(shipped.session.same_site, SameSite::Lax);
    assert_eq!(shipped.session.login_path, "/Identity/Signin");
    assert_eq!(
        shipped.auth.lockout.max_failed_attempts,
        defaults.auth.lockout.max_failed_attempts
    );
    assert_eq!(
        shipped.auth.password.required_length,
        defaults.auth.password.required_length
    );
    assert!(shipped.auth.require_confirmed_email);
}

#[test]
fn test_shipped_policies_load() {
    let registry = PolicyRegistry::from_config(&shipped().authorization).unwrap();
    assert_eq!(registry.len(), 2);

    let admin = registry.get("AdminDep").unwrap();
    assert_eq!(admin.required_roles, vec!["Admin".to_string()]);
    assert_eq!(admin.required_claims[0].claim_type, "Department");
    assert_eq!(admin.required_claims[0].value, "Tech");
}
