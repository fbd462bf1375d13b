//! Session token and cookie configuration.

use serde::{Deserialize, Serialize};

/// Session token and cookie configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Secret key for session token signing (HMAC-SHA256).
    #[serde(default = "default_secret")]
    pub secret: String,
    /// Session validity window in hours.
    #[serde(default = "default_ttl_hours")]
    pub ttl_hours: u64,
    /// Consult the revocation denylist during validation.
    #[serde(default = "default_true")]
    pub denylist_enabled: bool,
    /// Name of the cookie carrying the session token.
    #[serde(default = "default_cookie_name")]
    pub cookie_name: String,
    /// Cookie `Path` attribute.
    #[serde(default = "default_cookie_path")]
    pub cookie_path: String,
    /// Emit the `Secure` cookie attribute.
    #[serde(default = "default_true")]
    pub secure: bool,
    /// Cookie `SameSite` attribute.
    #[serde(default)]
    pub same_site: SameSite,
    /// Where unauthenticated clients are sent to sign in.
    #[serde(default = "default_login_path")]
    pub login_path: String,
    /// Where authenticated but unauthorized clients are sent.
    #[serde(default = "default_access_denied_path")]
    pub access_denied_path: String,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            secret: default_secret(),
            ttl_hours: default_ttl_hours(),
            denylist_enabled: true,
            cookie_name: default_cookie_name(),
            cookie_path: default_cookie_path(),
            secure: true,
            same_site: SameSite::default(),
            login_path: default_login_path(),
            access_denied_path: default_access_denied_path(),
        }
    }
}

/// Cookie `SameSite` attribute values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SameSite {
    /// Never sent on cross-site requests.
    Strict,
    /// Sent on top-level cross-site navigations.
    #[default]
    Lax,
    /// Always sent (requires `Secure`).
    None,
}

impl std::fmt::Display for SameSite {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SameSite::Strict => write!(f, "Strict"),
            SameSite::Lax => write!(f, "Lax"),
            SameSite::None => write!(f, "None"),
        }
    }
}

fn default_secret() -> String {
    "CHANGE_ME_IN_PRODUCTION".to_string()
}

fn default_ttl_hours() -> u64 {
    10
}

fn default_true() -> bool {
    true
}

fn default_cookie_name() -> String {
    ".Keyward.Session".to_string()
}

fn default_cookie_path() -> String {
    "/".to_string()
}

fn default_login_path() -> String {
    "/Identity/Signin".to_string()
}

fn default_access_denied_path() -> String {
    "/Identity/AccessDenied".to_string()
}
