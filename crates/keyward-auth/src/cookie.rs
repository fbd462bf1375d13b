//! Session cookie formatting and extraction.

use keyward_core::config::{SameSite, SessionConfig};

/// Session cookie attributes.
#[derive(Debug, Clone)]
pub struct SessionCookie {
    name: String,
    path: String,
    secure: bool,
    same_site: SameSite,
    max_age_seconds: u64,
}

impl SessionCookie {
    /// Builds cookie attributes from session configuration.
    pub fn new(config: &SessionConfig) -> Self {
        Self {
            name: config.cookie_name.clone(),
            path: config.cookie_path.clone(),
            secure: config.secure,
            same_site: config.same_site,
            max_age_seconds: config.ttl_hours * 3600,
        }
    }

    /// Cookie name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// `Set-Cookie` value carrying `token`.
    pub fn set_cookie(&self, token: &str) -> String {
        self.render(token, self.max_age_seconds)
    }

    /// `Set-Cookie` value that removes the session cookie.
    pub fn clear_cookie(&self) -> String {
        self.render("", 0)
    }

    /// Finds the session token in a `Cookie` request header.
    pub fn extract<'a>(&self, cookie_header: &'a str) -> Option<&'a str> {
        cookie_header
            .split(';')
            .filter_map(|pair| pair.trim().split_once('='))
            .find(|(name, _)| *name == self.name)
            .map(|(_, value)| value.trim_matches('"'))
            .filter(|value| !value.is_empty())
    }

    fn render(&self, value: &str, max_age: u64) -> String {
        let mut cookie = format!(
            "{}={}; Path={}; Max-Age={}; HttpOnly",
            self.name, value, self.path, max_age
        );
        if self.secure {
            cookie.push_str("; Secure");
        }
        cookie.push_str(&format!("; SameSite={}", self.same_site));
        cookie
    }
}
