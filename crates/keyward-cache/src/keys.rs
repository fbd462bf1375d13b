//! Cache key builders for all Keyward cache entries.
//!
//! Centralising key construction prevents typos and makes it easy
//! to find every key the application uses.

use uuid::Uuid;

/// Prefix applied to all Keyward cache keys.
const PREFIX: &str = "keyward";

// ── Principal keys ─────────────────────────────────────────

/// Cache key for the resolved roles and claims of a user.
pub fn principal(user_id: Uuid) -> String {
    format!("{PREFIX}:principal:{user_id}")
}
