//! Repository implementations for all Keyward entities.

pub mod claim;
pub mod revocation;
pub mod role;
pub mod user;

pub use claim::ClaimRepository;
pub use revocation::RevocationRepository;
pub use role::RoleRepository;
pub use user::UserRepository;

use keyward_core::error::{AppError, ErrorKind};

/// PostgreSQL `unique_violation`.
const UNIQUE_VIOLATION: &str = "23505";

/// Maps a failed write, turning unique violations into conflicts.
pub(crate) fn map_write_error(e: sqlx::Error, conflict: &str, context: &str) -> AppError {
    let is_unique = e
        .as_database_error()
        .and_then(|db| db.code())
        .is_some_and(|code| code == UNIQUE_VIOLATION);

    if is_unique {
        AppError::with_source(ErrorKind::Conflict, conflict.to_string(), e)
    } else {
        AppError::with_source(ErrorKind::Database, context.to_string(), e)
    }
}
