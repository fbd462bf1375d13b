//! Role and role-assignment repository.

use sqlx::PgPool;
use uuid::Uuid;

use keyward_core::error::{AppError, ErrorKind};
use keyward_core::result::AppResult;
use keyward_entity::role::Role;

use super::map_write_error;

/// Repository for roles and the `user_roles` relation.
#[derive(Debug, Clone)]
pub struct RoleRepository {
    pool: PgPool,
}

impl RoleRepository {
    /// Create a new role repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Find a role by its unique name.
    pub async fn find_by_name(&self, name: &str) -> AppResult<Option<Role>> {
        sqlx::query_as::<_, Role>("SELECT id, name FROM roles WHERE name = $1")
            .bind(name)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find role", e))
    }

    /// List every role.
    pub async fn find_all(&self) -> AppResult<Vec<Role>> {
        sqlx::query_as::<_, Role>("SELECT id, name FROM roles ORDER BY name")
            .fetch_all(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to list roles", e))
    }

    /// Insert a new role.
    pub async fn create(&self, name: &str) -> AppResult<Role> {
        let role = Role::new(name);
        sqlx::query("INSERT INTO roles (id, name) VALUES ($1, $2)")
            .bind(role.id)
            .bind(&role.name)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                map_write_error(e, &format!("Role '{name}' already exists"), "Failed to create role")
            })?;
        Ok(role)
    }

    /// Roles currently assigned to a user.
    pub async fn roles_of(&self, user_id: Uuid) -> AppResult<Vec<Role>> {
        sqlx::query_as::<_, Role>(
            "SELECT r.id, r.name FROM roles r \
             JOIN user_roles ur ON ur.role_id = r.id \
             WHERE ur.user_id = $1 ORDER BY r.name",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to load user roles", e))
    }

    /// Assign a role to a user. Idempotent.
    pub async fn assign(&self, user_id: Uuid, role_id: Uuid) -> AppResult<()> {
        sqlx::query(
            "INSERT INTO user_roles (user_id, role_id) VALUES ($1, $2) ON CONFLICT DO NOTHING",
        )
        .bind(user_id)
        .bind(role_id)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to assign role", e))?;
        Ok(())
    }

    /// Remove a role from a user. Returns `true` if an assignment was removed.
    pub async fn revoke(&self, user_id: Uuid, role_id: Uuid) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM user_roles WHERE user_id = $1 AND role_id = $2")
            .bind(user_id)
            .bind(role_id)
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to revoke role", e))?;
        Ok(result.rows_affected() > 0)
    }
}
