//! PostgreSQL-backed role and claim store.

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use keyward_core::error::AppError;
use keyward_core::result::AppResult;
use keyward_database::repositories::{ClaimRepository, RoleRepository};
use keyward_entity::claim::Claim;
use keyward_entity::role::Role;

use super::store::RoleClaimStore;

/// Role and claim store over the `roles`, `user_roles`, and `user_claims` tables.
#[derive(Debug, Clone)]
pub struct PgRoleClaimStore {
    roles: RoleRepository,
    claims: ClaimRepository,
}

impl PgRoleClaimStore {
    /// Creates the store from a connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self {
            roles: RoleRepository::new(pool.clone()),
            claims: ClaimRepository::new(pool),
        }
    }

    async fn require_role(&self, name: &str) -> AppResult<Role> {
        self.roles
            .find_by_name(name)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Role '{name}' not found")))
    }
}

#[async_trait]
impl RoleClaimStore for PgRoleClaimStore {
    async fn roles_of(&self, user_id: Uuid) -> AppResult<Vec<Role>> {
        self.roles.roles_of(user_id).await
    }

    async fn claims_of(&self, user_id: Uuid) -> AppResult<Vec<Claim>> {
        self.claims.claims_of(user_id).await
    }

    async fn list_roles(&self) -> AppResult<Vec<Role>> {
        self.roles.find_all().await
    }

    async fn create_role(&self, name: &str) -> AppResult<Role> {
        self.roles.create(name).await
    }

    async fn assign_role(&self, user_id: Uuid, role_name: &str) -> AppResult<()> {
        let role = self.require_role(role_name).await?;
        self.roles.assign(user_id, role.id).await
    }

    async fn revoke_role(&self, user_id: Uuid, role_name: &str) -> AppResult<bool> {
        match self.roles.find_by_name(role_name).await? {
            Some(role) => self.roles.revoke(user_id, role.id).await,
            None => Ok(false),
        }
    }

    async fn add_claim(&self, user_id: Uuid, claim: &Claim) -> AppResult<()> {
        self.claims.add(user_id, claim).await
    }

    async fn remove_claim(&self, user_id: Uuid, claim: &Claim) -> AppResult<bool> {
        self.claims.remove(user_id, claim).await
    }
}
