//! Role and claim store abstraction.

use async_trait::async_trait;
use uuid::Uuid;

use keyward_core::result::AppResult;
use keyward_entity::claim::Claim;
use keyward_entity::role::Role;

/// Persistence for roles, role assignments, and user claims.
///
/// Role names are compared exactly. Assignment and claim writes are
/// idempotent.
#[async_trait]
pub trait RoleClaimStore: Send + Sync + std::fmt::Debug + 'static {
    /// Roles assigned to a user.
    async fn roles_of(&self, user_id: Uuid) -> AppResult<Vec<Role>>;

    /// Claims held by a user.
    async fn claims_of(&self, user_id: Uuid) -> AppResult<Vec<Claim>>;

    /// Every defined role.
    async fn list_roles(&self) -> AppResult<Vec<Role>>;

    /// Define a new role. Fails with a conflict when the name exists.
    async fn create_role(&self, name: &str) -> AppResult<Role>;

    /// Assign an existing role. Fails with not-found for an undefined role.
    async fn assign_role(&self, user_id: Uuid, role_name: &str) -> AppResult<()>;

    /// Remove a role assignment. Returns whether one was removed.
    async fn revoke_role(&self, user_id: Uuid, role_name: &str) -> AppResult<bool>;

    /// Attach a claim.
    async fn add_claim(&self, user_id: Uuid, claim: &Claim) -> AppResult<()>;

    /// Detach a claim. Returns whether one was removed.
    async fn remove_claim(&self, user_id: Uuid, claim: &Claim) -> AppResult<bool>;
}
