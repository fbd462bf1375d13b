//! In-memory role and claim store.

use std::collections::BTreeSet;

use async_trait::async_trait;
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use uuid::Uuid;

use keyward_core::error::AppError;
use keyward_core::result::AppResult;
use keyward_entity::claim::Claim;
use keyward_entity::role::Role;

use super::store::RoleClaimStore;

/// Role and claim store held in process memory.
#[derive(Debug, Default)]
pub struct MemoryRoleClaimStore {
    roles: DashMap<String, Role>,
    assignments: DashMap<Uuid, BTreeSet<String>>,
    claims: DashMap<Uuid, BTreeSet<Claim>>,
}

impl MemoryRoleClaimStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl RoleClaimStore for MemoryRoleClaimStore {
    async fn roles_of(&self, user_id: Uuid) -> AppResult<Vec<Role>> {
        let names = self
            .assignments
            .get(&user_id)
            .map(|names| names.value().clone())
            .unwrap_or_default();

        Ok(names
            .iter()
            .filter_map(|name| self.roles.get(name).map(|role| role.value().clone()))
            .collect())
    }

    async fn claims_of(&self, user_id: Uuid) -> AppResult<Vec<Claim>> {
        Ok(self
            .claims
            .get(&user_id)
            .map(|claims| claims.iter().cloned().collect())
            .unwrap_or_default())
    }

    async fn list_roles(&self) -> AppResult<Vec<Role>> {
        let mut roles: Vec<Role> = self.roles.iter().map(|r| r.value().clone()).collect();
        roles.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(roles)
    }

    async fn create_role(&self, name: &str) -> AppResult<Role> {
        match self.roles.entry(name.to_string()) {
            Entry::Occupied(_) => Err(AppError::conflict(format!("Role '{name}' already exists"))),
            Entry::Vacant(slot) => Ok(slot.insert(Role::new(name)).value().clone()),
        }
    }

    async fn assign_role(&self, user_id: Uuid, role_name: &str) -> AppResult<()> {
        if !self.roles.contains_key(role_name) {
            return Err(AppError::not_found(format!("Role '{role_name}' not found")));
        }
        self.assignments
            .entry(user_id)
            .or_default()
            .insert(role_name.to_string());
        Ok(())
    }

    async fn revoke_role(&self, user_id: Uuid, role_name: &str) -> AppResult<bool> {
        Ok(self
            .assignments
            .get_mut(&user_id)
            .is_some_and(|mut names| names.remove(role_name)))
    }

    async fn add_claim(&self, user_id: Uuid, claim: &Claim) -> AppResult<()> {
        self.claims.entry(user_id).or_default().insert(claim.clone());
        Ok(())
    }

    async fn remove_claim(&self, user_id: Uuid, claim: &Claim) -> AppResult<bool> {
        Ok(self
            .claims
            .get_mut(&user_id)
            .is_some_and(|mut claims| claims.remove(claim)))
    }
}
