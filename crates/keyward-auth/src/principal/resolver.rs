//! Cached principal resolution.

use std::sync::Arc;
use std::time::Duration;

use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};
use uuid::Uuid;

use keyward_cache::CacheManager;
use keyward_cache::keys;
use keyward_core::result::AppResult;
use keyward_core::traits::cache::CacheProvider;
use keyward_entity::claim::Claim;
use keyward_entity::principal::Principal;
use keyward_entity::role::Role;

use super::store::RoleClaimStore;

/// A cached principal tagged with the user's generation at load time.
#[derive(Debug, Serialize, Deserialize)]
struct CachedPrincipal {
    generation: u64,
    principal: Principal,
}

/// Loads a user's roles and claims, caching the result.
///
/// Every mutation routed through the resolver bumps a per-user generation
/// after the store write. A cached principal is served only while its
/// generation is current, so a load that raced a mutation is never served
/// afterwards, even if it lands in the cache after the invalidation.
#[derive(Debug)]
pub struct PrincipalResolver {
    store: Arc<dyn RoleClaimStore>,
    cache: Arc<CacheManager>,
    ttl: Duration,
    generations: DashMap<Uuid, u64>,
}

impl PrincipalResolver {
    /// Creates a resolver. `ttl` bounds how long a cached principal may live.
    pub fn new(store: Arc<dyn RoleClaimStore>, cache: Arc<CacheManager>, ttl: Duration) -> Self {
        Self {
            store,
            cache,
            ttl,
            generations: DashMap::new(),
        }
    }

    fn generation(&self, user_id: Uuid) -> u64 {
        self.generations.get(&user_id).map_or(0, |g| *g.value())
    }

    /// Roles and claims of `user_id`.
    pub async fn resolve(&self, user_id: Uuid) -> AppResult<Principal> {
        let key = keys::principal(user_id);
        // Read before the store so a concurrent mutation leaves this load stale.
        let generation = self.generation(user_id);

        match self.cache.get_json::<CachedPrincipal>(&key).await {
            Ok(Some(cached)) if cached.generation == generation => {
                debug!(user_id = %user_id, "Principal cache hit");
                return Ok(cached.principal);
            }
            Ok(_) => {}
            Err(e) => warn!(user_id = %user_id, error = %e, "Principal cache read failed"),
        }

        let roles = self.store.roles_of(user_id).await?;
        let claims = self.store.claims_of(user_id).await?;
        let principal = Principal {
            user_id,
            roles: roles.into_iter().map(|role| role.name).collect(),
            claims: claims.into_iter().collect(),
        };

        let cached = CachedPrincipal {
            generation,
            principal,
        };
        if let Err(e) = self.cache.set_json(&key, &cached, self.ttl).await {
            warn!(user_id = %user_id, error = %e, "Principal cache write failed");
        }

        Ok(cached.principal)
    }

    /// Marks every cached principal of `user_id` stale and drops it.
    pub async fn invalidate(&self, user_id: Uuid) -> AppResult<()> {
        *self.generations.entry(user_id).or_insert(0) += 1;
        self.cache.delete(&keys::principal(user_id)).await
    }

    /// Every defined role.
    pub async fn list_roles(&self) -> AppResult<Vec<Role>> {
        self.store.list_roles().await
    }

    /// Define a new role.
    pub async fn create_role(&self, name: &str) -> AppResult<Role> {
        let role = self.store.create_role(name).await?;
        info!(role = %role.name, "Role created");
        Ok(role)
    }

    /// Assign a role to a user.
    pub async fn assign_role(&self, user_id: Uuid, role_name: &str) -> AppResult<()> {
        self.store.assign_role(user_id, role_name).await?;
        self.invalidate(user_id).await?;
        info!(user_id = %user_id, role = role_name, "Role assigned");
        Ok(())
    }

    /// Remove a role from a user.
    pub async fn revoke_role(&self, user_id: Uuid, role_name: &str) -> AppResult<bool> {
        let removed = self.store.revoke_role(user_id, role_name).await?;
        self.invalidate(user_id).await?;
        info!(user_id = %user_id, role = role_name, removed, "Role revoked");
        Ok(removed)
    }

    /// Attach a claim to a user.
    pub async fn add_claim(&self, user_id: Uuid, claim: &Claim) -> AppResult<()> {
        self.store.add_claim(user_id, claim).await?;
        self.invalidate(user_id).await?;
        info!(user_id = %user_id, claim = %claim, "Claim added");
        Ok(())
    }

    /// Detach a claim from a user.
    pub async fn remove_claim(&self, user_id: Uuid, claim: &Claim) -> AppResult<bool> {
        let removed = self.store.remove_claim(user_id, claim).await?;
        self.invalidate(user_id).await?;
        info!(user_id = %user_id, claim = %claim, removed, "Claim removed");
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicBool, Ordering};

    use async_trait::async_trait;
    use keyward_core::config::CacheConfig;
    use tokio::sync::Notify;

    use super::*;
    use crate::principal::MemoryRoleClaimStore;

    fn resolver() -> (PrincipalResolver, Arc<MemoryRoleClaimStore>) {
        let store = Arc::new(MemoryRoleClaimStore::new());
        let cache = Arc::new(CacheManager::new(&CacheConfig::default()).unwrap());
        let resolver = PrincipalResolver::new(store.clone(), cache, Duration::from_secs(60));
        (resolver, store)
    }

    #[tokio::test]
    async fn test_resolve_collects_roles_and_claims() {
        let (resolver, _) = resolver();
        let user = Uuid::new_v4();
        resolver.create_role("Member").await.unwrap();
        resolver.assign_role(user, "Member").await.unwrap();
        resolver
            .add_claim(user, &Claim::new("Department", "Tech"))
            .await
            .unwrap();

        let principal = resolver.resolve(user).await.unwrap();
        assert!(principal.has_role("Member"));
        assert!(principal.has_claim("Department", "Tech"));
    }

    #[tokio::test]
    async fn test_mutation_through_resolver_invalidates() {
        let (resolver, _) = resolver();
        let user = Uuid::new_v4();
        resolver.create_role("Member").await.unwrap();
        resolver.assign_role(user, "Member").await.unwrap();
        assert!(resolver.resolve(user).await.unwrap().has_role("Member"));

        resolver.revoke_role(user, "Member").await.unwrap();
        assert!(!resolver.resolve(user).await.unwrap().has_role("Member"));
    }

    /// Store whose next `roles_of` parks after reading until released.
    #[derive(Debug, Default)]
    struct GatedStore {
        inner: MemoryRoleClaimStore,
        armed: AtomicBool,
        read_done: Notify,
        release: Notify,
    }

    #[async_trait]
    impl RoleClaimStore for GatedStore {
        async fn roles_of(&self, user_id: Uuid) -> AppResult<Vec<Role>> {
            let roles = self.inner.roles_of(user_id).await?;
            if self.armed.swap(false, Ordering::SeqCst) {
                self.read_done.notify_one();
                self.release.notified().await;
            }
            Ok(roles)
        }

        async fn claims_of(&self, user_id: Uuid) -> AppResult<Vec<Claim>> {
            self.inner.claims_of(user_id).await
        }

        async fn list_roles(&self) -> AppResult<Vec<Role>> {
            self.inner.list_roles().await
        }

        async fn create_role(&self, name: &str) -> AppResult<Role> {
            self.inner.create_role(name).await
        }

        async fn assign_role(&self, user_id: Uuid, role_name: &str) -> AppResult<()> {
            self.inner.assign_role(user_id, role_name).await
        }

        async fn revoke_role(&self, user_id: Uuid, role_name: &str) -> AppResult<bool> {
            self.inner.revoke_role(user_id, role_name).await
        }

        async fn add_claim(&self, user_id: Uuid, claim: &Claim) -> AppResult<()> {
            self.inner.add_claim(user_id, claim).await
        }

        async fn remove_claim(&self, user_id: Uuid, claim: &Claim) -> AppResult<bool> {
            self.inner.remove_claim(user_id, claim).await
        }
    }

    #[tokio::test]
    async fn test_revocation_during_slow_load_is_not_served() {
        let store = Arc::new(GatedStore::default());
        let cache = Arc::new(CacheManager::new(&CacheConfig::default()).unwrap());
        let resolver = Arc::new(PrincipalResolver::new(
            store.clone(),
            cache,
            Duration::from_secs(60),
        ));
        let user = Uuid::new_v4();
        resolver.create_role("Member").await.unwrap();
        resolver.assign_role(user, "Member").await.unwrap();

        store.armed.store(true, Ordering::SeqCst);
        let reader = tokio::spawn({
            let resolver = Arc::clone(&resolver);
            async move { resolver.resolve(user).await.unwrap() }
        });

        store.read_done.notified().await;
        resolver.revoke_role(user, "Member").await.unwrap();
        store.release.notify_one();

        // The racing load saw the old roles and cached them.
        assert!(reader.await.unwrap().has_role("Member"));
        assert!(!resolver.resolve(user).await.unwrap().has_role("Member"));
    }

    #[tokio::test]
    async fn test_direct_store_write_needs_invalidate() {
        let (resolver, store) = resolver();
        let user = Uuid::new_v4();
        assert!(resolver.resolve(user).await.unwrap().claims.is_empty());

        store
            .add_claim(user, &Claim::new("Department", "Tech"))
            .await
            .unwrap();
        assert!(resolver.resolve(user).await.unwrap().claims.is_empty());

        resolver.invalidate(user).await.unwrap();
        assert!(
            resolver
                .resolve(user)
                .await
                .unwrap()
                .has_claim("department", "Tech")
        );
    }
}
