//! In-memory collaborators and sample data for tests.
//!
//! # Example
//!
//! ```
//! use bastion_core::fixtures::{self, MemoryStore};
//! use bastion_core::{UserId, UserStore};
//!
//! let store = MemoryStore::new();
//! store.insert_user(fixtures::admin_user(1));
//! assert!(store.user(UserId(1)).is_ok());
//! ```

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};

use parking_lot::RwLock;

use crate::apikey::ApiKey;
use crate::authorization::Authorization;
use crate::identity::{
    ApiKeyId, EndpointGroupId, MembershipId, MembershipRole, Role, TeamId, TeamMembership, User,
    UserId,
};
use crate::resource::{AccessPolicy, Endpoint, EndpointGroup, EndpointType};
use crate::store::{
    ApiKeyRepository, EndpointGroupStore, LicenseInfo, LicenseService, StoreError, StoreResult,
    TeamMembershipStore, UserStore,
};

/// Thread-safe in-memory implementation of every store trait.
///
/// [`MemoryStore::set_unavailable`] makes every read fail with
/// [`StoreError::Unavailable`], for exercising 500 paths.
#[derive(Debug, Default)]
pub struct MemoryStore {
    users: RwLock<HashMap<UserId, User>>,
    memberships: RwLock<Vec<TeamMembership>>,
    endpoint_groups: RwLock<HashMap<EndpointGroupId, EndpointGroup>>,
    api_keys: RwLock<HashMap<ApiKeyId, ApiKey>>,
    next_api_key_id: AtomicU32,
    unavailable: AtomicBool,
    memberships_unavailable: AtomicBool,
}

impl MemoryStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or replaces a user.
    pub fn insert_user(&self, user: User) {
        self.users.write().insert(user.id, user);
    }

    /// Removes a user.
    pub fn remove_user(&self, id: UserId) {
        self.users.write().remove(&id);
    }

    /// Adds a team membership.
    pub fn insert_membership(&self, membership: TeamMembership) {
        self.memberships.write().push(membership);
    }

    /// Inserts or replaces an environment group.
    pub fn insert_endpoint_group(&self, group: EndpointGroup) {
        self.endpoint_groups.write().insert(group.id, group);
    }

    /// Makes every read fail.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    /// Makes only membership reads fail.
    pub fn set_memberships_unavailable(&self, unavailable: bool) {
        self.memberships_unavailable
            .store(unavailable, Ordering::SeqCst);
    }

    /// Number of stored API keys.
    pub fn api_key_count(&self) -> usize {
        self.api_keys.read().len()
    }

    fn check_available(&self) -> StoreResult<()> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(StoreError::unavailable("memory store marked unavailable"));
        }
        Ok(())
    }
}

impl UserStore for MemoryStore {
    fn user(&self, id: UserId) -> StoreResult<User> {
        self.check_available()?;
        self.users
            .read()
            .get(&id)
            .cloned()
            .ok_or_else(|| StoreError::not_found(format!("user {id}")))
    }
}

impl EndpointGroupStore for MemoryStore {
    fn endpoint_group(&self, id: EndpointGroupId) -> StoreResult<EndpointGroup> {
        self.check_available()?;
        self.endpoint_groups
            .read()
            .get(&id)
            .cloned()
            .ok_or_else(|| StoreError::not_found(format!("endpoint group {id}")))
    }
}

impl TeamMembershipStore for MemoryStore {
    fn memberships_by_user_id(&self, user_id: UserId) -> StoreResult<Vec<TeamMembership>> {
        self.check_available()?;
        if self.memberships_unavailable.load(Ordering::SeqCst) {
            return Err(StoreError::unavailable("memberships marked unavailable"));
        }
        Ok(self
            .memberships
            .read()
            .iter()
            .filter(|m| m.user_id == user_id)
            .cloned()
            .collect())
    }
}

impl ApiKeyRepository for MemoryStore {
    fn create_api_key(&self, key: &mut ApiKey) -> StoreResult<()> {
        self.check_available()?;
        let id = ApiKeyId(self.next_api_key_id.fetch_add(1, Ordering::SeqCst) + 1);
        key.id = id;
        self.api_keys.write().insert(id, key.clone());
        Ok(())
    }

    fn api_key(&self, id: ApiKeyId) -> StoreResult<ApiKey> {
        self.check_available()?;
        self.api_keys
            .read()
            .get(&id)
            .cloned()
            .ok_or_else(|| StoreError::not_found(format!("api key {id}")))
    }

    fn update_api_key(&self, key: &ApiKey) -> StoreResult<()> {
        self.check_available()?;
        let mut keys = self.api_keys.write();
        match keys.get_mut(&key.id) {
            Some(existing) => {
                *existing = key.clone();
                Ok(())
            }
            None => Err(StoreError::not_found(format!("api key {}", key.id))),
        }
    }

    fn delete_api_key(&self, id: ApiKeyId) -> StoreResult<()> {
        self.check_available()?;
        self.api_keys
            .write()
            .remove(&id)
            .map(|_| ())
            .ok_or_else(|| StoreError::not_found(format!("api key {id}")))
    }

    fn api_key_by_digest(&self, digest: &[u8]) -> StoreResult<ApiKey> {
        self.check_available()?;
        self.api_keys
            .read()
            .values()
            .find(|k| k.digest == digest)
            .cloned()
            .ok_or_else(|| StoreError::not_found("api key for digest"))
    }

    fn api_keys_by_user_id(&self, user_id: UserId) -> StoreResult<Vec<ApiKey>> {
        self.check_available()?;
        let mut keys: Vec<ApiKey> = self
            .api_keys
            .read()
            .values()
            .filter(|k| k.user_id == user_id)
            .cloned()
            .collect();
        keys.sort_by_key(|k| k.id);
        Ok(keys)
    }
}

/// License provider returning a fixed, switchable answer.
#[derive(Debug)]
pub struct StaticLicense {
    valid: AtomicBool,
    unavailable: AtomicBool,
}

impl StaticLicense {
    /// A license with the given validity.
    #[must_use]
    pub const fn new(valid: bool) -> Self {
        Self {
            valid: AtomicBool::new(valid),
            unavailable: AtomicBool::new(false),
        }
    }

    /// A valid license.
    #[must_use]
    pub const fn valid() -> Self {
        Self::new(true)
    }

    /// An invalid license.
    #[must_use]
    pub const fn invalid() -> Self {
        Self::new(false)
    }

    /// Flips validity at runtime.
    pub fn set_valid(&self, valid: bool) {
        self.valid.store(valid, Ordering::SeqCst);
    }

    /// Makes `info()` fail.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }
}

impl LicenseService for StaticLicense {
    fn info(&self) -> StoreResult<LicenseInfo> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(StoreError::unavailable("license service unreachable"));
        }
        Ok(LicenseInfo {
            valid: self.valid.load(Ordering::SeqCst),
        })
    }
}

/// An administrator.
#[must_use]
pub fn admin_user(id: u32) -> User {
    User::new(id, format!("admin{id}"), Role::Administrator)
}

/// A standard user holding the given native API authorizations.
pub fn standard_user(id: u32, authorizations: impl IntoIterator<Item = Authorization>) -> User {
    User::new(id, format!("user{id}"), Role::Standard).with_portainer_authorizations(authorizations)
}

/// A membership of `user_id` in `team_id`.
#[must_use]
pub fn membership(user_id: u32, team_id: u32, role: MembershipRole) -> TeamMembership {
    TeamMembership {
        id: MembershipId(user_id * 1000 + team_id),
        user_id: UserId(user_id),
        team_id: TeamId(team_id),
        role,
    }
}

/// A Docker environment in group 1 with no policies.
#[must_use]
pub fn docker_endpoint(id: u32) -> Endpoint {
    Endpoint::new(id, format!("docker-{id}"), EndpointGroupId(1), EndpointType::Docker)
}

/// An edge environment registered with `edge_id`.
#[must_use]
pub fn edge_endpoint(id: u32, edge_id: &str) -> Endpoint {
    let mut endpoint = Endpoint::new(id, format!("edge-{id}"), EndpointGroupId(1), EndpointType::EdgeAgentOnDocker);
    endpoint.edge_id = Some(edge_id.to_string());
    endpoint
}

/// The unassigned environment group (id 1) with no policies.
#[must_use]
pub fn unassigned_group() -> EndpointGroup {
    EndpointGroup::new(EndpointGroupId(1), "Unassigned")
}

/// A policy entry with no role.
#[must_use]
pub fn any_policy() -> AccessPolicy {
    AccessPolicy::default()
}
