//! API key issuance and lookup.

use std::sync::Arc;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use bastion_core::{
    ApiKey, ApiKeyId, ApiKeyRepository, User, UserId, UserStore, API_KEY_DISPLAY_PREFIX_LEN,
    API_KEY_PREFIX,
};
use chrono::{DateTime, Utc};
use rand::rngs::OsRng;
use rand::RngCore;
use tracing::{debug, info};

use crate::cache::{ApiKeyCache, CacheStats};
use crate::config::ServiceConfig;
use crate::error::{ApiKeyError, ApiKeyResult};
use crate::hash::hash_raw;

const RANDOM_BYTES: usize = 32;

/// Issues, reads, updates and deletes API keys, and owns the lookup cache.
///
/// Build one per process and share it by reference.
pub struct ApiKeyService {
    repository: Arc<dyn ApiKeyRepository>,
    users: Arc<dyn UserStore>,
    cache: ApiKeyCache,
    config: ServiceConfig,
}

impl std::fmt::Debug for ApiKeyService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiKeyService")
            .field("config", &self.config)
            .field("cache", &self.cache.stats())
            .finish_non_exhaustive()
    }
}

impl ApiKeyService {
    /// Creates a service over the given collaborators.
    pub fn new(
        repository: Arc<dyn ApiKeyRepository>,
        users: Arc<dyn UserStore>,
        config: ServiceConfig,
    ) -> Self {
        Self {
            repository,
            users,
            cache: ApiKeyCache::new(config.cache_capacity),
            config,
        }
    }

    /// Digest of a raw key.
    pub fn hash_raw(&self, raw_key: &str) -> Vec<u8> {
        hash_raw(raw_key)
    }

    /// Issues a new key for `user`.
    ///
    /// Returns the raw key, which is never recoverable afterwards, and the
    /// persisted record.
    pub fn generate_api_key(
        &self,
        user: &User,
        description: &str,
    ) -> ApiKeyResult<(String, ApiKey)> {
        let raw_key = generate_raw_key();
        let mut key = ApiKey {
            id: ApiKeyId::default(),
            user_id: user.id,
            digest: hash_raw(&raw_key),
            prefix: display_prefix(&raw_key),
            description: description.to_string(),
            date_created: Utc::now(),
            last_used: None,
        };

        self.repository.create_api_key(&mut key)?;
        self.cache.insert(user.clone(), key.clone());
        info!(
            user_id = %user.id,
            api_key_id = %key.id,
            api_key_prefix = %key.prefix,
            "API key issued"
        );
        Ok((raw_key, key))
    }

    /// Reads one key.
    pub fn get_api_key(&self, id: ApiKeyId) -> ApiKeyResult<ApiKey> {
        Ok(self.repository.api_key(id)?)
    }

    /// All keys of a user.
    pub fn get_api_keys(&self, user_id: UserId) -> ApiKeyResult<Vec<ApiKey>> {
        Ok(self.repository.api_keys_by_user_id(user_id)?)
    }

    /// Resolves a digest to its owner and key, reading through the cache.
    pub fn get_digest_user_and_key(&self, digest: &[u8]) -> ApiKeyResult<(User, ApiKey)> {
        if let Some(found) = self.cache.get(digest) {
            return Ok(found);
        }

        let key = self.repository.api_key_by_digest(digest)?;
        let user = self.users.user(key.user_id).map_err(|err| {
            if err.is_not_found() {
                ApiKeyError::OwnerNotFound(key.user_id)
            } else {
                ApiKeyError::Store(err)
            }
        })?;

        self.cache.insert(user.clone(), key.clone());
        debug!(user_id = %user.id, api_key_prefix = %key.prefix, "API key cache populated");
        Ok((user, key))
    }

    /// Writes a key through to the repository and the cache.
    pub fn update_api_key(&self, key: &ApiKey) -> ApiKeyResult<()> {
        self.repository.update_api_key(key)?;
        self.cache.update(key);
        Ok(())
    }

    /// Deletes a key and evicts its digest.
    pub fn delete_api_key(&self, id: ApiKeyId) -> ApiKeyResult<()> {
        let key = self.repository.api_key(id)?;
        self.repository.delete_api_key(id)?;
        self.cache.remove(&key.digest);
        info!(user_id = %key.user_id, api_key_id = %id, "API key deleted");
        Ok(())
    }

    /// Deletes every key of a user, e.g. when the user is removed.
    pub fn delete_api_keys_for_user(&self, user_id: UserId) -> ApiKeyResult<usize> {
        let keys = self.repository.api_keys_by_user_id(user_id)?;
        for key in &keys {
            self.repository.delete_api_key(key.id)?;
            self.cache.remove(&key.digest);
        }
        Ok(keys.len())
    }

    /// Replaces the secret of a key. The old raw key stops working at once.
    pub fn rotate_api_key(&self, id: ApiKeyId) -> ApiKeyResult<(String, ApiKey)> {
        let mut key = self.repository.api_key(id)?;
        let old_digest = std::mem::take(&mut key.digest);

        let raw_key = generate_raw_key();
        key.digest = hash_raw(&raw_key);
        key.prefix = display_prefix(&raw_key);
        key.last_used = None;

        self.repository.update_api_key(&key)?;
        self.cache.remove(&old_digest);
        info!(user_id = %key.user_id, api_key_id = %id, "API key rotated");
        Ok((raw_key, key))
    }

    /// Evicts every cached entry of a user so the next lookup re-reads the
    /// owner. Call after role or authorization changes.
    pub fn invalidate_user_key_cache(&self, user_id: UserId) -> usize {
        self.cache.invalidate_user(user_id)
    }

    /// Records use of a key, persisting at most once per refresh interval.
    ///
    /// `key` is the record authentication looked up, possibly from the
    /// cache. The stored record is re-read and only its `last_used` is
    /// written; nothing is written when the key was deleted or its secret
    /// changed since the lookup.
    ///
    /// Returns whether the record was written.
    pub fn refresh_last_used(&self, key: &ApiKey, now: DateTime<Utc>) -> ApiKeyResult<bool> {
        if !self.last_used_due(key, now) {
            return Ok(false);
        }

        let mut stored = match self.repository.api_key(key.id) {
            Ok(stored) => stored,
            Err(err) if err.is_not_found() => return Ok(false),
            Err(err) => return Err(err.into()),
        };
        if stored.digest != key.digest {
            debug!(api_key_id = %key.id, "API key secret changed since lookup, last use not recorded");
            return Ok(false);
        }
        if !self.last_used_due(&stored, now) {
            return Ok(false);
        }

        stored.last_used = Some(now);
        self.repository.update_api_key(&stored)?;
        self.cache.update(&stored);
        Ok(true)
    }

    fn last_used_due(&self, key: &ApiKey, now: DateTime<Utc>) -> bool {
        let interval = chrono::Duration::from_std(self.config.last_used_refresh)
            .unwrap_or(chrono::Duration::MAX);
        key.last_used
            .map_or(true, |last| now.signed_duration_since(last) >= interval)
    }

    /// Lookup cache statistics.
    pub fn cache_stats(&self) -> CacheStats {
        self.cache.stats()
    }

    /// Whether a digest is currently cached.
    pub fn is_cached(&self, digest: &[u8]) -> bool {
        self.cache.contains(digest)
    }
}

fn generate_raw_key() -> String {
    let mut bytes = [0u8; RANDOM_BYTES];
    OsRng.fill_bytes(&mut bytes);
    format!("{API_KEY_PREFIX}{}", STANDARD.encode(bytes))
}

fn display_prefix(raw_key: &str) -> String {
    raw_key.chars().take(API_KEY_DISPLAY_PREFIX_LEN).collect()
}
