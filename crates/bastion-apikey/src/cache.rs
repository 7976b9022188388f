//! In-memory digest lookup cache.
//!
//! Every request authenticated with an API key goes through [`ApiKeyCache::get`],
//! so reads take a shared lock and writes are rare (issuance, update,
//! deletion, invalidation).

use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicU64, Ordering};

use bastion_core::{ApiKey, User, UserId};
use parking_lot::RwLock;

#[derive(Debug, Clone)]
struct CacheEntry {
    user: User,
    key: ApiKey,
    sequence: u64,
}

/// Entries plus their insertion order, guarded by one lock.
#[derive(Debug, Default)]
struct Entries {
    by_digest: HashMap<Vec<u8>, CacheEntry>,
    by_sequence: BTreeMap<u64, Vec<u8>>,
    next_sequence: u64,
}

impl Entries {
    fn remove(&mut self, digest: &[u8]) -> Option<CacheEntry> {
        let entry = self.by_digest.remove(digest)?;
        self.by_sequence.remove(&entry.sequence);
        Some(entry)
    }

    fn pop_oldest(&mut self) -> bool {
        match self.by_sequence.pop_first() {
            Some((_, digest)) => self.by_digest.remove(&digest).is_some(),
            None => false,
        }
    }
}

/// Cache statistics.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    /// Number of cache hits.
    pub hits: u64,
    /// Number of cache misses.
    pub misses: u64,
    /// Number of entries currently cached.
    pub size: usize,
    /// Number of evictions due to capacity.
    pub evictions: u64,
}

/// Digest to (owner, key) cache with explicit invalidation.
///
/// At capacity the least recently inserted entry is evicted.
#[derive(Debug)]
pub struct ApiKeyCache {
    capacity: usize,
    entries: RwLock<Entries>,
    hits: AtomicU64,
    misses: AtomicU64,
    evictions: AtomicU64,
}

impl ApiKeyCache {
    /// Creates a cache holding at most `capacity` entries. `0` disables it.
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            entries: RwLock::new(Entries::default()),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
            evictions: AtomicU64::new(0),
        }
    }

    /// Looks up a digest.
    pub fn get(&self, digest: &[u8]) -> Option<(User, ApiKey)> {
        let found = self
            .entries
            .read()
            .by_digest
            .get(digest)
            .map(|entry| (entry.user.clone(), entry.key.clone()));

        let counter = if found.is_some() { &self.hits } else { &self.misses };
        counter.fetch_add(1, Ordering::Relaxed);
        bastion_telemetry::record_api_key_cache(found.is_some());
        found
    }

    /// Caches the owner and key under the key's digest.
    pub fn insert(&self, user: User, key: ApiKey) {
        if self.capacity == 0 {
            return;
        }

        let mut entries = self.entries.write();
        entries.remove(&key.digest);
        while entries.by_digest.len() >= self.capacity && entries.pop_oldest() {
            self.evictions.fetch_add(1, Ordering::Relaxed);
        }

        let sequence = entries.next_sequence;
        entries.next_sequence += 1;
        entries.by_sequence.insert(sequence, key.digest.clone());
        entries.by_digest.insert(
            key.digest.clone(),
            CacheEntry {
                user,
                key,
                sequence,
            },
        );
    }

    /// Replaces the cached key metadata, keeping the cached owner.
    ///
    /// Does nothing when the digest is not cached.
    pub fn update(&self, key: &ApiKey) {
        if let Some(entry) = self.entries.write().by_digest.get_mut(&key.digest) {
            entry.key = key.clone();
        }
    }

    /// Evicts one digest. Returns whether it was cached.
    pub fn remove(&self, digest: &[u8]) -> bool {
        self.entries.write().remove(digest).is_some()
    }

    /// Evicts every entry owned by `user_id`. Returns how many were evicted.
    pub fn invalidate_user(&self, user_id: UserId) -> usize {
        let mut entries = self.entries.write();
        let owned: Vec<Vec<u8>> = entries
            .by_digest
            .iter()
            .filter(|(_, entry)| entry.user.id == user_id)
            .map(|(digest, _)| digest.clone())
            .collect();
        for digest in &owned {
            entries.remove(digest);
        }
        owned.len()
    }

    /// Whether a digest is cached. Does not count as a lookup.
    pub fn contains(&self, digest: &[u8]) -> bool {
        self.entries.read().by_digest.contains_key(digest)
    }

    /// Clears all cached entries.
    pub fn clear(&self) {
        let mut entries = self.entries.write();
        entries.by_digest.clear();
        entries.by_sequence.clear();
    }

    /// Cache statistics.
    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            size: self.entries.read().by_digest.len(),
            evictions: self.evictions.load(Ordering::Relaxed),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bastion_core::{fixtures, ApiKeyId};
    use chrono::Utc;

    fn key(id: u32, user: u32) -> ApiKey {
        ApiKey {
            id: ApiKeyId(id),
            user_id: UserId(user),
            digest: vec![id as u8; 32],
            prefix: "ptr_abc".into(),
            description: format!("key {id}"),
            date_created: Utc::now(),
            last_used: None,
        }
    }

    #[test]
    fn test_hit_and_miss() {
        let cache = ApiKeyCache::new(8);
        cache.insert(fixtures::standard_user(1, []), key(1, 1));

        let (user, k) = cache.get(&[1; 32]).unwrap();
        assert_eq!(user.id, UserId(1));
        assert_eq!(k.id, ApiKeyId(1));
        assert!(cache.get(&[2; 32]).is_none());

        let stats = cache.stats();
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.misses, 1);
        assert_eq!(stats.size, 1);
    }

    #[test]
    fn test_capacity_evicts_oldest() {
        let cache = ApiKeyCache::new(2);
        cache.insert(fixtures::standard_user(1, []), key(1, 1));
        cache.insert(fixtures::standard_user(1, []), key(2, 1));
        cache.insert(fixtures::standard_user(1, []), key(3, 1));

        assert!(!cache.contains(&[1; 32]));
        assert!(cache.contains(&[2; 32]));
        assert!(cache.contains(&[3; 32]));
        assert_eq!(cache.stats().evictions, 1);
    }

    #[test]
    fn test_reinsert_at_capacity_does_not_evict() {
        let cache = ApiKeyCache::new(1);
        cache.insert(fixtures::standard_user(1, []), key(1, 1));
        cache.insert(fixtures::standard_user(1, []), key(1, 1));
        assert_eq!(cache.stats().evictions, 0);
        assert_eq!(cache.stats().size, 1);
    }

    #[test]
    fn test_disabled_cache_stores_nothing() {
        let cache = ApiKeyCache::new(0);
        cache.insert(fixtures::standard_user(1, []), key(1, 1));
        assert!(cache.get(&[1; 32]).is_none());
    }

    #[test]
    fn test_update_keeps_owner() {
        let cache = ApiKeyCache::new(4);
        cache.insert(fixtures::standard_user(1, []), key(1, 1));

        let mut updated = key(1, 1);
        updated.description = "renamed".into();
        cache.update(&updated);

        let (user, k) = cache.get(&[1; 32]).unwrap();
        assert_eq!(user.id, UserId(1));
        assert_eq!(k.description, "renamed");
    }

    #[test]
    fn test_invalidate_user() {
        let cache = ApiKeyCache::new(8);
        cache.insert(fixtures::standard_user(1, []), key(1, 1));
        cache.insert(fixtures::standard_user(1, []), key(2, 1));
        cache.insert(fixtures::standard_user(2, []), key(3, 2));

        assert_eq!(cache.invalidate_user(UserId(1)), 2);
        assert!(!cache.contains(&[1; 32]));
        assert!(cache.contains(&[3; 32]));
    }

    #[test]
    fn test_concurrent_readers() {
        let cache = ApiKeyCache::new(8);
        cache.insert(fixtures::standard_user(1, []), key(1, 1));

        std::thread::scope(|scope| {
            for _ in 0..8 {
                scope.spawn(|| {
                    for _ in 0..100 {
                        assert!(cache.get(&[1; 32]).is_some());
                    }
                });
            }
        });
        assert_eq!(cache.stats().hits, 800);
    }

    #[test]
    fn test_reinsert_refreshes_eviction_order() {
        let cache = ApiKeyCache::new(2);
        cache.insert(fixtures::standard_user(1, []), key(1, 1));
        cache.insert(fixtures::standard_user(1, []), key(2, 1));
        cache.insert(fixtures::standard_user(1, []), key(1, 1));
        cache.insert(fixtures::standard_user(1, []), key(3, 1));

        assert!(cache.contains(&[1; 32]));
        assert!(!cache.contains(&[2; 32]));
        assert!(cache.contains(&[3; 32]));
        assert_eq!(cache.stats().evictions, 1);
    }

    #[test]
    fn test_removed_entries_leave_no_eviction_slot_behind() {
        let cache = ApiKeyCache::new(2);
        cache.insert(fixtures::standard_user(1, []), key(1, 1));
        cache.insert(fixtures::standard_user(2, []), key(2, 2));
        assert!(cache.remove(&[1; 32]));
        assert_eq!(cache.invalidate_user(UserId(2)), 1);

        cache.insert(fixtures::standard_user(1, []), key(3, 1));
        cache.insert(fixtures::standard_user(1, []), key(4, 1));
        assert_eq!(cache.stats().evictions, 0);
        assert_eq!(cache.stats().size, 2);

        cache.insert(fixtures::standard_user(1, []), key(5, 1));
        assert!(!cache.contains(&[3; 32]));
        assert!(cache.contains(&[4; 32]));
        assert_eq!(cache.stats().evictions, 1);
    }
}
