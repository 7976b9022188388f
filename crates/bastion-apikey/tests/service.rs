//! API key service behaviour against the in-memory store.

use std::sync::Arc;
use std::time::Duration;

use bastion_apikey::{hash_raw, ApiKeyError, ApiKeyService, ServiceConfig};
use bastion_core::fixtures::{self, MemoryStore};
use bastion_core::{Authorization, Role, User, UserId};
use chrono::{TimeZone, Utc};

fn service_with(config: ServiceConfig) -> (Arc<MemoryStore>, ApiKeyService) {
    let store = Arc::new(MemoryStore::new());
    store.insert_user(fixtures::standard_user(7, [Authorization::DockerPing]));
    let service = ApiKeyService::new(store.clone(), store.clone(), config);
    (store, service)
}

fn owner(store: &MemoryStore) -> User {
    use bastion_core::UserStore;
    store.user(UserId(7)).unwrap()
}

#[test]
fn generated_key_resolves_to_owner() {
    let (store, service) = service_with(ServiceConfig::default());
    let (raw, key) = service.generate_api_key(&owner(&store), "ci").unwrap();

    assert!(raw.starts_with("ptr_"));
    assert_eq!(key.prefix, &raw[..7]);
    assert_eq!(key.description, "ci");
    assert!(key.last_used.is_none());
    assert_eq!(store.api_key_count(), 1);

    let (user, found) = service.get_digest_user_and_key(&hash_raw(&raw)).unwrap();
    assert_eq!(user.id, UserId(7));
    assert_eq!(found.id, key.id);
    assert_eq!(service.cache_stats().hits, 1);
}

#[test]
fn lookup_without_cache_reads_through() {
    let (store, service) = service_with(ServiceConfig::disabled());
    let (raw, _) = service.generate_api_key(&owner(&store), "").unwrap();

    let digest = service.hash_raw(&raw);
    assert!(!service.is_cached(&digest));
    let (user, _) = service.get_digest_user_and_key(&digest).unwrap();
    assert_eq!(user.id, UserId(7));

    let stats = service.cache_stats();
    assert_eq!(stats.hits, 0);
    assert_eq!(stats.misses, 1);
    assert_eq!(stats.size, 0);
}

#[test]
fn unknown_digest_is_not_found() {
    let (_, service) = service_with(ServiceConfig::default());
    let err = service
        .get_digest_user_and_key(&hash_raw("ptr_unknown"))
        .unwrap_err();
    assert!(matches!(err, ApiKeyError::NotFound));
}

#[test]
fn key_of_removed_user_fails_with_owner_not_found() {
    let (store, service) = service_with(ServiceConfig::disabled());
    let (raw, _) = service.generate_api_key(&owner(&store), "").unwrap();
    store.remove_user(UserId(7));

    let err = service.get_digest_user_and_key(&hash_raw(&raw)).unwrap_err();
    assert!(matches!(err, ApiKeyError::OwnerNotFound(UserId(7))));
    assert!(err.is_not_found());
}

#[test]
fn deleted_key_stops_resolving() {
    let (store, service) = service_with(ServiceConfig::default());
    let (raw, key) = service.generate_api_key(&owner(&store), "").unwrap();
    let digest = hash_raw(&raw);
    assert!(service.is_cached(&digest));

    service.delete_api_key(key.id).unwrap();

    assert!(!service.is_cached(&digest));
    assert_eq!(store.api_key_count(), 0);
    assert!(service.get_digest_user_and_key(&digest).is_err());
    assert!(service.get_api_key(key.id).unwrap_err().is_not_found());
}

#[test]
fn rotation_invalidates_old_secret() {
    let (store, service) = service_with(ServiceConfig::default());
    let (old_raw, key) = service.generate_api_key(&owner(&store), "deploy").unwrap();

    let (new_raw, rotated) = service.rotate_api_key(key.id).unwrap();

    assert_ne!(old_raw, new_raw);
    assert_eq!(rotated.id, key.id);
    assert_eq!(rotated.description, "deploy");
    assert!(service.get_digest_user_and_key(&hash_raw(&old_raw)).is_err());
    let (_, found) = service.get_digest_user_and_key(&hash_raw(&new_raw)).unwrap();
    assert_eq!(found.id, key.id);
}

#[test]
fn cached_owner_is_stale_until_invalidated() {
    let (store, service) = service_with(ServiceConfig::default());
    let (raw, _) = service.generate_api_key(&owner(&store), "").unwrap();
    let digest = hash_raw(&raw);

    let promoted = User::new(UserId(7), "promoted", Role::Administrator);
    store.insert_user(promoted);

    let (cached, _) = service.get_digest_user_and_key(&digest).unwrap();
    assert_eq!(cached.role, Role::Standard);

    assert_eq!(service.invalidate_user_key_cache(UserId(7)), 1);
    let (fresh, _) = service.get_digest_user_and_key(&digest).unwrap();
    assert_eq!(fresh.role, Role::Administrator);
}

#[test]
fn keys_listed_and_deleted_per_user() {
    let (store, service) = service_with(ServiceConfig::default());
    let user = owner(&store);
    service.generate_api_key(&user, "a").unwrap();
    service.generate_api_key(&user, "b").unwrap();

    let keys = service.get_api_keys(UserId(7)).unwrap();
    assert_eq!(keys.len(), 2);
    assert!(service.get_api_keys(UserId(99)).unwrap().is_empty());

    assert_eq!(service.delete_api_keys_for_user(UserId(7)).unwrap(), 2);
    assert_eq!(store.api_key_count(), 0);
    assert_eq!(service.cache_stats().size, 0);
}

#[test]
fn last_used_refresh_is_throttled() {
    let config = ServiceConfig {
        last_used_refresh: Duration::from_secs(60),
        ..ServiceConfig::default()
    };
    let (store, service) = service_with(config);
    let (_, key) = service.generate_api_key(&owner(&store), "").unwrap();

    let t0 = Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap();
    assert!(service.refresh_last_used(&key, t0).unwrap());

    let key = service.get_api_key(key.id).unwrap();
    assert_eq!(key.last_used, Some(t0));

    let soon = t0 + chrono::Duration::seconds(30);
    assert!(!service.refresh_last_used(&key, soon).unwrap());

    let later = t0 + chrono::Duration::seconds(61);
    assert!(service.refresh_last_used(&key, later).unwrap());
    assert_eq!(service.get_api_key(key.id).unwrap().last_used, Some(later));
}

#[test]
fn store_outage_surfaces_as_store_error() {
    let (store, service) = service_with(ServiceConfig::default());
    let user = owner(&store);
    store.set_unavailable(true);

    let err = service.generate_api_key(&user, "").unwrap_err();
    assert!(matches!(err, ApiKeyError::Store(_)));
    assert!(!err.is_not_found());
}

#[test]
fn last_use_recorded_after_rotation_does_not_revive_old_secret() {
    let (store, service) = service_with(ServiceConfig::default());
    let (old_raw, key) = service.generate_api_key(&owner(&store), "deploy").unwrap();
    let (_, looked_up) = service.get_digest_user_and_key(&hash_raw(&old_raw)).unwrap();

    let (new_raw, _) = service.rotate_api_key(key.id).unwrap();
    let now = Utc.with_ymd_and_hms(2024, 3, 1, 9, 0, 0).unwrap();
    assert!(!service.refresh_last_used(&looked_up, now).unwrap());

    assert!(service
        .get_digest_user_and_key(&hash_raw(&old_raw))
        .unwrap_err()
        .is_not_found());
    let (_, current) = service.get_digest_user_and_key(&hash_raw(&new_raw)).unwrap();
    assert_eq!(current.id, key.id);
    assert_eq!(current.last_used, None);
}

#[test]
fn last_use_only_touches_last_used() {
    let (store, service) = service_with(ServiceConfig::default());
    let (raw, _) = service.generate_api_key(&owner(&store), "before").unwrap();
    let digest = hash_raw(&raw);
    let (_, looked_up) = service.get_digest_user_and_key(&digest).unwrap();

    let mut renamed = service.get_api_key(looked_up.id).unwrap();
    renamed.description = "after".into();
    service.update_api_key(&renamed).unwrap();

    let now = Utc.with_ymd_and_hms(2024, 3, 1, 9, 0, 0).unwrap();
    assert!(service.refresh_last_used(&looked_up, now).unwrap());

    let stored = service.get_api_key(looked_up.id).unwrap();
    assert_eq!(stored.description, "after");
    assert_eq!(stored.last_used, Some(now));

    let (_, cached) = service.get_digest_user_and_key(&digest).unwrap();
    assert_eq!(cached.description, "after");
    assert_eq!(cached.last_used, Some(now));
}

#[test]
fn last_use_of_deleted_key_is_skipped() {
    let (store, service) = service_with(ServiceConfig::default());
    let (_, key) = service.generate_api_key(&owner(&store), "").unwrap();
    service.delete_api_key(key.id).unwrap();

    assert!(!service.refresh_last_used(&key, Utc::now()).unwrap());
    assert_eq!(store.api_key_count(), 0);
}
