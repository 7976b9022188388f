//! Wiring a [`RequestBouncer`] from configuration.

use std::sync::Arc;

use bastion_apikey::{ApiKeyService, ServiceConfig};
use bastion_config::BastionConfig;
use bastion_core::{
    ApiKeyRepository, EndpointGroupStore, LicenseService, TeamMembershipStore, UserStore,
};
use bastion_middleware::{
    Collaborators, CredentialSettings, HmacJwtService, JwtService, RequestBouncer,
};
use tracing::{info, warn};

/// Data store backends the gateway reads from.
#[derive(Clone)]
pub struct Stores {
    /// Identity store.
    pub users: Arc<dyn UserStore>,
    /// Team membership store.
    pub memberships: Arc<dyn TeamMembershipStore>,
    /// Environment group store.
    pub endpoint_groups: Arc<dyn EndpointGroupStore>,
    /// API key persistence.
    pub api_keys: Arc<dyn ApiKeyRepository>,
    /// License validity.
    pub license: Arc<dyn LicenseService>,
}

/// Builds the bouncer and its API key and session token services.
///
/// Without a configured JWT secret, a random per-process secret is used and
/// sessions do not survive a restart.
pub fn build_bouncer(config: &BastionConfig, stores: Stores) -> RequestBouncer {
    let jwt: Arc<dyn JwtService> = match &config.auth.jwt_secret {
        Some(secret) => Arc::new(HmacJwtService::new(secret.as_bytes(), config.auth.jwt_ttl())),
        None => {
            warn!("No JWT secret configured, using a random per-process secret");
            Arc::new(HmacJwtService::with_random_secret(config.auth.jwt_ttl()))
        }
    };

    let api_keys = Arc::new(ApiKeyService::new(
        stores.api_keys,
        Arc::clone(&stores.users),
        ServiceConfig::from(&config.api_keys),
    ));

    let settings = CredentialSettings {
        token_query_param: config.auth.token_query_param.clone(),
        api_key_header: config.auth.api_key_header.clone(),
    };

    info!(
        environment = %config.telemetry.environment,
        api_key_cache_capacity = config.api_keys.cache_capacity,
        "Request bouncer ready"
    );

    RequestBouncer::new(
        Collaborators {
            users: stores.users,
            memberships: stores.memberships,
            endpoint_groups: stores.endpoint_groups,
            license: stores.license,
            api_keys,
            jwt,
        },
        settings,
    )
}
