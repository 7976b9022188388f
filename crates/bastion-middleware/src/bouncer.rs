//! The request bouncer.
//!
//! [`RequestBouncer`] owns one instance of every gate and composes them into
//! the access levels handlers are mounted behind:
//!
//! | Level | Gates |
//! |-------|-------|
//! | public | request id, security headers |
//! | authenticated | + authentication, context upgrade |
//! | restricted | + authentication, license, operation authorization, context upgrade |
//! | admin | + authentication, license, administrator gate, context upgrade |
//! | team leader | + authentication, team leader gate, context upgrade |
//!
//! It also exposes the per-environment checks handlers run before proxying.

use std::sync::Arc;

use bastion_apikey::ApiKeyService;
use bastion_authz::{
    authorized_endpoint_access, authorized_operation, bypasses_authorization,
    ApiOperationAuthorizationRequest,
};
use bastion_core::{
    BastionError, BastionResult, Endpoint, EndpointGroupStore, LicenseService,
    TeamMembershipStore, User, UserStore,
};
use tracing::{debug, warn};

use crate::context::RequestState;
use crate::jwt::JwtService;
use crate::pipeline::{BoxedMiddleware, Pipeline};
use crate::stages::{
    AdminOnlyMiddleware, AuthenticationMiddleware, ContextUpgradeMiddleware, CredentialSettings,
    LicenseMiddleware, OperationAuthorizationMiddleware, RequestIdMiddleware,
    SecurityHeadersMiddleware, TeamLeaderMiddleware,
};
use crate::types::Request;

/// Header an edge agent presents to identify itself.
pub const EDGE_ID_HEADER: &str = "x-portainer-edge-id";

/// External collaborators the bouncer reads from.
#[derive(Clone)]
pub struct Collaborators {
    /// Identity store.
    pub users: Arc<dyn UserStore>,
    /// Team membership store.
    pub memberships: Arc<dyn TeamMembershipStore>,
    /// Environment group store.
    pub endpoint_groups: Arc<dyn EndpointGroupStore>,
    /// License validity.
    pub license: Arc<dyn LicenseService>,
    /// API key credential service.
    pub api_keys: Arc<ApiKeyService>,
    /// Session token service.
    pub jwt: Arc<dyn JwtService>,
}

/// Composes the gates into access levels.
pub struct RequestBouncer {
    collaborators: Collaborators,
    public: Pipeline,
    authenticated: Pipeline,
    restricted: Pipeline,
    admin: Pipeline,
    team_leader: Pipeline,
}

impl std::fmt::Debug for RequestBouncer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RequestBouncer")
            .field("public", &self.public)
            .field("authenticated", &self.authenticated)
            .field("restricted", &self.restricted)
            .field("admin", &self.admin)
            .field("team_leader", &self.team_leader)
            .finish_non_exhaustive()
    }
}

impl RequestBouncer {
    /// Builds every access level.
    pub fn new(collaborators: Collaborators, settings: CredentialSettings) -> Self {
        let request_id: BoxedMiddleware = Arc::new(RequestIdMiddleware::new());
        let headers: BoxedMiddleware = Arc::new(SecurityHeadersMiddleware);
        let authentication: BoxedMiddleware = Arc::new(AuthenticationMiddleware::new(
            Arc::clone(&collaborators.jwt),
            Arc::clone(&collaborators.api_keys),
            Arc::clone(&collaborators.users),
            settings,
        ));
        let license: BoxedMiddleware =
            Arc::new(LicenseMiddleware::new(Arc::clone(&collaborators.license)));
        let operation: BoxedMiddleware = Arc::new(OperationAuthorizationMiddleware::new(
            Arc::clone(&collaborators.users),
        ));
        let admin_only: BoxedMiddleware = Arc::new(AdminOnlyMiddleware);
        let team_leader: BoxedMiddleware = Arc::new(TeamLeaderMiddleware::new(Arc::clone(
            &collaborators.memberships,
        )));
        let upgrade: BoxedMiddleware = Arc::new(ContextUpgradeMiddleware::new(Arc::clone(
            &collaborators.memberships,
        )));

        let level = |gates: &[&BoxedMiddleware]| {
            gates
                .iter()
                .fold(
                    Pipeline::builder()
                        .add_shared_stage(Arc::clone(&request_id))
                        .add_shared_stage(Arc::clone(&headers)),
                    |builder, gate| builder.add_shared_stage(Arc::clone(*gate)),
                )
                .build()
        };

        Self {
            public: level(&[]),
            authenticated: level(&[&authentication, &upgrade]),
            restricted: level(&[&authentication, &license, &operation, &upgrade]),
            admin: level(&[&authentication, &license, &admin_only, &upgrade]),
            team_leader: level(&[&authentication, &team_leader, &upgrade]),
            collaborators,
        }
    }

    /// No identity required.
    pub fn public(&self) -> &Pipeline {
        &self.public
    }

    /// Any authenticated identity.
    pub fn authenticated(&self) -> &Pipeline {
        &self.authenticated
    }

    /// Authenticated, licensed, and holding the classified operation.
    pub fn restricted(&self) -> &Pipeline {
        &self.restricted
    }

    /// Authenticated administrators.
    pub fn admin(&self) -> &Pipeline {
        &self.admin
    }

    /// Authenticated administrators and team leaders.
    pub fn team_leader(&self) -> &Pipeline {
        &self.team_leader
    }

    /// The session token service, for issuing tokens at login.
    pub fn jwt(&self) -> &Arc<dyn JwtService> {
        &self.collaborators.jwt
    }

    /// Checks the caller may operate on `endpoint`.
    ///
    /// Non-administrators need access through the environment or its group.
    /// With `check_authorization`, the request's classified operation must
    /// also be in the caller's authorizations for that environment.
    ///
    /// # Errors
    ///
    /// [`BastionError::AccessDenied`] without access,
    /// [`BastionError::AuthorizationRequired`] without the operation, and an
    /// internal error when a collaborator read fails.
    pub fn authorized_endpoint_operation(
        &self,
        state: &RequestState,
        request: &Request,
        endpoint: &Endpoint,
        check_authorization: bool,
    ) -> BastionResult<()> {
        let token_data = state.token_data()?;
        if bypasses_authorization(token_data.role) {
            return Ok(());
        }

        let group = self
            .collaborators
            .endpoint_groups
            .endpoint_group(endpoint.group_id)
            .map_err(|err| {
                BastionError::internal_with_source(
                    "Unable to find an environment group with the specified identifier inside the database",
                    err,
                )
            })?;
        let memberships = self
            .collaborators
            .memberships
            .memberships_by_user_id(token_data.id)
            .map_err(|err| {
                BastionError::internal_with_source("Unable to retrieve user memberships", err)
            })?;

        if !authorized_endpoint_access(endpoint, &group, token_data.id, &memberships) {
            warn!(user_id = %token_data.id, endpoint_id = %endpoint.id, "Environment access denied");
            return Err(BastionError::access_denied(format!(
                "No access to environment {}",
                endpoint.id
            )));
        }

        if check_authorization {
            let user = self.caller(state)?;
            let authorizations = user.authorizations_for_endpoint(endpoint.id);
            let path = request.uri().path();
            let granted = authorized_operation(&ApiOperationAuthorizationRequest {
                path,
                method: request.method(),
                authorizations: &authorizations,
            });
            if !granted {
                warn!(
                    user_id = %user.id,
                    endpoint_id = %endpoint.id,
                    http.method = %request.method(),
                    http.path = path,
                    "Environment operation not authorized"
                );
                return Err(BastionError::authorization_required(format!(
                    "{} {path} is not authorized on environment {}",
                    request.method(),
                    endpoint.id
                )));
            }
        }

        debug!(user_id = %token_data.id, endpoint_id = %endpoint.id, "Environment operation allowed");
        Ok(())
    }

    /// Checks the request comes from the edge agent registered for `endpoint`.
    ///
    /// # Errors
    ///
    /// [`BastionError::AccessDenied`] when the environment is not an edge
    /// environment, the edge identifier header is missing, or it does not
    /// match the registered identifier.
    pub fn authorized_edge_endpoint_operation(
        &self,
        request: &Request,
        endpoint: &Endpoint,
    ) -> BastionResult<()> {
        if !endpoint.endpoint_type.is_edge() {
            return Err(BastionError::access_denied("Invalid environment type"));
        }

        let edge_id = request
            .headers()
            .get(EDGE_ID_HEADER)
            .and_then(|v| v.to_str().ok())
            .filter(|v| !v.is_empty())
            .ok_or_else(|| BastionError::access_denied("Invalid Edge identifier"))?;

        match &endpoint.edge_id {
            Some(registered) if registered != edge_id => {
                warn!(endpoint_id = %endpoint.id, "Edge identifier mismatch");
                Err(BastionError::access_denied("Invalid Edge identifier"))
            }
            _ => Ok(()),
        }
    }

    fn caller(&self, state: &RequestState) -> BastionResult<User> {
        if let Some(user) = state.user() {
            return Ok(user.clone());
        }
        let token_data = state.token_data()?;
        self.collaborators
            .users
            .user(token_data.id)
            .map_err(BastionError::from_identity_lookup)
    }
}
