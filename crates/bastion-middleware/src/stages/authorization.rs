//! Operation authorization gates.
//!
//! [`OperationAuthorizationMiddleware`] classifies the request into an
//! [`Authorization`](bastion_core::Authorization) and requires the caller
//! to hold it. [`AdminOnlyMiddleware`] admits administrators only.

use std::sync::Arc;

use bastion_authz::{authorized_operation, bypasses_authorization, ApiOperationAuthorizationRequest};
use bastion_core::{BastionError, BastionResult, User, UserStore};
use bastion_telemetry::{record_auth_decision, AuthOutcome};
use tracing::{error, warn};

use crate::context::RequestState;
use crate::middleware::{BoxFuture, Middleware, Next};
use crate::types::{Request, Response, ResponseExt};

/// Layer name of the operation gate.
pub const LAYER: &str = "authorization";

/// Layer name of the administrator gate.
pub const ADMIN_LAYER: &str = "admin_only";

/// Requires the classified operation to be in the caller's authorization set.
pub struct OperationAuthorizationMiddleware {
    users: Arc<dyn UserStore>,
}

impl OperationAuthorizationMiddleware {
    /// Creates the gate.
    pub fn new(users: Arc<dyn UserStore>) -> Self {
        Self { users }
    }

    fn caller(&self, state: &RequestState) -> BastionResult<User> {
        if let Some(user) = state.user() {
            return Ok(user.clone());
        }
        let token_data = state.token_data()?;
        self.users
            .user(token_data.id)
            .map_err(BastionError::from_identity_lookup)
    }
}

impl Middleware for OperationAuthorizationMiddleware {
    fn name(&self) -> &'static str {
        LAYER
    }

    fn process<'a>(
        &'a self,
        state: &'a mut RequestState,
        request: Request,
        next: Next<'a>,
    ) -> BoxFuture<'a, Response> {
        Box::pin(async move {
            let user = match self.caller(state) {
                Ok(user) => user,
                Err(err) => {
                    error!(request_id = %state.request_id(), error = ?err, "Unable to load caller");
                    record_auth_decision(LAYER, AuthOutcome::Error);
                    return Response::from_error(&err);
                }
            };

            if bypasses_authorization(user.role) {
                return next.run(state, request).await;
            }

            let path = request.uri().path().to_string();
            let granted = authorized_operation(&ApiOperationAuthorizationRequest {
                path: &path,
                method: request.method(),
                authorizations: &user.portainer_authorizations,
            });

            if granted {
                record_auth_decision(LAYER, AuthOutcome::Allowed);
                next.run(state, request).await
            } else {
                warn!(
                    user_id = %user.id,
                    http.method = %request.method(),
                    http.path = %path,
                    "Operation not authorized"
                );
                record_auth_decision(LAYER, AuthOutcome::Denied);
                Response::from_error(&BastionError::authorization_required(format!(
                    "{} {path} is not authorized",
                    request.method()
                )))
            }
        })
    }
}

/// Admits administrators only.
#[derive(Debug, Clone, Copy, Default)]
pub struct AdminOnlyMiddleware;

impl Middleware for AdminOnlyMiddleware {
    fn name(&self) -> &'static str {
        ADMIN_LAYER
    }

    fn process<'a>(
        &'a self,
        state: &'a mut RequestState,
        request: Request,
        next: Next<'a>,
    ) -> BoxFuture<'a, Response> {
        Box::pin(async move {
            let admin = match state.token_data() {
                Ok(token_data) => bypasses_authorization(token_data.role),
                Err(err) => return Response::from_error(&err),
            };

            if admin {
                record_auth_decision(ADMIN_LAYER, AuthOutcome::Allowed);
                next.run(state, request).await
            } else {
                record_auth_decision(ADMIN_LAYER, AuthOutcome::Denied);
                Response::from_error(&BastionError::access_denied(
                    "Administrator role is required",
                ))
            }
        })
    }
}
