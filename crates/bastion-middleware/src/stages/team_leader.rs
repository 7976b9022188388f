//! Team leader gate.

use std::sync::Arc;

use bastion_core::{BastionError, TeamMembershipStore};
use bastion_telemetry::{record_auth_decision, AuthOutcome};
use tracing::error;

use crate::context::RequestState;
use crate::middleware::{BoxFuture, Middleware, Next};
use crate::types::{Request, Response, ResponseExt};

/// Layer name used in logs and metrics.
pub const LAYER: &str = "team_leader";

/// Admits administrators and callers leading at least one team.
pub struct TeamLeaderMiddleware {
    memberships: Arc<dyn TeamMembershipStore>,
}

impl TeamLeaderMiddleware {
    /// Creates the gate.
    pub fn new(memberships: Arc<dyn TeamMembershipStore>) -> Self {
        Self { memberships }
    }
}

impl Middleware for TeamLeaderMiddleware {
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
            let token_data = match state.token_data() {
                Ok(token_data) => token_data,
                Err(err) => return Response::from_error(&err),
            };
            if token_data.is_admin() {
                return next.run(state, request).await;
            }

            match self.memberships.memberships_by_user_id(token_data.id) {
                Ok(memberships) if memberships.iter().any(|m| m.is_leader()) => {
                    record_auth_decision(LAYER, AuthOutcome::Allowed);
                    next.run(state, request).await
                }
                Ok(_) => {
                    record_auth_decision(LAYER, AuthOutcome::Denied);
                    Response::from_error(&BastionError::access_denied(
                        "Team leader role is required",
                    ))
                }
                Err(err) => {
                    error!(user_id = %token_data.id, error = %err, "Unable to load memberships");
                    record_auth_decision(LAYER, AuthOutcome::Error);
                    Response::from_error(&BastionError::internal_with_source(
                        "Unable to retrieve user memberships",
                        err,
                    ))
                }
            }
        })
    }
}
