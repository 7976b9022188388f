//! Builds the [`RestrictedRequestContext`] handed to handlers.

use std::sync::Arc;

use bastion_core::{BastionError, RestrictedRequestContext, TeamMembershipStore};
use tracing::error;

use crate::context::RequestState;
use crate::middleware::{BoxFuture, Middleware, Next};
use crate::types::{Request, Response, ResponseExt};

/// Layer name used in logs.
pub const LAYER: &str = "context_upgrade";

/// Loads memberships for non-administrators and stores the context.
pub struct ContextUpgradeMiddleware {
    memberships: Arc<dyn TeamMembershipStore>,
}

impl ContextUpgradeMiddleware {
    /// Creates the gate.
    pub fn new(memberships: Arc<dyn TeamMembershipStore>) -> Self {
        Self { memberships }
    }
}

impl Middleware for ContextUpgradeMiddleware {
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
                Ok(token_data) => token_data.clone(),
                Err(err) => return Response::from_error(&err),
            };

            let context = if token_data.is_admin() {
                RestrictedRequestContext::admin(token_data.id)
            } else {
                match self.memberships.memberships_by_user_id(token_data.id) {
                    Ok(memberships) => RestrictedRequestContext::member(token_data.id, memberships),
                    Err(err) => {
                        error!(user_id = %token_data.id, error = %err, "Unable to load memberships");
                        return Response::from_error(&BastionError::internal_with_source(
                            "Unable to create restricted request context",
                            err,
                        ));
                    }
                }
            };

            state.set_restricted_context(context);
            next.run(state, request).await
        })
    }
}
