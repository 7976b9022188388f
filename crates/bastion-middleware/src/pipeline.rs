//! Ordered middleware pipelines.
//!
//! A [`Pipeline`] runs its gates in the order they were added, outermost
//! first, then the handler. The bouncer builds one pipeline per access level
//! and shares gate instances between them.

use std::sync::Arc;

use crate::context::RequestState;
use crate::middleware::{BoxFuture, Middleware, Next};
use crate::types::{Request, Response};

/// A type-erased middleware that can be shared between pipelines.
pub type BoxedMiddleware = Arc<dyn Middleware>;

/// An immutable, ordered chain of gates.
pub struct Pipeline {
    stages: Vec<BoxedMiddleware>,
}

impl std::fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pipeline")
            .field("stages", &self.stage_names())
            .finish()
    }
}

impl Pipeline {
    /// Creates a new pipeline builder.
    #[must_use]
    pub fn builder() -> PipelineBuilder {
        PipelineBuilder::new()
    }

    /// Runs `request` through every gate and then `handler`.
    ///
    /// The handler reads what it needs from the state synchronously and
    /// returns the future producing the response.
    pub async fn process<H>(&self, mut state: RequestState, request: Request, handler: H) -> Response
    where
        H: FnOnce(&mut RequestState, Request) -> BoxFuture<'static, Response> + Send + 'static,
    {
        let next = self.build_chain(handler);
        next.run(&mut state, request).await
    }

    fn build_chain<'a, H>(&'a self, handler: H) -> Next<'a>
    where
        H: FnOnce(&mut RequestState, Request) -> BoxFuture<'static, Response> + Send + 'a,
    {
        let mut next = Next::handler(handler);
        for middleware in self.stages.iter().rev() {
            next = Next::new(middleware.as_ref(), next);
        }
        next
    }

    /// Gate names in execution order.
    #[must_use]
    pub fn stage_names(&self) -> Vec<&'static str> {
        self.stages.iter().map(|mw| mw.name()).collect()
    }

    /// Number of gates.
    #[must_use]
    pub fn stage_count(&self) -> usize {
        self.stages.len()
    }
}

/// Builder for [`Pipeline`].
#[derive(Default)]
pub struct PipelineBuilder {
    stages: Vec<BoxedMiddleware>,
}

impl PipelineBuilder {
    /// Creates an empty builder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a gate.
    #[must_use]
    pub fn add_stage<M: Middleware>(mut self, middleware: M) -> Self {
        self.stages.push(Arc::new(middleware));
        self
    }

    /// Appends a gate instance shared with other pipelines.
    #[must_use]
    pub fn add_shared_stage(mut self, middleware: BoxedMiddleware) -> Self {
        self.stages.push(middleware);
        self
    }

    /// Builds the pipeline.
    #[must_use]
    pub fn build(self) -> Pipeline {
        Pipeline {
            stages: self.stages,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ResponseExt;
    use bytes::Bytes;
    use http::{Request as HttpRequest, Response as HttpResponse, StatusCode};
    use http_body_util::Full;

    struct Deny;

    impl Middleware for Deny {
        fn name(&self) -> &'static str {
            "deny"
        }

        fn process<'a>(
            &'a self,
            _state: &'a mut RequestState,
            _request: Request,
            _next: Next<'a>,
        ) -> BoxFuture<'a, Response> {
            Box::pin(async { Response::json_error(StatusCode::FORBIDDEN, "denied", "") })
        }
    }

    struct Pass;

    impl Middleware for Pass {
        fn name(&self) -> &'static str {
            "pass"
        }

        fn process<'a>(
            &'a self,
            state: &'a mut RequestState,
            request: Request,
            next: Next<'a>,
        ) -> BoxFuture<'a, Response> {
            Box::pin(next.run(state, request))
        }
    }

    fn request() -> Request {
        HttpRequest::builder()
            .uri("/")
            .body(Full::new(Bytes::new()))
            .unwrap()
    }

    fn ok_handler(_: &mut RequestState, _: Request) -> BoxFuture<'static, Response> {
        Box::pin(async {
            HttpResponse::builder()
                .status(StatusCode::OK)
                .body(Full::new(Bytes::new()))
                .unwrap()
        })
    }

    #[tokio::test]
    async fn test_empty_pipeline_runs_handler() {
        let pipeline = Pipeline::builder().build();
        let response = pipeline
            .process(RequestState::new(), request(), ok_handler)
            .await;
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_short_circuit_skips_handler() {
        let pipeline = Pipeline::builder().add_stage(Pass).add_stage(Deny).build();
        assert_eq!(pipeline.stage_names(), vec!["pass", "deny"]);

        let response = pipeline
            .process(RequestState::new(), request(), ok_handler)
            .await;
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn test_shared_stage() {
        let shared: BoxedMiddleware = Arc::new(Pass);
        let a = Pipeline::builder().add_shared_stage(shared.clone()).build();
        let b = Pipeline::builder()
            .add_shared_stage(shared)
            .add_stage(Deny)
            .build();
        assert_eq!(a.stage_count(), 1);
        assert_eq!(b.stage_count(), 2);
    }
}
