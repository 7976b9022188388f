//! Core middleware trait and chain types.
//!
//! Each gate implements [`Middleware`] and either short-circuits with its
//! own response or hands the request to [`Next`].

use crate::context::RequestState;
use crate::types::{Request, Response};
use std::future::Future;
use std::pin::Pin;

/// A boxed future that returns a response.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// A request gate.
///
/// A middleware calls `next.run()` at most once. Not calling it
/// short-circuits the chain with the middleware's own response.
pub trait Middleware: Send + Sync + 'static {
    /// Stable name used in logs and metrics.
    fn name(&self) -> &'static str;

    /// Process the request through this middleware.
    fn process<'a>(
        &'a self,
        state: &'a mut RequestState,
        request: Request,
        next: Next<'a>,
    ) -> BoxFuture<'a, Response>;
}

/// Terminal handler of a chain.
pub type Handler<'a> =
    Box<dyn FnOnce(&mut RequestState, Request) -> BoxFuture<'static, Response> + Send + 'a>;

/// The remainder of the chain after the current middleware.
pub struct Next<'a> {
    inner: NextInner<'a>,
}

enum NextInner<'a> {
    Chain {
        middleware: &'a dyn Middleware,
        next: Box<Next<'a>>,
    },
    Handler(Handler<'a>),
}

impl<'a> Next<'a> {
    /// Wraps `next` with `middleware`.
    pub(crate) fn new(middleware: &'a dyn Middleware, next: Next<'a>) -> Self {
        Self {
            inner: NextInner::Chain {
                middleware,
                next: Box::new(next),
            },
        }
    }

    /// Terminal `Next` that invokes the handler.
    pub(crate) fn handler<F>(f: F) -> Self
    where
        F: FnOnce(&mut RequestState, Request) -> BoxFuture<'static, Response> + Send + 'a,
    {
        Self {
            inner: NextInner::Handler(Box::new(f)),
        }
    }

    /// Invokes the next middleware or the handler.
    pub async fn run(self, state: &mut RequestState, request: Request) -> Response {
        match self.inner {
            NextInner::Chain { middleware, next } => {
                middleware.process(state, request, *next).await
            }
            NextInner::Handler(handler) => handler(state, request).await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;
    use http::{Request as HttpRequest, Response as HttpResponse, StatusCode};
    use http_body_util::Full;

    struct Marker(&'static str);

    #[derive(Debug, Default)]
    struct Visited(Vec<&'static str>);

    impl Middleware for Marker {
        fn name(&self) -> &'static str {
            self.0
        }

        fn process<'a>(
            &'a self,
            state: &'a mut RequestState,
            request: Request,
            next: Next<'a>,
        ) -> BoxFuture<'a, Response> {
            Box::pin(async move {
                let mut visited = state.remove_extension::<Visited>().unwrap_or_default();
                visited.0.push(self.0);
                state.set_extension(visited);
                next.run(state, request).await
            })
        }
    }

    fn ok() -> BoxFuture<'static, Response> {
        Box::pin(async {
            HttpResponse::builder()
                .status(StatusCode::OK)
                .body(Full::new(Bytes::from("OK")))
                .unwrap()
        })
    }

    #[tokio::test]
    async fn test_chain_runs_in_order() {
        let first = Marker("first");
        let second = Marker("second");
        let mut state = RequestState::new();
        let request: Request = HttpRequest::builder()
            .uri("/test")
            .body(Full::new(Bytes::new()))
            .unwrap();

        let handler = Next::handler(|_state, _req| ok());
        let chain = Next::new(&first, Next::new(&second, handler));

        let response = chain.run(&mut state, request).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            state.get_extension::<Visited>().unwrap().0,
            vec!["first", "second"]
        );
    }
}
