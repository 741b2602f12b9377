use std::sync::Arc;

use crate::dispatcher::RequestContext;
use crate::error::HandlerResult;

/// Unit of request-wrapping logic.
///
/// `run` receives the per-request context (which gives access to the router,
/// the matched route and its options) and a [`Next`] continuation. The
/// middleware decides whether and when the continuation runs; returning
/// without calling it short-circuits the handler.
pub trait Middleware: Send + Sync {
    fn run(&self, ctx: &RequestContext<'_>, next: Next<'_>) -> HandlerResult;
}

/// Deferred invocation of the rest of the pipeline.
///
/// Calling [`Next::run`] more than once re-runs the remainder of the chain
/// each time.
#[derive(Clone, Copy)]
pub struct Next<'a> {
    inner: &'a dyn Fn() -> HandlerResult,
}

impl<'a> Next<'a> {
    pub fn new(inner: &'a dyn Fn() -> HandlerResult) -> Self {
        Self { inner }
    }

    pub fn run(&self) -> HandlerResult {
        (self.inner)()
    }
}

/// Middleware built from a closure, see [`from_fn`].
pub struct FnMiddleware<F> {
    f: F,
}

impl<F> Middleware for FnMiddleware<F>
where
    F: Fn(&RequestContext<'_>, Next<'_>) -> HandlerResult + Send + Sync,
{
    fn run(&self, ctx: &RequestContext<'_>, next: Next<'_>) -> HandlerResult {
        (self.f)(ctx, next)
    }
}

/// Wrap a closure as a middleware.
///
/// ```rust,ignore
/// let deny = from_fn(|_ctx, _next| Ok(Response::new("Forbidden", 403)));
/// router.register_middleware("deny", Arc::new(deny));
/// ```
pub fn from_fn<F>(f: F) -> FnMiddleware<F>
where
    F: Fn(&RequestContext<'_>, Next<'_>) -> HandlerResult + Send + Sync,
{
    FnMiddleware { f }
}

/// Run `chain` outermost first around `endpoint`.
///
/// An empty chain invokes the endpoint directly.
pub(crate) fn run_chain(
    chain: &[Arc<dyn Middleware>],
    ctx: &RequestContext<'_>,
    endpoint: &dyn Fn() -> HandlerResult,
) -> HandlerResult {
    match chain.split_first() {
        None => endpoint(),
        Some((head, rest)) => {
            let next = || run_chain(rest, ctx, endpoint);
            head.run(ctx, Next::new(&next))
        }
    }
}
