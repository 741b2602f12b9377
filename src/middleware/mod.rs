//! # Middleware
//!
//! A middleware wraps the invocation of a route's handler. It receives the
//! per-request [`RequestContext`](crate::dispatcher::RequestContext) and a
//! [`Next`] continuation and returns the response, either its own or the one
//! produced by calling `next.run()`.
//!
//! Middleware are registered by name on the router's component registry and
//! referenced by name from route options (`middleware`) or from the
//! `router:middlewares` configuration list. For one request the pipeline is:
//!
//! ```text
//! global[0] -> global[1] -> ... -> route middleware -> handler
//! ```
//!
//! With no global middleware and no route middleware the handler is invoked
//! directly.

mod core;
mod metrics;
mod tracing;

pub(crate) use self::core::run_chain;
pub use self::core::{from_fn, FnMiddleware, Middleware, Next};
pub use self::metrics::MetricsMiddleware;
pub use self::tracing::TracingMiddleware;
