use std::time::Instant;

use tracing::{field, info, info_span};

use super::{Middleware, Next};
use crate::dispatcher::RequestContext;
use crate::error::HandlerResult;

/// Opens a `request` span around the rest of the pipeline and records the
/// outcome on it.
pub struct TracingMiddleware;

impl Middleware for TracingMiddleware {
    fn run(&self, ctx: &RequestContext<'_>, next: Next<'_>) -> HandlerResult {
        let span = info_span!(
            "request",
            request_id = %ctx.request_id(),
            method = %ctx.method(),
            path = %ctx.path(),
            route = %ctx.route().uri(),
            handler = %ctx.route().handler().describe(),
            status = field::Empty,
            latency_us = field::Empty,
        );
        let _guard = span.enter();

        let start = Instant::now();
        let result = next.run();
        let latency_us = start.elapsed().as_micros() as u64;

        let status = match &result {
            Ok(res) => res.status,
            Err(err) => err.code(),
        };
        span.record("status", status);
        span.record("latency_us", latency_us);
        info!(status, latency_us, "Request completed");

        result
    }
}
