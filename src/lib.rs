//! # routecore
//!
//! **routecore** is the routing core of a lightweight request-dispatch
//! framework: it compiles URI templates, keeps routes in per-method buckets,
//! matches requests, binds path parameters and dispatches to inline closures or
//! named controllers through a middleware chain.
//!
//! ## Architecture
//!
//! The library is organized into several key modules:
//!
//! - **[`router`]** - Template compiler, route table, matcher and the [`Router`] facade
//! - **[`dispatcher`]** - Handler resolution, component registry and per-request context
//! - **[`middleware`]** - Middleware contract, continuation and bundled middleware
//! - **[`config`]** - Colon-keyed configuration accessor and file-backed implementation
//! - **[`error`]** - Error taxonomy with numeric codes
//! - **[`request`]** / **[`response`]** - Request accessor and response types
//! - **[`logging`]** - Structured logging initialisation
//!
//! ### Request Flow
//!
//! ```mermaid
//! sequenceDiagram
//!     participant Host
//!     participant Router
//!     participant Table as RouteTable
//!     participant Dispatcher
//!     participant MW as Middleware chain
//!     participant Handler
//!
//!     Host->>Router: handle(request)
//!     Router->>Table: find_match(method, path)
//!     alt no route
//!         Table-->>Router: NotFound
//!         Router-->>Host: 404 "Page is Not Found"
//!     else matched
//!         Table-->>Router: RouteMatch (route, params)
//!         Router->>Dispatcher: dispatch(RequestContext)
//!         Dispatcher->>Dispatcher: resolve handler + middleware
//!         Dispatcher->>MW: run(ctx, next)
//!         MW->>Handler: next.run()
//!         Handler-->>MW: Response
//!         MW-->>Router: Response
//!         Router-->>Host: Response (or error response)
//!     end
//! ```
//!
//! ## Quick Start
//!
//! ```rust
//! use std::sync::Arc;
//!
//! use routecore::config::ConfigMap;
//! use routecore::middleware::from_fn;
//! use routecore::{Handler, Request, Response, RouteOptions, Router};
//!
//! # fn main() -> Result<(), routecore::RouterError> {
//! let config = ConfigMap::new().with("router:controllerNamespace", "app");
//! let mut router = Router::new("/srv/site", Arc::new(config));
//!
//! router.register_middleware(
//!     "deny",
//!     Arc::new(from_fn(|_ctx, _next| Ok(Response::new("Forbidden", 403)))),
//! );
//!
//! router.get("/", Handler::inline(|_| Ok(Response::ok("home"))), ())?;
//! router.group(RouteOptions::new().with_prefix("admin").with_middleware("deny"), |r| {
//!     r.get("/stats", Handler::inline(|_| Ok(Response::ok("stats"))), ())?;
//!     Ok(())
//! })?;
//!
//! assert_eq!(router.handle(&Request::new(http::Method::GET, "/")).status, 200);
//! assert_eq!(router.handle(&Request::new(http::Method::GET, "/admin/stats")).status, 403);
//! assert_eq!(router.handle(&Request::new(http::Method::GET, "/nope")).status, 404);
//! # Ok(())
//! # }
//! ```
//!
//! ## Concurrency
//!
//! Registration takes `&mut Router` and happens once at startup. Matching and
//! dispatch take `&Router` and keep all per-request state in a
//! [`RequestContext`](dispatcher::RequestContext), so a built router can be
//! shared across threads behind an `Arc`.

pub mod config;
pub mod dispatcher;
pub mod error;
pub mod ids;
pub mod logging;
pub mod middleware;
pub mod request;
pub mod response;
pub mod router;

pub use error::{HandlerResult, RouterError};
pub use ids::RequestId;
pub use request::{HttpRequest, Request};
pub use response::Response;
pub use router::{Handler, ParamValue, Params, RouteOptions, Router};
