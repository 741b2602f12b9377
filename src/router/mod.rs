//! # Router Module
//!
//! Path matching, parameter binding and the routing facade.
//!
//! ## Overview
//!
//! The router is responsible for:
//! - Compiling URI templates such as `/users/{id:num}` into anchored regexes
//! - Keeping routes in per-method buckets, in registration order
//! - Matching incoming requests and binding placeholder values
//! - Handing the matched route to the [`dispatcher`](crate::dispatcher)
//!
//! ## Architecture
//!
//! The router uses a two-phase approach:
//!
//! 1. **Compilation**: at registration, each template is compiled once into a
//!    [`PathPattern`] plus its ordered [`ParameterSpec`]s.
//!
//! 2. **Matching**: for each request, the method's bucket is first probed with
//!    the path as an exact key (literal routes, no regex), then scanned in
//!    registration order. The first full match wins and its captures are
//!    bound into a fresh [`Params`] for that request only.
//!
//! ## Example
//!
//! ```rust
//! use routecore::router::{Router, RouteOptions};
//! use routecore::{Handler, Request, Response};
//!
//! # fn main() -> Result<(), routecore::RouterError> {
//! let mut router = Router::default();
//! router.group(RouteOptions::new().with_prefix("api"), |r| {
//!     r.get(
//!         "/search/{q:alpha:?}",
//!         Handler::inline(|p| Ok(Response::ok(p.get_str("q").unwrap_or("*").to_string()))),
//!         (),
//!     )?;
//!     Ok(())
//! })?;
//!
//! let res = router.handle(&Request::new(http::Method::GET, "/api/search/"));
//! assert_eq!(res.body_str(), Some("*"));
//! # Ok(())
//! # }
//! ```
//!
//! ## Performance
//!
//! - Literal paths resolve with one hash lookup regardless of route count
//! - Templated paths cost one regex evaluation per candidate route
//! - Matching takes `&self` and allocates only the bound values

mod core;
mod params;
mod pattern;
mod route;
mod table;

pub use self::core::{Router, ANY_METHODS};
pub use self::params::{ParamValue, ParamVec, Params, MAX_INLINE_PARAMS};
pub use self::pattern::{ParamKind, ParameterSpec, PathPattern};
pub use self::route::{join_prefix, Handler, InlineHandler, IntoHandler, Route, RouteOptions};
pub use self::table::{RouteMatch, RouteTable};
