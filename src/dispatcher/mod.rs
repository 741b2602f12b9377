//! # Dispatcher Module
//!
//! The dispatcher turns a matched route into a response. For each request it:
//!
//! - resolves the route's handler descriptor, either an inline closure or a
//!   `Controller@method` pair looked up in the component [`Registry`]
//! - resolves the middleware chain (configured global middleware followed by
//!   the route's own middleware)
//! - runs the chain around a lazy continuation that invokes the handler
//!
//! Controllers and middleware are registered by name at startup. The registry
//! is the only place where a name is turned into a component; everything
//! after registration is read-only and can be shared across threads.
//!
//! ## Controllers
//!
//! ```rust,ignore
//! use routecore::dispatcher::{Controller, ControllerArgs};
//! use routecore::{HandlerResult, Params, Response};
//!
//! struct Users { base_path: String }
//!
//! impl Controller for Users {
//!     fn call(&mut self, method: &str, params: &Params) -> Option<HandlerResult> {
//!         match method {
//!             "show" => Some(Ok(Response::ok(format!("user {}", params.get_i64("id")?)))),
//!             _ => None,
//!         }
//!     }
//! }
//!
//! router.register_controller("Users", |args: &ControllerArgs<'_>| {
//!     Box::new(Users { base_path: args.base_path.to_string() })
//! });
//! router.get("/users/{id:num}", "Users@show", ())?;
//! ```
//!
//! ## Failure codes
//!
//! | Failure | Code |
//! |---|---|
//! | controller not registered | 604 |
//! | controller has no such method | 605 |
//! | middleware name registered as a controller | 600 |
//! | middleware not registered | 604 |

mod core;
mod registry;

pub use self::core::{Dispatcher, RequestContext};
pub use self::registry::{qualify, Controller, ControllerArgs, ControllerFactory, Registry};
