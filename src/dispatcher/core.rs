use std::sync::Arc;

use http::Method;
use tracing::debug;

use super::registry::{qualify, ControllerArgs, Registry};
use crate::error::{HandlerResult, RouterError};
use crate::ids::RequestId;
use crate::middleware::{run_chain, Middleware};
use crate::router::{Handler, Params, Route, RouteOptions, Router};

/// Everything known about one request once it has been matched.
///
/// Built by [`Router::parse`] and passed by reference through the
/// middleware chain to the handler. Nothing in here is shared with other
/// requests except the `Arc<Route>` itself, which is read-only.
#[derive(Debug)]
pub struct RequestContext<'r> {
    request_id: RequestId,
    method: Method,
    path: String,
    route: Arc<Route>,
    params: Params,
    router: &'r Router,
}

impl<'r> RequestContext<'r> {
    pub(crate) fn new(
        request_id: RequestId,
        method: Method,
        path: impl Into<String>,
        route: Arc<Route>,
        params: Params,
        router: &'r Router,
    ) -> Self {
        Self {
            request_id,
            method,
            path: path.into(),
            route,
            params,
            router,
        }
    }

    #[must_use]
    pub fn request_id(&self) -> RequestId {
        self.request_id
    }

    #[must_use]
    pub fn method(&self) -> &Method {
        &self.method
    }

    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }

    /// The route selected for this request
    #[must_use]
    pub fn route(&self) -> &Route {
        &self.route
    }

    /// Values bound from the path for this request only
    #[must_use]
    pub fn params(&self) -> &Params {
        &self.params
    }

    /// Options of the selected route, after group merging
    #[must_use]
    pub fn options(&self) -> &RouteOptions {
        self.route.options()
    }

    #[must_use]
    pub fn router(&self) -> &'r Router {
        self.router
    }
}

/// Invokable unit a handler descriptor resolves to.
enum Target<'a> {
    Inline(&'a (dyn Fn(&Params) -> HandlerResult + Send + Sync)),
    Controller { name: String, method: &'a str },
}

/// Resolves handlers and middleware for a matched route and runs them.
///
/// The dispatcher owns the component [`Registry`]. It is configured once
/// with the controller namespace and the global middleware list and is only
/// read afterwards.
#[derive(Debug, Clone, Default)]
pub struct Dispatcher {
    registry: Registry,
    namespace: String,
    global_middleware: Vec<String>,
}

impl Dispatcher {
    #[must_use]
    pub fn new(namespace: impl Into<String>, global_middleware: Vec<String>) -> Self {
        Self {
            registry: Registry::new(),
            namespace: namespace.into(),
            global_middleware,
        }
    }

    #[must_use]
    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn registry_mut(&mut self) -> &mut Registry {
        &mut self.registry
    }

    /// Namespace controller identifiers are resolved against
    #[must_use]
    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    #[must_use]
    pub fn global_middleware(&self) -> &[String] {
        &self.global_middleware
    }

    /// Middleware wrapping `route`, outermost first: the global list followed
    /// by the route's own middleware.
    ///
    /// # Errors
    ///
    /// `MiddlewareNotFound` or `MiddlewareContractViolation` for the first
    /// name that does not resolve to a registered middleware.
    pub fn middleware_chain(&self, route: &Route) -> Result<Vec<Arc<dyn Middleware>>, RouterError> {
        self.global_middleware
            .iter()
            .map(String::as_str)
            .chain(route.middleware())
            .map(|name| self.registry.resolve_middleware(name))
            .collect()
    }

    /// Run the handler of `ctx.route()` inside its middleware chain.
    ///
    /// The controller type is checked before any middleware runs; the
    /// controller itself is only constructed when the innermost continuation
    /// is invoked, so a short-circuiting middleware never instantiates it.
    ///
    /// # Errors
    ///
    /// Any [`RouterError`] raised while resolving components, or returned by
    /// middleware or the handler.
    pub fn dispatch(&self, ctx: &RequestContext<'_>) -> HandlerResult {
        let route = ctx.route();
        let target = self.resolve_target(route)?;
        let chain = self.middleware_chain(route)?;

        debug!(
            request_id = %ctx.request_id(),
            route = %route.uri(),
            handler = %route.handler().describe(),
            middleware_count = chain.len(),
            "Dispatching request"
        );

        let endpoint = || match &target {
            Target::Inline(handler) => handler(ctx.params()),
            Target::Controller { name, method } => self.invoke_controller(name, method, ctx),
        };
        run_chain(&chain, ctx, &endpoint)
    }

    fn resolve_target<'a>(&self, route: &'a Route) -> Result<Target<'a>, RouterError> {
        match route.handler() {
            Handler::Inline(handler) => Ok(Target::Inline(handler.as_ref())),
            Handler::Controller { controller, method } => {
                let name = qualify(&self.namespace, controller);
                if !self.registry.has_controller(&name) {
                    return Err(RouterError::ControllerNotFound { controller: name });
                }
                Ok(Target::Controller { name, method })
            }
        }
    }

    fn invoke_controller(&self, name: &str, method: &str, ctx: &RequestContext<'_>) -> HandlerResult {
        let router = ctx.router();
        let args = ControllerArgs {
            base_path: router.base_path(),
            router,
            config: router.config(),
            context: ctx,
        };
        let mut controller = self.registry.create_controller(name, &args)?;
        controller
            .call(method, ctx.params())
            .unwrap_or_else(|| {
                Err(RouterError::ControllerMethodNotFound {
                    controller: name.to_string(),
                    method: method.to_string(),
                })
            })
    }
}
