use std::any::Any;
use std::fmt;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;
use std::time::{Duration, Instant};

use http::Method;
use tracing::{debug, error, info, warn};

use super::route::{IntoHandler, Route, RouteOptions};
use super::table::RouteTable;
use crate::config::{Config, ConfigMap, RouterSettings};
use crate::dispatcher::{ControllerArgs, Controller, Dispatcher, RequestContext};
use crate::error::{HandlerResult, RouterError};
use crate::ids::RequestId;
use crate::middleware::Middleware;
use crate::request::HttpRequest;
use crate::response::Response;

/// Methods registered by [`Router::any`].
pub const ANY_METHODS: [Method; 5] = [
    Method::GET,
    Method::POST,
    Method::PUT,
    Method::PATCH,
    Method::DELETE,
];

/// Routing facade: registration API, matching and dispatch.
///
/// A `Router` is built once at startup through the registration methods and
/// then only read. [`Router::handle`] takes `&self`, so a built router can be
/// wrapped in an `Arc` and shared by any number of request threads.
///
/// # Example
///
/// ```rust
/// use routecore::{Handler, Request, Response, Router};
///
/// let mut router = Router::default();
/// router
///     .get(
///         "/users/{id:num}",
///         Handler::inline(|params| {
///             Ok(Response::ok(format!("user {}", params.get_i64("id").unwrap_or(0))))
///         }),
///         (),
///     )
///     .unwrap();
///
/// let response = router.handle(&Request::parse("GET", "/users/42").unwrap());
/// assert_eq!(response.status, 200);
/// assert_eq!(response.body_str(), Some("user 42"));
///
/// let missing = router.handle(&Request::parse("GET", "/users/abc").unwrap());
/// assert_eq!(missing.status, 404);
/// ```
pub struct Router {
    base_path: String,
    config: Arc<dyn Config>,
    settings: RouterSettings,
    table: RouteTable,
    dispatcher: Dispatcher,
    /// Options of the enclosing `group` calls, innermost last
    ambient: Vec<RouteOptions>,
}

impl Router {
    /// Create a router for the application rooted at `base_path`.
    ///
    /// The controller namespace and the global middleware list are read from
    /// `config` here, once.
    pub fn new(base_path: impl Into<String>, config: Arc<dyn Config>) -> Self {
        let base_path = base_path.into();
        let settings = RouterSettings::from_config(config.as_ref());
        info!(
            base_path = %base_path,
            controller_namespace = %settings.controller_namespace,
            global_middleware = ?settings.middlewares,
            route_file = %settings.route_file,
            "Router created"
        );
        let dispatcher = Dispatcher::new(
            settings.controller_namespace.clone(),
            settings.middlewares.clone(),
        );
        Self {
            base_path,
            config,
            settings,
            table: RouteTable::new(),
            dispatcher,
            ambient: Vec::new(),
        }
    }

    // --- component registration -------------------------------------------

    /// Register a controller constructor.
    ///
    /// `name` is the fully qualified identifier, i.e. the configured
    /// namespace joined with the identifier used in route descriptors.
    pub fn register_controller<F>(&mut self, name: &str, factory: F) -> &mut Self
    where
        F: Fn(&ControllerArgs<'_>) -> Box<dyn Controller> + Send + Sync + 'static,
    {
        self.dispatcher.registry_mut().register_controller(name, factory);
        self
    }

    /// Register a middleware under the name routes refer to it by.
    pub fn register_middleware(&mut self, name: &str, middleware: Arc<dyn Middleware>) -> &mut Self {
        self.dispatcher
            .registry_mut()
            .register_middleware(name, middleware);
        self
    }

    // --- route registration -----------------------------------------------

    /// Register a `GET` route.
    ///
    /// # Errors
    ///
    /// `InvalidHandlerDescriptor` or `InvalidOptions`.
    pub fn get<H: IntoHandler>(
        &mut self,
        uri: &str,
        handler: H,
        options: impl Into<RouteOptions>,
    ) -> Result<&mut Self, RouterError> {
        self.add_route(&[Method::GET], uri, handler, options)
    }

    /// Register a `POST` route.
    ///
    /// # Errors
    ///
    /// `InvalidHandlerDescriptor` or `InvalidOptions`.
    pub fn post<H: IntoHandler>(
        &mut self,
        uri: &str,
        handler: H,
        options: impl Into<RouteOptions>,
    ) -> Result<&mut Self, RouterError> {
        self.add_route(&[Method::POST], uri, handler, options)
    }

    /// Register a `PUT` route.
    ///
    /// # Errors
    ///
    /// `InvalidHandlerDescriptor` or `InvalidOptions`.
    pub fn put<H: IntoHandler>(
        &mut self,
        uri: &str,
        handler: H,
        options: impl Into<RouteOptions>,
    ) -> Result<&mut Self, RouterError> {
        self.add_route(&[Method::PUT], uri, handler, options)
    }

    /// Register a `PATCH` route.
    ///
    /// # Errors
    ///
    /// `InvalidHandlerDescriptor` or `InvalidOptions`.
    pub fn patch<H: IntoHandler>(
        &mut self,
        uri: &str,
        handler: H,
        options: impl Into<RouteOptions>,
    ) -> Result<&mut Self, RouterError> {
        self.add_route(&[Method::PATCH], uri, handler, options)
    }

    /// Register a `DELETE` route.
    ///
    /// # Errors
    ///
    /// `InvalidHandlerDescriptor` or `InvalidOptions`.
    pub fn delete<H: IntoHandler>(
        &mut self,
        uri: &str,
        handler: H,
        options: impl Into<RouteOptions>,
    ) -> Result<&mut Self, RouterError> {
        self.add_route(&[Method::DELETE], uri, handler, options)
    }

    /// Register one route for every method in [`ANY_METHODS`].
    ///
    /// # Errors
    ///
    /// `InvalidHandlerDescriptor` or `InvalidOptions`.
    pub fn any<H: IntoHandler>(
        &mut self,
        uri: &str,
        handler: H,
        options: impl Into<RouteOptions>,
    ) -> Result<&mut Self, RouterError> {
        self.add_route(&ANY_METHODS, uri, handler, options)
    }

    /// Register a route for an explicit method set.
    ///
    /// Options of the enclosing groups are applied on top of `options`
    /// before the route is compiled.
    ///
    /// # Errors
    ///
    /// `InvalidHandlerDescriptor` when the handler does not parse,
    /// `InvalidOptions` when the merged options fail validation.
    pub fn add_route<H: IntoHandler>(
        &mut self,
        methods: &[Method],
        uri: &str,
        handler: H,
        options: impl Into<RouteOptions>,
    ) -> Result<&mut Self, RouterError> {
        let handler = handler.into_handler()?;
        let mut options = options.into();
        if let Some(ambient) = self.ambient.last() {
            options = options.merged_with(ambient);
        }
        let route = Route::new(uri, methods, handler, options)?;
        self.table.register(route);
        Ok(self)
    }

    /// Register every route added by `routes` with `options` merged in.
    ///
    /// Groups nest: prefixes concatenate and the inner group wins for other
    /// options. The enclosing options are restored when `routes` returns,
    /// whether or not it succeeded.
    ///
    /// # Errors
    ///
    /// `InvalidOptions` for invalid group options, or the first error returned
    /// by `routes`.
    pub fn group<F>(
        &mut self,
        options: impl Into<RouteOptions>,
        routes: F,
    ) -> Result<&mut Self, RouterError>
    where
        F: FnOnce(&mut Router) -> Result<(), RouterError>,
    {
        let options = options.into();
        options.validate()?;
        let ambient = match self.ambient.last() {
            Some(outer) => outer.nest(options),
            None => options,
        };
        debug!(
            prefix = ?ambient.prefix,
            middleware = ?ambient.middleware,
            depth = self.ambient.len() + 1,
            "Entering route group"
        );
        self.ambient.push(ambient);
        let result = routes(self);
        self.ambient.pop();
        result?;
        Ok(self)
    }

    // --- request handling -------------------------------------------------

    /// Route and dispatch `request`, always producing a response.
    ///
    /// This is the only place failures become responses: an unmatched path
    /// yields 404 "Page is Not Found", dispatch failures carry their own
    /// message and code, and a panic in a handler or middleware yields 500.
    pub fn handle<R: HttpRequest + ?Sized>(&self, request: &R) -> Response {
        let request_id = request.request_id().unwrap_or_default();
        let method = request.http_method();
        let path = request.request_path();

        let outcome = catch_unwind(AssertUnwindSafe(|| {
            let ctx = self.resolve(request_id, method, path)?;
            self.run(&ctx)
        }));

        match outcome {
            Ok(Ok(response)) => response,
            Ok(Err(err)) => {
                if err != RouterError::NotFound {
                    error!(
                        request_id = %request_id,
                        method = %method,
                        path = %path,
                        code = err.code(),
                        error = %err,
                        "Dispatch failed"
                    );
                }
                Self::make_error_response(&err)
            }
            Err(panic) => {
                error!(
                    request_id = %request_id,
                    method = %method,
                    path = %path,
                    panic_message = %panic_message(panic.as_ref()),
                    "Handler panicked"
                );
                Response::new("Internal Server Error", 500)
            }
        }
    }

    /// Match `request` and build its per-request context.
    ///
    /// # Errors
    ///
    /// `NotFound` when no route registered for the method matches the path.
    pub fn parse<R: HttpRequest + ?Sized>(
        &self,
        request: &R,
    ) -> Result<RequestContext<'_>, RouterError> {
        self.resolve(
            request.request_id().unwrap_or_default(),
            request.http_method(),
            request.request_path(),
        )
    }

    fn resolve(
        &self,
        request_id: RequestId,
        method: &Method,
        path: &str,
    ) -> Result<RequestContext<'_>, RouterError> {
        debug!(
            request_id = %request_id,
            method = %method,
            path = %path,
            "Route match attempt"
        );

        let match_start = Instant::now();
        let result = self.table.find_match(method, path);
        let match_duration = match_start.elapsed();

        match result {
            Ok(found) => {
                if match_duration > Duration::from_millis(1) {
                    warn!(
                        request_id = %request_id,
                        method = %method,
                        path = %path,
                        route = %found.route.uri(),
                        handler = %found.route.handler().describe(),
                        duration_us = match_duration.as_micros(),
                        "Slow route matching detected"
                    );
                } else {
                    info!(
                        request_id = %request_id,
                        method = %method,
                        path = %path,
                        route = %found.route.uri(),
                        handler = %found.route.handler().describe(),
                        params = ?found.params,
                        duration_us = match_duration.as_micros(),
                        "Route matched"
                    );
                }
                Ok(RequestContext::new(
                    request_id,
                    method.clone(),
                    path,
                    found.route,
                    found.params,
                    self,
                ))
            }
            Err(err) => {
                warn!(
                    request_id = %request_id,
                    method = %method,
                    path = %path,
                    duration_us = match_duration.as_micros(),
                    "No route matched"
                );
                Err(err)
            }
        }
    }

    /// Dispatch an already matched request.
    ///
    /// # Errors
    ///
    /// Whatever the dispatcher, a middleware or the handler returns.
    pub fn run(&self, ctx: &RequestContext<'_>) -> HandlerResult {
        self.dispatcher.dispatch(ctx)
    }

    /// Convert a failure to the response a client sees.
    #[must_use]
    pub fn make_error_response(err: &RouterError) -> Response {
        Response::from_error(err)
    }

    // --- accessors --------------------------------------------------------

    #[must_use]
    pub fn base_path(&self) -> &str {
        &self.base_path
    }

    /// Application directory, `{base_path}/app`.
    #[must_use]
    pub fn app_path(&self) -> String {
        format!("{}/app", self.base_path)
    }

    /// Location of the route-definition file the bootstrapper should load.
    #[must_use]
    pub fn route_file(&self) -> String {
        format!("{}{}", self.app_path(), self.settings.route_file)
    }

    #[must_use]
    pub fn config(&self) -> &dyn Config {
        self.config.as_ref()
    }

    #[must_use]
    pub fn settings(&self) -> &RouterSettings {
        &self.settings
    }

    #[must_use]
    pub fn dispatcher(&self) -> &Dispatcher {
        &self.dispatcher
    }

    #[must_use]
    pub fn table(&self) -> &RouteTable {
        &self.table
    }

    /// Routes registered for `method`, in precedence order.
    #[must_use]
    pub fn routes(&self, method: &Method) -> &[Arc<Route>] {
        self.table.routes(method)
    }

    /// Number of `(method, route)` registrations.
    #[must_use]
    pub fn route_count(&self) -> usize {
        self.table.len()
    }

    /// Log every registered route at `info`.
    pub fn dump_routes(&self) {
        let mut methods: Vec<&Method> = self.table.methods().collect();
        methods.sort_by(|a, b| a.as_str().cmp(b.as_str()));
        for method in methods {
            for route in self.table.routes(method) {
                info!(
                    method = %method,
                    uri = %route.uri(),
                    handler = %route.handler().describe(),
                    middleware = route.middleware().unwrap_or("-"),
                    cacheable = route.is_cacheable(),
                    "Registered route"
                );
            }
        }
    }
}

impl Default for Router {
    fn default() -> Self {
        Self::new("", Arc::new(ConfigMap::new()))
    }
}

impl fmt::Debug for Router {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Router")
            .field("base_path", &self.base_path)
            .field("settings", &self.settings)
            .field("routes", &self.table.len())
            .field("dispatcher", &self.dispatcher)
            .finish_non_exhaustive()
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        String::from("non-string panic payload")
    }
}
