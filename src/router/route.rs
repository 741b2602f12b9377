use std::fmt;
use std::sync::Arc;

use http::Method;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use smallvec::SmallVec;

use super::params::Params;
use super::pattern::{ParameterSpec, PathPattern};
use crate::error::{HandlerResult, RouterError};

/// Closure invoked with the bound parameters as its only argument.
pub type InlineHandler = Arc<dyn Fn(&Params) -> HandlerResult + Send + Sync>;

/// What a route runs once matched.
#[derive(Clone)]
pub enum Handler {
    /// Called directly with the bound parameters
    Inline(InlineHandler),
    /// Resolved through the controller registry at dispatch time
    Controller {
        /// Identifier relative to the configured controller namespace
        controller: String,
        /// Method invoked on the constructed controller
        method: String,
    },
}

impl Handler {
    /// Wrap a closure as an inline handler.
    pub fn inline<F>(f: F) -> Self
    where
        F: Fn(&Params) -> HandlerResult + Send + Sync + 'static,
    {
        Handler::Inline(Arc::new(f))
    }

    /// Build a `(controller, method)` descriptor.
    ///
    /// # Errors
    ///
    /// `InvalidHandlerDescriptor` when either side is blank.
    pub fn controller(
        controller: impl Into<String>,
        method: impl Into<String>,
    ) -> Result<Self, RouterError> {
        let controller = controller.into();
        let method = method.into();
        if controller.trim().is_empty() || method.trim().is_empty() {
            return Err(RouterError::InvalidHandlerDescriptor {
                descriptor: format!("{controller}@{method}"),
            });
        }
        Ok(Handler::Controller { controller, method })
    }

    /// Parse a `Controller@method` descriptor.
    ///
    /// # Errors
    ///
    /// `InvalidHandlerDescriptor` when there is no `@` or either side is blank.
    pub fn parse(descriptor: &str) -> Result<Self, RouterError> {
        match descriptor.split_once('@') {
            Some((controller, method)) => Self::controller(controller.trim(), method.trim()),
            None => Err(RouterError::InvalidHandlerDescriptor {
                descriptor: descriptor.to_string(),
            }),
        }
    }

    /// Human readable form used in logs.
    #[must_use]
    pub fn describe(&self) -> String {
        match self {
            Handler::Inline(_) => String::from("<inline>"),
            Handler::Controller { controller, method } => format!("{controller}@{method}"),
        }
    }
}

impl fmt::Debug for Handler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Handler::Inline(_) => f.write_str("Handler::Inline(..)"),
            Handler::Controller { controller, method } => f
                .debug_struct("Handler::Controller")
                .field("controller", controller)
                .field("method", method)
                .finish(),
        }
    }
}

/// Conversion accepted by the registration API.
///
/// Validation happens here, at registration, so a malformed descriptor is
/// reported to the integrator rather than to a client.
pub trait IntoHandler {
    fn into_handler(self) -> Result<Handler, RouterError>;
}

impl IntoHandler for Handler {
    fn into_handler(self) -> Result<Handler, RouterError> {
        Ok(self)
    }
}

impl IntoHandler for &str {
    fn into_handler(self) -> Result<Handler, RouterError> {
        Handler::parse(self)
    }
}

impl IntoHandler for String {
    fn into_handler(self) -> Result<Handler, RouterError> {
        Handler::parse(&self)
    }
}

impl IntoHandler for (&str, &str) {
    fn into_handler(self) -> Result<Handler, RouterError> {
        Handler::controller(self.0, self.1)
    }
}

impl IntoHandler for (String, String) {
    fn into_handler(self) -> Result<Handler, RouterError> {
        Handler::controller(self.0, self.1)
    }
}

/// Known route options.
///
/// Unknown keys from a deserialised option bag are kept in `extra` so
/// handlers and middleware can still read them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RouteOptions {
    /// Path prefix joined in front of the route template
    pub prefix: Option<String>,
    /// Name of the middleware wrapping this route
    pub middleware: Option<String>,
    /// Whether responses for this route may be cached by the host
    pub cacheable: Option<bool>,
    /// Free-form variables attached to the route
    pub variables: Option<Map<String, Value>>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl RouteOptions {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Deserialise and validate an option bag.
    ///
    /// # Errors
    ///
    /// `InvalidOptions` when a known key has the wrong type or fails validation.
    pub fn from_value(value: Value) -> Result<Self, RouterError> {
        let options: RouteOptions =
            serde_json::from_value(value).map_err(|e| RouterError::InvalidOptions {
                option: String::from("options"),
                reason: e.to_string(),
            })?;
        options.validate()?;
        Ok(options)
    }

    #[must_use]
    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = Some(prefix.into());
        self
    }

    #[must_use]
    pub fn with_middleware(mut self, middleware: impl Into<String>) -> Self {
        self.middleware = Some(middleware.into());
        self
    }

    #[must_use]
    pub fn with_cacheable(mut self, cacheable: bool) -> Self {
        self.cacheable = Some(cacheable);
        self
    }

    #[must_use]
    pub fn with_variable(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.variables
            .get_or_insert_with(Map::new)
            .insert(key.into(), value.into());
        self
    }

    #[must_use]
    pub fn is_cacheable(&self) -> bool {
        self.cacheable.unwrap_or(false)
    }

    #[must_use]
    pub fn variable(&self, key: &str) -> Option<&Value> {
        self.variables.as_ref().and_then(|vars| vars.get(key))
    }

    /// Reject option values that cannot produce a usable route.
    ///
    /// # Errors
    ///
    /// `InvalidOptions` for a prefix with no path segment or a blank middleware name.
    pub fn validate(&self) -> Result<(), RouterError> {
        if let Some(prefix) = &self.prefix {
            if prefix.trim_matches('/').is_empty() {
                return Err(RouterError::InvalidOptions {
                    option: String::from("prefix"),
                    reason: format!("'{prefix}' contains no path segment"),
                });
            }
        }
        if let Some(middleware) = &self.middleware {
            if middleware.trim().is_empty() {
                return Err(RouterError::InvalidOptions {
                    option: String::from("middleware"),
                    reason: String::from("middleware name is blank"),
                });
            }
        }
        Ok(())
    }

    /// Apply ambient group options on top of these route options.
    ///
    /// Every option the group sets replaces the route's own value.
    #[must_use]
    pub fn merged_with(mut self, ambient: &RouteOptions) -> Self {
        if ambient.prefix.is_some() {
            self.prefix.clone_from(&ambient.prefix);
        }
        if ambient.middleware.is_some() {
            self.middleware.clone_from(&ambient.middleware);
        }
        if ambient.cacheable.is_some() {
            self.cacheable = ambient.cacheable;
        }
        if ambient.variables.is_some() {
            self.variables.clone_from(&ambient.variables);
        }
        self.extra
            .extend(ambient.extra.iter().map(|(k, v)| (k.clone(), v.clone())));
        self
    }

    /// Combine an enclosing group's options with a nested group's.
    ///
    /// Prefixes concatenate; the inner group wins for everything else.
    #[must_use]
    pub(crate) fn nest(&self, inner: RouteOptions) -> RouteOptions {
        let prefix = match (&self.prefix, &inner.prefix) {
            (Some(outer), Some(inner)) => Some(join_prefix(outer, inner)),
            (outer, inner) => inner.clone().or_else(|| outer.clone()),
        };
        let mut nested = self.clone().merged_with(&inner);
        nested.prefix = prefix;
        nested
    }
}

impl From<()> for RouteOptions {
    fn from(_: ()) -> Self {
        RouteOptions::default()
    }
}

/// Join a prefix and a template: `/` + trimmed prefix + `/` + template without
/// its leading slashes.
///
/// ```
/// use routecore::router::join_prefix;
///
/// assert_eq!(join_prefix("/api/", "/users"), "/api/users");
/// assert_eq!(join_prefix("api", "/"), "/api/");
/// ```
#[must_use]
pub fn join_prefix(prefix: &str, uri: &str) -> String {
    let prefix = prefix.trim_matches('/');
    let uri = uri.trim_start_matches('/');
    let mut joined = String::with_capacity(prefix.len() + uri.len() + 2);
    joined.push('/');
    joined.push_str(prefix);
    joined.push('/');
    joined.push_str(uri);
    joined
}

/// A registered route: methods, compiled template, handler and options.
///
/// Routes carry no per-request state; bindings are returned separately by
/// [`Route::match_path`].
#[derive(Debug, Clone)]
pub struct Route {
    uri: String,
    pattern: PathPattern,
    methods: SmallVec<[Method; 5]>,
    handler: Handler,
    options: RouteOptions,
}

impl Route {
    /// Build a route, applying the `prefix` option before compiling.
    ///
    /// # Errors
    ///
    /// `InvalidOptions` when the options fail validation.
    pub fn new(
        uri: &str,
        methods: &[Method],
        handler: Handler,
        options: RouteOptions,
    ) -> Result<Self, RouterError> {
        options.validate()?;
        let uri = match options.prefix.as_deref() {
            Some(prefix) => join_prefix(prefix, uri),
            None => uri.to_string(),
        };
        let pattern = PathPattern::compile(&uri);
        Ok(Self {
            uri,
            pattern,
            methods: methods.iter().cloned().collect(),
            handler,
            options,
        })
    }

    /// Effective template, including any prefix.
    #[must_use]
    pub fn uri(&self) -> &str {
        &self.uri
    }

    /// Replace the template and recompile the matcher.
    pub fn set_uri(&mut self, uri: impl Into<String>) {
        self.uri = uri.into();
        self.pattern = PathPattern::compile(&self.uri);
    }

    #[must_use]
    pub fn pattern(&self) -> &PathPattern {
        &self.pattern
    }

    #[must_use]
    pub fn parameters(&self) -> &[ParameterSpec] {
        self.pattern.parameters()
    }

    #[must_use]
    pub fn methods(&self) -> &[Method] {
        &self.methods
    }

    #[must_use]
    pub fn handler(&self) -> &Handler {
        &self.handler
    }

    #[must_use]
    pub fn options(&self) -> &RouteOptions {
        &self.options
    }

    #[must_use]
    pub fn middleware(&self) -> Option<&str> {
        self.options.middleware.as_deref()
    }

    #[must_use]
    pub fn has_middleware(&self) -> bool {
        self.options.middleware.is_some()
    }

    #[must_use]
    pub fn is_cacheable(&self) -> bool {
        self.options.is_cacheable()
    }

    /// Match `path` in full and return the bound parameters.
    #[must_use]
    pub fn match_path(&self, path: &str) -> Option<Params> {
        self.pattern.captures(path)
    }
}
