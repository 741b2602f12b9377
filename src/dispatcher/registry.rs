use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use tracing::{info, warn};

use super::RequestContext;
use crate::config::Config;
use crate::error::{HandlerResult, RouterError};
use crate::middleware::Middleware;
use crate::router::{Params, Router};

/// Application object exposing named methods to `Controller@method` routes.
///
/// A fresh instance is constructed for every invocation, so implementors may
/// keep per-request state in `&mut self`.
pub trait Controller {
    /// Invoke `method` with the bound parameters.
    ///
    /// Returns `None` when the controller has no such method, which the
    /// dispatcher reports as `ControllerMethodNotFound`.
    fn call(&mut self, method: &str, params: &Params) -> Option<HandlerResult>;
}

/// Fixed argument list the router supplies when constructing a controller.
pub struct ControllerArgs<'a> {
    /// Application base path the router was created with
    pub base_path: &'a str,
    /// The router handling the request
    pub router: &'a Router,
    /// Global configuration accessor
    pub config: &'a dyn Config,
    /// Current request (matched route, bound values, options)
    pub context: &'a RequestContext<'a>,
}

/// Constructor registered for a controller identifier.
pub type ControllerFactory = Arc<dyn Fn(&ControllerArgs<'_>) -> Box<dyn Controller> + Send + Sync>;

#[derive(Clone)]
enum Component {
    Controller(ControllerFactory),
    Middleware(Arc<dyn Middleware>),
}

impl Component {
    fn kind(&self) -> &'static str {
        match self {
            Component::Controller(_) => "controller",
            Component::Middleware(_) => "middleware",
        }
    }
}

/// Name → component registry populated at startup.
///
/// This is the only place where controllers and middleware are looked up by
/// name. Both kinds share one namespace, so a name registered as a controller
/// and referenced as a middleware is reported as a contract violation.
#[derive(Clone, Default)]
pub struct Registry {
    components: HashMap<String, Component>,
}

impl Registry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a controller constructor under its fully qualified name.
    ///
    /// An existing component with the same name is replaced.
    pub fn register_controller<F>(&mut self, name: &str, factory: F)
    where
        F: Fn(&ControllerArgs<'_>) -> Box<dyn Controller> + Send + Sync + 'static,
    {
        self.insert(name, Component::Controller(Arc::new(factory)));
    }

    /// Register a middleware instance under `name`.
    ///
    /// An existing component with the same name is replaced.
    pub fn register_middleware(&mut self, name: &str, middleware: Arc<dyn Middleware>) {
        self.insert(name, Component::Middleware(middleware));
    }

    fn insert(&mut self, name: &str, component: Component) {
        let kind = component.kind();
        if let Some(old) = self.components.insert(name.to_string(), component) {
            warn!(
                name = %name,
                kind,
                previous_kind = old.kind(),
                "Replaced existing component"
            );
        } else {
            info!(
                name = %name,
                kind,
                total_components = self.components.len(),
                "Component registered"
            );
        }
    }

    #[must_use]
    pub fn has_controller(&self, name: &str) -> bool {
        matches!(self.components.get(name), Some(Component::Controller(_)))
    }

    #[must_use]
    pub fn has_middleware(&self, name: &str) -> bool {
        matches!(self.components.get(name), Some(Component::Middleware(_)))
    }

    /// Construct the controller registered under `name`.
    ///
    /// # Errors
    ///
    /// `ControllerNotFound` when `name` is not a registered controller.
    pub fn create_controller(
        &self,
        name: &str,
        args: &ControllerArgs<'_>,
    ) -> Result<Box<dyn Controller>, RouterError> {
        match self.components.get(name) {
            Some(Component::Controller(factory)) => Ok(factory(args)),
            _ => Err(RouterError::ControllerNotFound {
                controller: name.to_string(),
            }),
        }
    }

    /// Look up the middleware registered under `name`.
    ///
    /// # Errors
    ///
    /// `MiddlewareNotFound` when nothing is registered under `name`,
    /// `MiddlewareContractViolation` when `name` is not a middleware.
    pub fn resolve_middleware(&self, name: &str) -> Result<Arc<dyn Middleware>, RouterError> {
        match self.components.get(name) {
            Some(Component::Middleware(mw)) => Ok(Arc::clone(mw)),
            Some(Component::Controller(_)) => Err(RouterError::MiddlewareContractViolation {
                middleware: name.to_string(),
            }),
            None => Err(RouterError::MiddlewareNotFound {
                middleware: name.to_string(),
            }),
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.components.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }
}

impl fmt::Debug for Registry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<(&str, &str)> = self
            .components
            .iter()
            .map(|(name, c)| (name.as_str(), c.kind()))
            .collect();
        names.sort_unstable();
        f.debug_struct("Registry").field("components", &names).finish()
    }
}

/// Resolve a controller identifier against the configured namespace.
#[must_use]
pub fn qualify(namespace: &str, controller: &str) -> String {
    let namespace = namespace.trim_end_matches(':');
    let controller = controller.trim_start_matches(':');
    if namespace.is_empty() {
        controller.to_string()
    } else {
        format!("{namespace}::{controller}")
    }
}
