//! Error taxonomy for routing and dispatch.
//!
//! Every variant maps to a numeric code through [`RouterError::code`]. The code
//! becomes the status of the error [`Response`](crate::response::Response)
//! produced by [`Router::handle`](crate::router::Router::handle), which is the
//! single place where dispatch failures are turned into responses.
//!
//! Registration-time variants (`InvalidHandlerDescriptor`, `InvalidOptions`)
//! are returned straight to the integrator and never reach `handle`.

use thiserror::Error;

/// Result returned by handlers, controllers and middleware.
pub type HandlerResult = Result<crate::response::Response, RouterError>;

/// Failure raised while registering, matching or dispatching a route.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RouterError {
    /// No route matches the request method and path.
    #[error("Page is Not Found")]
    NotFound,

    /// The controller named by the handler descriptor is not registered.
    #[error("Controller Not Found")]
    ControllerNotFound {
        /// Fully qualified controller identifier that failed to resolve
        controller: String,
    },

    /// The controller exists but does not expose the named method.
    #[error("Controller Method Not Found")]
    ControllerMethodNotFound {
        /// Fully qualified controller identifier
        controller: String,
        /// Method that was requested
        method: String,
    },

    /// The name resolved to a registered component that is not a middleware.
    #[error("Given Middleware does not comply with the MiddlewareContract!")]
    MiddlewareContractViolation {
        /// Middleware name as referenced by the route or global list
        middleware: String,
    },

    /// No component is registered under the middleware name.
    #[error("Middleware - {middleware} not found.")]
    MiddlewareNotFound {
        /// Middleware name as referenced by the route or global list
        middleware: String,
    },

    /// The handler given at registration is neither a callable nor a valid
    /// `Controller@method` descriptor.
    #[error("Invalid handler descriptor '{descriptor}'. Expect 'Controller@method' or a callable")]
    InvalidHandlerDescriptor {
        /// The rejected descriptor text
        descriptor: String,
    },

    /// A route option failed validation at registration.
    #[error("Invalid route option '{option}': {reason}")]
    InvalidOptions {
        /// Option key
        option: String,
        /// Why the value was rejected
        reason: String,
    },

    /// Failure raised by application code with its own message and code.
    #[error("{message}")]
    Handler {
        /// Message surfaced as the error response body
        message: String,
        /// Code surfaced as the error response status
        code: u16,
    },
}

impl RouterError {
    /// Build an application-level failure with an explicit code.
    pub fn handler(message: impl Into<String>, code: u16) -> Self {
        RouterError::Handler {
            message: message.into(),
            code,
        }
    }

    /// Numeric code associated with the failure.
    #[must_use]
    pub fn code(&self) -> u16 {
        match self {
            RouterError::NotFound => 404,
            RouterError::ControllerNotFound { .. } => 604,
            RouterError::ControllerMethodNotFound { .. } => 605,
            RouterError::MiddlewareContractViolation { .. } => 600,
            RouterError::MiddlewareNotFound { .. } => 604,
            RouterError::InvalidHandlerDescriptor { .. } => 500,
            RouterError::InvalidOptions { .. } => 500,
            RouterError::Handler { code, .. } => *code,
        }
    }

    /// Whether this failure can only occur while registering routes.
    #[must_use]
    pub fn is_registration_error(&self) -> bool {
        matches!(
            self,
            RouterError::InvalidHandlerDescriptor { .. } | RouterError::InvalidOptions { .. }
        )
    }
}
