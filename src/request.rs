//! Request accessor contract.
//!
//! The router only needs the HTTP method and the normalised path of a request.
//! Anything that can answer those two questions can be routed: the crate's own
//! [`Request`] value, or an `http::Request<B>` from the hosting server.

use http::Method;

use crate::ids::RequestId;

/// Accessors the router reads from an incoming request.
pub trait HttpRequest {
    /// HTTP method, already uppercase.
    fn http_method(&self) -> &Method;

    /// Path without query string, already normalised by the host.
    fn request_path(&self) -> &str;

    /// Correlation id supplied by the caller, if any.
    fn request_id(&self) -> Option<RequestId> {
        None
    }
}

/// Minimal owned request used when no server request type is at hand.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    method: Method,
    path: String,
    request_id: Option<RequestId>,
}

impl Request {
    #[must_use]
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            request_id: None,
        }
    }

    /// Build from a textual method, uppercasing it first.
    ///
    /// # Errors
    ///
    /// Fails when the method is not a valid HTTP token.
    pub fn parse(method: &str, path: impl Into<String>) -> Result<Self, http::method::InvalidMethod> {
        let method = Method::from_bytes(method.to_ascii_uppercase().as_bytes())?;
        Ok(Self::new(method, path))
    }

    #[must_use]
    pub fn with_request_id(mut self, id: RequestId) -> Self {
        self.request_id = Some(id);
        self
    }

    #[must_use]
    pub fn method(&self) -> &Method {
        &self.method
    }

    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }
}

impl HttpRequest for Request {
    fn http_method(&self) -> &Method {
        &self.method
    }

    fn request_path(&self) -> &str {
        &self.path
    }

    fn request_id(&self) -> Option<RequestId> {
        self.request_id
    }
}

impl<B> HttpRequest for http::Request<B> {
    fn http_method(&self) -> &Method {
        self.method()
    }

    fn request_path(&self) -> &str {
        self.uri().path()
    }

    fn request_id(&self) -> Option<RequestId> {
        self.headers()
            .get("x-request-id")
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.trim().parse().ok())
    }
}
