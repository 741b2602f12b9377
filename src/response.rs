//! Response construction contract.
//!
//! A response is a numeric status plus a JSON body. The status is a plain
//! `u16` rather than an HTTP status type because error responses carry the
//! framework's own codes (604, 605, ...) unchanged.

use std::sync::Arc;

use serde::Serialize;
use serde_json::Value;
use smallvec::SmallVec;

use crate::error::RouterError;

/// Maximum inline headers before heap allocation.
pub const MAX_INLINE_HEADERS: usize = 16;

/// Stack-allocated header storage.
pub type HeaderVec = SmallVec<[(Arc<str>, String); MAX_INLINE_HEADERS]>;

/// Response produced by a handler, a middleware, or error translation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Response {
    /// Status code (200, 404, 604, ...)
    pub status: u16,
    /// Response headers
    #[serde(skip_serializing)]
    pub headers: HeaderVec,
    /// Response body
    pub body: Value,
}

impl Response {
    /// Create a response from a body and a status code.
    #[must_use]
    pub fn new(body: impl Into<Value>, status: u16) -> Self {
        Self {
            status,
            headers: HeaderVec::new(),
            body: body.into(),
        }
    }

    /// `200` with the given body.
    #[must_use]
    pub fn ok(body: impl Into<Value>) -> Self {
        Self::new(body, 200)
    }

    /// Create a JSON response with a content-type header.
    #[must_use]
    pub fn json(status: u16, body: Value) -> Self {
        let mut response = Self::new(body, status);
        response.set_header("content-type", String::from("application/json"));
        response
    }

    /// Translate a failure: the message becomes the body, the code the status.
    #[must_use]
    pub fn from_error(err: &RouterError) -> Self {
        Self::new(err.to_string(), err.code())
    }

    /// The body as text when it is a JSON string.
    #[must_use]
    pub fn body_str(&self) -> Option<&str> {
        self.body.as_str()
    }

    #[must_use]
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Get a header by name (case-insensitive)
    #[inline]
    #[must_use]
    pub fn get_header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Add or replace a header
    pub fn set_header(&mut self, name: &str, value: String) {
        self.headers.retain(|(k, _)| !k.eq_ignore_ascii_case(name));
        self.headers.push((Arc::from(name), value));
    }
}

impl From<&str> for Response {
    fn from(body: &str) -> Self {
        Response::ok(body)
    }
}

impl From<String> for Response {
    fn from(body: String) -> Self {
        Response::ok(body)
    }
}

impl From<Value> for Response {
    fn from(body: Value) -> Self {
        Response::ok(body)
    }
}

impl From<RouterError> for Response {
    fn from(err: RouterError) -> Self {
        Response::from_error(&err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_translation_uses_message_and_code() {
        let res = Response::from_error(&RouterError::ControllerMethodNotFound {
            controller: "app::Users".into(),
            method: "nope".into(),
        });
        assert_eq!(res.status, 605);
        assert_eq!(res.body_str(), Some("Controller Method Not Found"));
        assert!(!res.is_success());
    }

    #[test]
    fn headers_are_case_insensitive_and_replaced() {
        let mut res = Response::json(201, serde_json::json!({"id": 1}));
        assert_eq!(res.get_header("Content-Type"), Some("application/json"));
        res.set_header("CONTENT-TYPE", "text/plain".into());
        assert_eq!(res.headers.len(), 1);
        assert_eq!(res.get_header("content-type"), Some("text/plain"));
    }
}
