//! Bound path parameters.
//!
//! Bindings are produced per match and never stored on the route, so a shared
//! route table can serve concurrent requests without cross-talk.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use regex::Captures;
use serde::Serialize;
use serde_json::Value;
use smallvec::SmallVec;

use super::pattern::{ParamKind, ParameterSpec};

/// Maximum number of path parameters stored inline before spilling to the heap.
/// Templates rarely carry more than a handful of placeholders.
pub const MAX_INLINE_PARAMS: usize = 8;

/// Inline storage for `(name, value)` pairs in template order.
///
/// Names are `Arc<str>` handed out by the compiled [`ParameterSpec`], so
/// binding a name is a reference-count bump rather than a string copy.
pub type ParamVec = SmallVec<[(Arc<str>, ParamValue); MAX_INLINE_PARAMS]>;

/// Value bound to a placeholder.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(untagged)]
pub enum ParamValue {
    /// Captured from an `integer` placeholder
    Integer(i64),
    /// Captured text, or a declared default
    Text(String),
    /// Optional placeholder left empty with no declared default
    Null,
}

impl ParamValue {
    #[must_use]
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            ParamValue::Integer(v) => Some(*v),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            ParamValue::Text(v) => Some(v),
            _ => None,
        }
    }

    #[must_use]
    pub fn is_null(&self) -> bool {
        matches!(self, ParamValue::Null)
    }
}

impl fmt::Display for ParamValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParamValue::Integer(v) => write!(f, "{v}"),
            ParamValue::Text(v) => f.write_str(v),
            ParamValue::Null => f.write_str("null"),
        }
    }
}

impl From<i64> for ParamValue {
    fn from(v: i64) -> Self {
        ParamValue::Integer(v)
    }
}

impl From<&str> for ParamValue {
    fn from(v: &str) -> Self {
        ParamValue::Text(v.to_string())
    }
}

impl From<String> for ParamValue {
    fn from(v: String) -> Self {
        ParamValue::Text(v)
    }
}

impl From<ParamValue> for Value {
    fn from(v: ParamValue) -> Self {
        match v {
            ParamValue::Integer(i) => Value::from(i),
            ParamValue::Text(s) => Value::String(s),
            ParamValue::Null => Value::Null,
        }
    }
}

/// Ordered name → value mapping handed to handlers.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Params {
    values: ParamVec,
}

impl Params {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Get a bound value by name.
    ///
    /// Returns `None` only when the route declares no such parameter; an
    /// empty optional placeholder yields `Some(&ParamValue::Null)`.
    #[inline]
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&ParamValue> {
        self.values
            .iter()
            .rfind(|(k, _)| k.as_ref() == name)
            .map(|(_, v)| v)
    }

    #[inline]
    #[must_use]
    pub fn get_i64(&self, name: &str) -> Option<i64> {
        self.get(name).and_then(ParamValue::as_i64)
    }

    #[inline]
    #[must_use]
    pub fn get_str(&self, name: &str) -> Option<&str> {
        self.get(name).and_then(ParamValue::as_str)
    }

    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.values.iter().any(|(k, _)| k.as_ref() == name)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Iterate `(name, value)` pairs in template order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &ParamValue)> {
        self.values.iter().map(|(k, v)| (k.as_ref(), v))
    }

    /// Copy into a `HashMap`.
    /// Allocates; prefer `get()` on the request path.
    #[must_use]
    pub fn to_map(&self) -> HashMap<String, ParamValue> {
        self.values
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }

    /// Render as a JSON object keyed by parameter name.
    #[must_use]
    pub fn to_json(&self) -> Value {
        Value::Object(
            self.values
                .iter()
                .map(|(k, v)| (k.to_string(), Value::from(v.clone())))
                .collect(),
        )
    }

    pub(crate) fn push(&mut self, name: Arc<str>, value: ParamValue) {
        self.values.push((name, value));
    }
}

/// Bind captured groups to their specs.
///
/// Total for any structural match: capture patterns already restrict integer
/// placeholders to ASCII digits, so the only failing parse is overflow, which
/// saturates.
pub(crate) fn bind(specs: &[ParameterSpec], caps: &Captures<'_>) -> Params {
    let mut params = Params::new();
    for spec in specs {
        let raw = caps.name(&spec.name).map_or("", |m| m.as_str());
        let value = if raw.is_empty() && spec.optional {
            match &spec.default {
                Some(default) => ParamValue::Text(default.clone()),
                None => ParamValue::Null,
            }
        } else if spec.kind == ParamKind::Integer {
            ParamValue::Integer(raw.parse().unwrap_or(i64::MAX))
        } else {
            ParamValue::Text(raw.to_string())
        };
        params.push(Arc::clone(&spec.name), value);
    }
    params
}
