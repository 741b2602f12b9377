//! Route template compiler.
//!
//! Turns a URI template such as `/users/{id:num}` into an anchored regex with
//! one named capture per placeholder, plus the ordered list of
//! [`ParameterSpec`]s describing those placeholders.
//!
//! Placeholder syntax is `{name[:modifier]...}` where the body may only contain
//! ASCII letters, digits, `:`, `?` and `=`:
//!
//! | Modifier | Capture | Effect |
//! |---|---|---|
//! | *(none)* | `[^/]+` | string |
//! | `num`, `i` | `[0-9]+` | integer |
//! | `alpha`, `a` | `[0-9A-Za-z_]+` | word characters only |
//! | `?` | appends `?` | optional |
//! | `default...` | appends `?` | optional; `default=VALUE` also sets the default |
//!
//! Type modifiers replace the capture pattern built so far, so the last one
//! wins. Compilation never fails: a template that does not yield a valid regex
//! (empty or duplicate parameter names, names starting with a digit) compiles
//! to a pattern that matches nothing.

use std::fmt;
use std::sync::Arc;

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::{debug, warn};

use super::params::{bind, Params};

#[allow(clippy::expect_used)]
static PLACEHOLDER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\{([a-zA-Z0-9:?=]+)\}").expect("placeholder scanner regex is valid")
});

const ANY_SEGMENT: &str = "(?:[^/]+)";
const DIGITS: &str = "(?:[0-9]+)";
const WORD: &str = "(?:[0-9A-Za-z_]+)";

/// Type constraint declared for a placeholder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ParamKind {
    /// Any run of non-slash characters
    #[default]
    String,
    /// Digits only, bound as an integer
    Integer,
    /// Word characters only
    Alpha,
}

impl fmt::Display for ParamKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParamKind::String => write!(f, "string"),
            ParamKind::Integer => write!(f, "integer"),
            ParamKind::Alpha => write!(f, "alpha"),
        }
    }
}

/// One placeholder of a URI template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParameterSpec {
    /// Parameter name; shared with every binding produced for it
    pub name: Arc<str>,
    /// Declared type constraint
    pub kind: ParamKind,
    /// Whether the segment may be empty
    pub optional: bool,
    /// Value substituted when an optional segment is empty
    pub default: Option<String>,
}

impl ParameterSpec {
    fn named(name: &str) -> Self {
        Self {
            name: Arc::from(name),
            kind: ParamKind::String,
            optional: false,
            default: None,
        }
    }
}

/// Compiled form of a URI template.
///
/// Cloning is cheap relative to compiling: the regex shares its program.
#[derive(Debug, Clone)]
pub struct PathPattern {
    template: String,
    source: String,
    regex: Option<Regex>,
    parameters: Vec<ParameterSpec>,
}

impl PathPattern {
    /// Compile `template` into a matcher and its parameter list.
    ///
    /// # Example
    ///
    /// ```
    /// use routecore::router::{ParamKind, PathPattern};
    ///
    /// let pattern = PathPattern::compile("/users/{id:num}");
    /// assert_eq!(pattern.source(), "^/users/(?P<id>(?:[0-9]+))$");
    /// assert_eq!(pattern.parameters()[0].kind, ParamKind::Integer);
    /// assert!(pattern.is_match("/users/42"));
    /// assert!(!pattern.is_match("/users/abc"));
    /// ```
    #[must_use]
    pub fn compile(template: &str) -> Self {
        let mut source = String::with_capacity(template.len() + 16);
        source.push('^');
        let mut parameters = Vec::with_capacity(template.matches('{').count());
        let mut literal_start = 0;

        for caps in PLACEHOLDER.captures_iter(template) {
            let (Some(whole), Some(body)) = (caps.get(0), caps.get(1)) else {
                continue;
            };
            source.push_str(&regex::escape(&template[literal_start..whole.start()]));

            let (spec, capture) = parse_placeholder(body.as_str());
            source.push_str("(?P<");
            source.push_str(&spec.name);
            source.push('>');
            source.push_str(&capture);
            source.push(')');

            parameters.push(spec);
            literal_start = whole.end();
        }

        source.push_str(&regex::escape(&template[literal_start..]));
        source.push('$');

        let regex = match Regex::new(&source) {
            Ok(regex) => Some(regex),
            Err(err) => {
                warn!(
                    template = %template,
                    pattern = %source,
                    error = %err,
                    "Route template does not compile; it will never match"
                );
                None
            }
        };

        debug!(
            template = %template,
            pattern = %source,
            parameters = parameters.len(),
            "Compiled route template"
        );

        Self {
            template: template.to_string(),
            source,
            regex,
            parameters,
        }
    }

    /// The template this pattern was compiled from.
    #[must_use]
    pub fn template(&self) -> &str {
        &self.template
    }

    /// The generated regex source, anchored at both ends.
    #[must_use]
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Placeholders in order of first appearance.
    #[must_use]
    pub fn parameters(&self) -> &[ParameterSpec] {
        &self.parameters
    }

    /// Whether the template contains no placeholders.
    #[must_use]
    pub fn is_literal(&self) -> bool {
        self.parameters.is_empty()
    }

    /// Whether the template produced a usable matcher.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.regex.is_some()
    }

    /// Test `path` against the full pattern without binding values.
    #[must_use]
    pub fn is_match(&self, path: &str) -> bool {
        self.regex.as_ref().is_some_and(|re| re.is_match(path))
    }

    /// Match `path` and bind every placeholder.
    ///
    /// Returns `None` when the path does not match in full.
    #[must_use]
    pub fn captures(&self, path: &str) -> Option<Params> {
        let caps = self.regex.as_ref()?.captures(path)?;
        Some(bind(&self.parameters, &caps))
    }
}

impl PartialEq for PathPattern {
    fn eq(&self, other: &Self) -> bool {
        self.source == other.source && self.parameters == other.parameters
    }
}

/// Split a placeholder body into its spec and capture expression.
fn parse_placeholder(body: &str) -> (ParameterSpec, String) {
    let mut parts = body.split(':');
    let name = parts.next().unwrap_or_default();
    let mut spec = ParameterSpec::named(name);
    let mut capture = String::from(ANY_SEGMENT);

    for modifier in parts {
        match modifier {
            "num" | "i" => {
                spec.kind = ParamKind::Integer;
                capture = String::from(DIGITS);
            }
            "alpha" | "a" => {
                spec.kind = ParamKind::Alpha;
                capture = String::from(WORD);
            }
            _ => {}
        }

        let is_default = modifier.starts_with("default");
        if modifier == "?" || is_default {
            spec.optional = true;
            capture.push('?');
        }
        if let Some(value) = modifier.strip_prefix("default=") {
            spec.default = Some(value.split('=').next().unwrap_or_default().to_string());
        }
    }

    (spec, capture)
}
