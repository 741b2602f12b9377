//! # Configuration
//!
//! The router reads a handful of settings through the [`Config`] accessor
//! contract. Keys are colon-separated paths into a nested tree, so
//! `router:controllerNamespace` reads `router.controllerNamespace`.
//!
//! [`ConfigMap`] is the bundled implementation. It can be built in code or
//! loaded from YAML, TOML or JSON:
//!
//! ```yaml
//! router:
//!   controllerNamespace: app::controllers
//!   routeFile: /routes.yaml
//!   middlewares:
//!     - tracing
//! ```
//!
//! ## Router settings
//!
//! | Key | Default | Meaning |
//! |---|---|---|
//! | `router:controllerNamespace` | `""` | prefix joined to controller identifiers with `::` |
//! | `router:middlewares` | `[]` | global middleware names, outermost first |
//! | `router:routeFile` | `/routes.yaml` | route definition file, relative to the app path |

use std::fs;
use std::path::Path;

use anyhow::{bail, Context, Result};
use serde_json::{Map, Value};

/// Key/default lookup used by the router at startup.
pub trait Config: Send + Sync {
    /// Value at `key`, or `None` when any path segment is missing.
    fn get(&self, key: &str) -> Option<Value>;

    fn get_or(&self, key: &str, default: Value) -> Value {
        self.get(key).unwrap_or(default)
    }

    fn get_str(&self, key: &str) -> Option<String> {
        self.get(key).and_then(|v| v.as_str().map(str::to_owned))
    }

    /// A list of strings; a single string is treated as a one-element list
    /// and non-string entries are skipped.
    fn get_string_list(&self, key: &str) -> Vec<String> {
        match self.get(key) {
            Some(Value::Array(items)) => items
                .into_iter()
                .filter_map(|v| v.as_str().map(str::to_owned))
                .collect(),
            Some(Value::String(s)) => vec![s],
            _ => Vec::new(),
        }
    }
}

/// Tree-backed [`Config`].
#[derive(Debug, Clone, PartialEq)]
pub struct ConfigMap {
    root: Value,
}

impl Default for ConfigMap {
    fn default() -> Self {
        Self {
            root: Value::Object(Map::new()),
        }
    }
}

impl ConfigMap {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Wrap an existing tree.
    ///
    /// # Errors
    ///
    /// Fails unless the root is an object.
    pub fn from_value(root: Value) -> Result<Self> {
        if !root.is_object() {
            bail!("configuration root must be a mapping, got {root}");
        }
        Ok(Self { root })
    }

    pub fn from_yaml_str(content: &str) -> Result<Self> {
        let root: Value = serde_yaml::from_str(content).context("invalid YAML configuration")?;
        Self::from_value(root)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let root: Value = toml::from_str(content).context("invalid TOML configuration")?;
        Self::from_value(root)
    }

    pub fn from_json_str(content: &str) -> Result<Self> {
        let root: Value = serde_json::from_str(content).context("invalid JSON configuration")?;
        Self::from_value(root)
    }

    /// Load a file, choosing the format from its extension
    /// (`yaml`/`yml`, `toml`, `json`).
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or_default()
            .to_ascii_lowercase();
        let parsed = match ext.as_str() {
            "yaml" | "yml" => Self::from_yaml_str(&content),
            "toml" => Self::from_toml_str(&content),
            "json" => Self::from_json_str(&content),
            other => bail!("unsupported config format '{other}' for {}", path.display()),
        };
        parsed.with_context(|| format!("failed to load config file {}", path.display()))
    }

    /// Builder form of [`ConfigMap::set`].
    #[must_use]
    pub fn with(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.set(key, value);
        self
    }

    /// Set `key`, creating intermediate mappings and replacing scalars in the way.
    pub fn set(&mut self, key: &str, value: impl Into<Value>) {
        let mut segments = key.split(':').peekable();
        let mut node = &mut self.root;
        while let Some(segment) = segments.next() {
            if !node.is_object() {
                *node = Value::Object(Map::new());
            }
            let Value::Object(map) = node else {
                return;
            };
            if segments.peek().is_none() {
                map.insert(segment.to_string(), value.into());
                return;
            }
            node = map
                .entry(segment.to_string())
                .or_insert_with(|| Value::Object(Map::new()));
        }
    }

    #[must_use]
    pub fn as_value(&self) -> &Value {
        &self.root
    }
}

impl Config for ConfigMap {
    fn get(&self, key: &str) -> Option<Value> {
        key.split(':')
            .try_fold(&self.root, |node, segment| node.get(segment))
            .cloned()
    }
}

/// Settings the router extracts from configuration once, at construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouterSettings {
    pub controller_namespace: String,
    pub middlewares: Vec<String>,
    pub route_file: String,
}

impl RouterSettings {
    pub const CONTROLLER_NAMESPACE_KEY: &'static str = "router:controllerNamespace";
    pub const MIDDLEWARES_KEY: &'static str = "router:middlewares";
    pub const ROUTE_FILE_KEY: &'static str = "router:routeFile";
    pub const DEFAULT_ROUTE_FILE: &'static str = "/routes.yaml";

    pub fn from_config(config: &dyn Config) -> Self {
        Self {
            controller_namespace: config
                .get_str(Self::CONTROLLER_NAMESPACE_KEY)
                .unwrap_or_default(),
            middlewares: config.get_string_list(Self::MIDDLEWARES_KEY),
            route_file: config
                .get_str(Self::ROUTE_FILE_KEY)
                .unwrap_or_else(|| Self::DEFAULT_ROUTE_FILE.to_string()),
        }
    }
}

impl Default for RouterSettings {
    fn default() -> Self {
        Self::from_config(&ConfigMap::new())
    }
}
