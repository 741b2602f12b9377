use std::collections::HashMap;
use std::sync::Arc;

use http::Method;
use tracing::debug;

use super::params::Params;
use super::route::Route;
use crate::error::RouterError;

/// Result of successfully matching a request path to a route.
#[derive(Debug, Clone)]
pub struct RouteMatch {
    /// The matched route (shared with the table, never mutated)
    pub route: Arc<Route>,
    /// Values bound for this request only
    pub params: Params,
}

/// Routes registered for one HTTP method.
#[derive(Debug, Default, Clone)]
struct MethodBucket {
    /// Effective template → position in `routes`
    by_uri: HashMap<String, usize>,
    /// Registration order, which is match precedence
    routes: Vec<Arc<Route>>,
}

impl MethodBucket {
    fn insert(&mut self, route: Arc<Route>) -> bool {
        match self.by_uri.get(route.uri()) {
            Some(&slot) => {
                self.routes[slot] = route;
                true
            }
            None => {
                self.by_uri.insert(route.uri().to_string(), self.routes.len());
                self.routes.push(route);
                false
            }
        }
    }

    fn find(&self, path: &str) -> Option<RouteMatch> {
        if let Some(&slot) = self.by_uri.get(path) {
            return Some(RouteMatch {
                route: Arc::clone(&self.routes[slot]),
                params: Params::new(),
            });
        }

        self.routes.iter().find_map(|route| {
            route.match_path(path).map(|params| RouteMatch {
                route: Arc::clone(route),
                params,
            })
        })
    }
}

/// Method-bucketed route collection.
///
/// Lookup first tries the path as an exact template key, which answers
/// literal routes without evaluating any pattern, then scans the method's
/// routes in registration order. The first full match wins.
///
/// Matching takes `&self`; once built the table can be shared across threads.
#[derive(Debug, Default, Clone)]
pub struct RouteTable {
    buckets: HashMap<Method, MethodBucket>,
}

impl RouteTable {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert `route` under each of its methods.
    ///
    /// A route whose effective template is already registered for a method
    /// replaces the earlier one and keeps its precedence slot.
    pub fn register(&mut self, route: Route) -> Arc<Route> {
        let route = Arc::new(route);
        for method in route.methods() {
            let replaced = self
                .buckets
                .entry(method.clone())
                .or_default()
                .insert(Arc::clone(&route));
            debug!(
                method = %method,
                uri = %route.uri(),
                handler = %route.handler().describe(),
                replaced,
                "Route registered"
            );
        }
        route
    }

    /// Resolve `path` for `method`.
    ///
    /// # Errors
    ///
    /// `NotFound` when no route registered for `method` matches.
    pub fn find_match(&self, method: &Method, path: &str) -> Result<RouteMatch, RouterError> {
        self.buckets
            .get(method)
            .and_then(|bucket| bucket.find(path))
            .ok_or(RouterError::NotFound)
    }

    /// Routes for `method` in precedence order.
    #[must_use]
    pub fn routes(&self, method: &Method) -> &[Arc<Route>] {
        self.buckets
            .get(method)
            .map_or(&[][..], |bucket| bucket.routes.as_slice())
    }

    /// Methods with at least one route.
    pub fn methods(&self) -> impl Iterator<Item = &Method> {
        self.buckets.keys()
    }

    /// Number of `(method, route)` entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.buckets.values().map(|b| b.routes.len()).sum()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::HandlerResult;
    use crate::response::Response;
    use crate::router::{Handler, ParamValue, RouteOptions};

    fn route(uri: &str, tag: &'static str) -> Route {
        Route::new(
            uri,
            &[Method::GET],
            Handler::inline(move |_| -> HandlerResult { Ok(Response::ok(tag)) }),
            RouteOptions::new(),
        )
        .unwrap()
    }

    fn tag(m: &RouteMatch) -> String {
        match m.route.handler() {
            Handler::Inline(f) => f(&m.params).unwrap().body_str().unwrap().to_string(),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn literal_lookup_skips_patterns() {
        let mut table = RouteTable::new();
        for i in 0..50 {
            table.register(route(&format!("/items/{{id{i}}}"), "templated"));
        }
        table.register(route("/items/special", "literal"));
        let m = table.find_match(&Method::GET, "/items/special").unwrap();
        assert_eq!(tag(&m), "literal");
        assert!(m.params.is_empty());
    }

    #[test]
    fn first_registered_template_wins() {
        let mut table = RouteTable::new();
        table.register(route("/a/{x}", "first"));
        table.register(route("/a/{y:num}", "second"));
        let m = table.find_match(&Method::GET, "/a/1").unwrap();
        assert_eq!(tag(&m), "first");
        assert_eq!(m.params.get("x"), Some(&ParamValue::Text("1".into())));
    }

    #[test]
    fn replacement_keeps_precedence_slot() {
        let mut table = RouteTable::new();
        table.register(route("/a/{x}", "old"));
        table.register(route("/a/{x:num}", "other"));
        table.register(route("/a/{x}", "new"));
        assert_eq!(table.len(), 2);
        assert_eq!(tag(&table.find_match(&Method::GET, "/a/1").unwrap()), "new");
    }

    #[test]
    fn unknown_method_is_not_found() {
        let mut table = RouteTable::new();
        table.register(route("/a", "a"));
        assert_eq!(
            table.find_match(&Method::POST, "/a").unwrap_err(),
            RouterError::NotFound
        );
        assert!(table.routes(&Method::POST).is_empty());
    }
}
