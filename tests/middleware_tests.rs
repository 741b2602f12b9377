use std::sync::{Arc, Mutex};

use http::Method;
use routecore::config::ConfigMap;
use routecore::dispatcher::RequestContext;
use routecore::middleware::{from_fn, MetricsMiddleware, Middleware, Next, TracingMiddleware};
use routecore::{HandlerResult, RequestId, Request, Response, RouteOptions, Router, RouterError};
use serde_json::json;

mod common;
use common::{counting, get, Counter, Users};
use tracing_util::TestTracing;

/// Records its name before and after the continuation.
struct Recorder {
    name: &'static str,
    log: Arc<Mutex<Vec<String>>>,
}

impl Middleware for Recorder {
    fn run(&self, _ctx: &RequestContext<'_>, next: Next<'_>) -> HandlerResult {
        self.log.lock().unwrap().push(format!("{}:before", self.name));
        let result = next.run();
        self.log.lock().unwrap().push(format!("{}:after", self.name));
        result
    }
}

fn recorder(name: &'static str, log: &Arc<Mutex<Vec<String>>>) -> Arc<dyn Middleware> {
    Arc::new(Recorder {
        name,
        log: Arc::clone(log),
    })
}

#[test]
fn test_short_circuit_never_invokes_handler() {
    let counter = Counter::new();
    let mut router = Router::default();
    router.register_middleware(
        "deny",
        Arc::new(from_fn(|_ctx, _next| Ok(Response::new("Forbidden", 403)))),
    );
    router
        .get(
            "/secret",
            counting(&counter, "secret"),
            RouteOptions::new().with_middleware("deny"),
        )
        .unwrap();

    let res = router.handle(&get("/secret"));
    assert_eq!(res.status, 403);
    assert_eq!(res.body_str(), Some("Forbidden"));
    assert_eq!(counter.count(), 0);
}

#[test]
fn test_pass_through_invokes_handler_once() {
    let counter = Counter::new();
    let mut router = Router::default();
    router.register_middleware("pass", Arc::new(from_fn(|_ctx, next| next.run())));
    router
        .get(
            "/open",
            counting(&counter, "open"),
            RouteOptions::new().with_middleware("pass"),
        )
        .unwrap();

    assert_eq!(router.handle(&get("/open")).body_str(), Some("open"));
    assert_eq!(counter.count(), 1);
}

#[test]
fn test_continuation_may_run_twice() {
    let counter = Counter::new();
    let mut router = Router::default();
    router.register_middleware(
        "retry",
        Arc::new(from_fn(|_ctx, next| {
            let _ = next.run()?;
            next.run()
        })),
    );
    router
        .get(
            "/twice",
            counting(&counter, "x"),
            RouteOptions::new().with_middleware("retry"),
        )
        .unwrap();

    router.handle(&get("/twice"));
    assert_eq!(counter.count(), 2);
}

#[test]
fn test_middleware_can_rewrite_response() {
    let mut router = Router::default();
    router.register_middleware(
        "stamp",
        Arc::new(from_fn(|ctx, next| {
            let mut res = next.run()?;
            res.set_header("x-request-id", ctx.request_id().to_string());
            res.set_header("x-route", ctx.route().uri().to_string());
            Ok(res)
        })),
    );
    router
        .get(
            "/items/{id}",
            common::text("item"),
            RouteOptions::new().with_middleware("stamp"),
        )
        .unwrap();

    let id = RequestId::new();
    let res = router.handle(&Request::new(Method::GET, "/items/3").with_request_id(id));
    assert_eq!(res.get_header("x-request-id"), Some(id.to_string().as_str()));
    assert_eq!(res.get_header("x-route"), Some("/items/{id}"));
}

#[test]
fn test_unknown_middleware_yields_604() {
    let counter = Counter::new();
    let mut router = Router::default();
    router
        .get(
            "/guarded",
            counting(&counter, "guarded"),
            RouteOptions::new().with_middleware("auth"),
        )
        .unwrap();

    let res = router.handle(&get("/guarded"));
    assert_eq!(res.status, 604);
    assert_eq!(res.body_str(), Some("Middleware - auth not found."));
    assert_eq!(counter.count(), 0);
}

#[test]
fn test_controller_used_as_middleware_yields_600() {
    let mut router = Router::default();
    router.register_controller("Users", Users::factory);
    router
        .get(
            "/odd",
            common::text("odd"),
            RouteOptions::new().with_middleware("Users"),
        )
        .unwrap();

    let res = router.handle(&get("/odd"));
    assert_eq!(res.status, 600);
    assert_eq!(
        res.body_str(),
        Some("Given Middleware does not comply with the MiddlewareContract!")
    );
}

#[test]
fn test_missing_controller_is_reported_before_middleware_runs() {
    let log = Arc::new(Mutex::new(Vec::new()));
    let mut router = Router::default();
    router.register_middleware("rec", recorder("rec", &log));
    router
        .get("/ghost", "Ghost@index", RouteOptions::new().with_middleware("rec"))
        .unwrap();

    assert_eq!(router.handle(&get("/ghost")).status, 604);
    assert!(log.lock().unwrap().is_empty());
}

#[test]
fn test_short_circuit_skips_controller_construction() {
    let built = Counter::new();
    let factory_counter = built.clone();
    let mut router = Router::default();
    router.register_controller("Users", move |args| {
        factory_counter.hit();
        Users::factory(args)
    });
    router.register_middleware(
        "deny",
        Arc::new(from_fn(|_ctx, _next| Err(RouterError::handler("Unauthorized", 401)))),
    );
    router
        .get("/users/{id:num}", "Users@show", RouteOptions::new().with_middleware("deny"))
        .unwrap();

    let res = router.handle(&get("/users/1"));
    assert_eq!(res.status, 401);
    assert_eq!(built.count(), 0);
}

#[test]
fn test_global_middleware_wraps_route_middleware_in_order() {
    let log = Arc::new(Mutex::new(Vec::new()));
    let config = ConfigMap::new().with("router:middlewares", json!(["outer", "inner"]));
    let mut router = Router::new("", Arc::new(config));
    router
        .register_middleware("outer", recorder("outer", &log))
        .register_middleware("inner", recorder("inner", &log))
        .register_middleware("route", recorder("route", &log));
    router
        .get("/wrapped", common::text("w"), RouteOptions::new().with_middleware("route"))
        .unwrap()
        .get("/plain", common::text("p"), ())
        .unwrap();

    assert_eq!(router.handle(&get("/wrapped")).status, 200);
    assert_eq!(
        *log.lock().unwrap(),
        vec![
            "outer:before",
            "inner:before",
            "route:before",
            "route:after",
            "inner:after",
            "outer:after"
        ]
    );

    log.lock().unwrap().clear();
    assert_eq!(router.handle(&get("/plain")).status, 200);
    assert_eq!(
        *log.lock().unwrap(),
        vec!["outer:before", "inner:before", "inner:after", "outer:after"]
    );
}

#[test]
fn test_unregistered_global_middleware_fails_every_request() {
    let config = ConfigMap::new().with("router:middlewares", json!(["missing"]));
    let mut router = Router::new("", Arc::new(config));
    router.get("/", common::text("home"), ()).unwrap();
    assert_eq!(router.handle(&get("/")).status, 604);
}

#[test]
fn test_group_middleware_applies_to_members_only() {
    let counter = Counter::new();
    let mut router = Router::default();
    router.register_middleware(
        "deny",
        Arc::new(from_fn(|_ctx, _next| Ok(Response::new("Forbidden", 403)))),
    );
    router
        .group(RouteOptions::new().with_middleware("deny"), |r| {
            r.get("/admin", counting(&counter, "admin"), ())?;
            Ok(())
        })
        .unwrap();
    router.get("/public", counting(&counter, "public"), ()).unwrap();

    assert_eq!(router.handle(&get("/admin")).status, 403);
    assert_eq!(router.handle(&get("/public")).status, 200);
    assert_eq!(counter.count(), 1);
}

#[test]
fn test_metrics_middleware_counts() {
    let metrics = Arc::new(MetricsMiddleware::new());
    let mut router = Router::default();
    router.register_middleware("metrics", Arc::clone(&metrics) as Arc<dyn Middleware>);
    let with_metrics = RouteOptions::new().with_middleware("metrics");
    router
        .get("/ok", common::text("ok"), with_metrics.clone())
        .unwrap()
        .get(
            "/bad",
            routecore::Handler::inline(|_| Err(RouterError::handler("nope", 422))),
            with_metrics,
        )
        .unwrap();

    for _ in 0..3 {
        router.handle(&get("/ok"));
    }
    router.handle(&get("/bad"));
    // unmatched requests never reach the chain
    router.handle(&get("/missing"));

    assert_eq!(metrics.request_count(), 4);
    assert_eq!(metrics.failure_count(), 1);
    assert!(metrics.average_latency() < std::time::Duration::from_secs(1));
}

#[test]
fn test_tracing_middleware_logs_request() {
    let tracing = TestTracing::init();
    let mut router = Router::default();
    router.register_middleware("tracing", Arc::new(TracingMiddleware));
    router
        .get(
            "/traced/{id:num}",
            common::text("t"),
            RouteOptions::new().with_middleware("tracing"),
        )
        .unwrap();

    let res = router.handle(&get("/traced/5"));
    assert_eq!(res.status, 200);
    assert!(tracing.contains("Request completed"));
    assert!(tracing.contains("/traced/{id:num}"));
}
