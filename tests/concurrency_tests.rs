use std::sync::Arc;
use std::thread;

use routecore::middleware::{MetricsMiddleware, Middleware};
use routecore::{Handler, Response, RouteOptions, Router};
use serde_json::json;

mod common;
use common::{echo_params, get, Users};

fn shared_router(metrics: &Arc<MetricsMiddleware>) -> Arc<Router> {
    let mut router = Router::default();
    router.register_controller("Users", Users::factory);
    router.register_middleware("metrics", Arc::clone(metrics) as Arc<dyn Middleware>);
    router
        .get(
            "/items/{id:num}",
            Handler::inline(echo_params),
            RouteOptions::new().with_middleware("metrics"),
        )
        .unwrap()
        .get("/users/{id:num}", "Users@show", ())
        .unwrap()
        .get("/health", Handler::inline(|_| Ok(Response::ok("ok"))), ())
        .unwrap();
    Arc::new(router)
}

#[test]
fn test_router_is_send_and_sync() {
    fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<Router>();
    assert_send_sync::<Arc<Router>>();
}

#[test]
fn test_concurrent_requests_see_their_own_bindings() {
    let metrics = Arc::new(MetricsMiddleware::new());
    let router = shared_router(&metrics);

    let workers: Vec<_> = (0..8)
        .map(|worker| {
            let router = Arc::clone(&router);
            thread::spawn(move || {
                for i in 0..200 {
                    let id = worker * 1000 + i;
                    let res = router.handle(&get(&format!("/items/{id}")));
                    assert_eq!(res.status, 200);
                    assert_eq!(res.body, json!({ "id": id }));

                    let res = router.handle(&get(&format!("/users/{id}")));
                    assert_eq!(res.body_str(), Some(format!("user {id}").as_str()));

                    assert_eq!(router.handle(&get("/health")).status, 200);
                    assert_eq!(router.handle(&get("/nope")).status, 404);
                }
            })
        })
        .collect();

    for worker in workers {
        worker.join().unwrap();
    }

    assert_eq!(metrics.request_count(), 8 * 200);
    assert_eq!(metrics.failure_count(), 0);
    assert_eq!(router.route_count(), 3);
}
