#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use http::Method;
use routecore::dispatcher::{Controller, ControllerArgs};
use routecore::{HandlerResult, Params, Request, Response, RouterError};

pub fn request(method: Method, path: &str) -> Request {
    Request::new(method, path)
}

pub fn get(path: &str) -> Request {
    Request::new(Method::GET, path)
}

/// Inline handler body echoing the bound parameters as JSON.
pub fn echo_params(params: &Params) -> HandlerResult {
    Ok(Response::json(200, params.to_json()))
}

/// Inline handler that returns a fixed text body.
pub fn text(body: &'static str) -> routecore::Handler {
    routecore::Handler::inline(move |_| Ok(Response::ok(body)))
}

/// Shared invocation counter.
#[derive(Clone, Default)]
pub struct Counter(Arc<AtomicUsize>);

impl Counter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn hit(&self) {
        self.0.fetch_add(1, Ordering::SeqCst);
    }

    pub fn count(&self) -> usize {
        self.0.load(Ordering::SeqCst)
    }
}

/// Inline handler that counts its invocations.
pub fn counting(counter: &Counter, body: &'static str) -> routecore::Handler {
    let counter = counter.clone();
    routecore::Handler::inline(move |_| {
        counter.hit();
        Ok(Response::ok(body))
    })
}

/// Controller with `show`, `whoami` and `fail` methods.
pub struct Users {
    base_path: String,
    route: String,
}

impl Users {
    pub fn factory(args: &ControllerArgs<'_>) -> Box<dyn Controller> {
        Box::new(Users {
            base_path: args.base_path.to_string(),
            route: args.context.route().uri().to_string(),
        })
    }
}

impl Controller for Users {
    fn call(&mut self, method: &str, params: &Params) -> Option<HandlerResult> {
        match method {
            "show" => Some(Ok(Response::ok(format!(
                "user {}",
                params.get_i64("id").unwrap_or_default()
            )))),
            "whoami" => Some(Ok(Response::ok(format!("{} {}", self.base_path, self.route)))),
            "fail" => Some(Err(RouterError::handler("user service unavailable", 503))),
            _ => None,
        }
    }
}
