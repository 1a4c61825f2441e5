//! Scripted HTTP transport.
//!
//! Responses are queued per route (`METHOD path`, query ignored) and consumed
//! in order. A route with nothing queued answers 404. Every request is
//! recorded for inspection.

use std::{
    collections::{HashMap, VecDeque},
    sync::{Arc, Mutex, MutexGuard, PoisonError},
};

use neuroviz_client::{HttpRequest, HttpResponse, HttpTransport, Method};
use serde_json::{Value, json};

/// Transport failure injected by a test.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SimHttpError(pub String);

impl std::fmt::Display for SimHttpError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "SimHttpError: {}", self.0)
    }
}

impl std::error::Error for SimHttpError {}

type Reply = Result<HttpResponse, SimHttpError>;

#[derive(Default)]
struct HttpState {
    routes: HashMap<String, VecDeque<Reply>>,
    requests: Vec<HttpRequest>,
}

/// In-memory [`HttpTransport`]. Clones share the same script.
#[derive(Clone, Default)]
pub struct SimHttp {
    state: Arc<Mutex<HttpState>>,
}

impl SimHttp {
    /// Transport with no routes.
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, HttpState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn route(method: Method, path: &str) -> String {
        format!("{method} {path}")
    }

    /// Queue a raw response for `method path`.
    pub fn respond(&self, method: Method, path: &str, response: HttpResponse) {
        self.lock().routes.entry(Self::route(method, path)).or_default().push_back(Ok(response));
    }

    /// Queue `{success: true, data}` with status 200.
    pub fn respond_data(&self, method: Method, path: &str, data: Value) {
        let body = json!({ "success": true, "message": "", "data": data });
        self.respond(method, path, HttpResponse::json(200, &body));
    }

    /// Queue an un-enveloped JSON body with status 200.
    pub fn respond_bare(&self, method: Method, path: &str, body: Value) {
        self.respond(method, path, HttpResponse::json(200, &body));
    }

    /// Queue `{success: false, message}` with `status`.
    pub fn respond_error(&self, method: Method, path: &str, status: u16, message: &str) {
        let body = json!({ "success": false, "message": message, "data": null });
        self.respond(method, path, HttpResponse::json(status, &body));
    }

    /// Queue a transport failure.
    pub fn fail(&self, method: Method, path: &str, reason: &str) {
        self.lock()
            .routes
            .entry(Self::route(method, path))
            .or_default()
            .push_back(Err(SimHttpError(reason.to_owned())));
    }

    /// Every request received, in order.
    pub fn requests(&self) -> Vec<HttpRequest> {
        self.lock().requests.clone()
    }

    /// Number of requests received for `method path`.
    pub fn hits(&self, method: Method, path: &str) -> usize {
        self.lock().requests.iter().filter(|r| r.method == method && r.path == path).count()
    }

    /// The most recent request.
    pub fn last_request(&self) -> Option<HttpRequest> {
        self.lock().requests.last().cloned()
    }
}

impl HttpTransport for SimHttp {
    type Error = SimHttpError;

    async fn execute(&self, request: HttpRequest) -> Result<HttpResponse, Self::Error> {
        let mut state = self.lock();
        let route = Self::route(request.method, &request.path);
        state.requests.push(request);

        match state.routes.get_mut(&route).and_then(VecDeque::pop_front) {
            Some(reply) => reply,
            None => {
                tracing::debug!(%route, "no scripted response");
                Ok(HttpResponse::json(404, &json!({ "success": false, "message": "no route" })))
            },
        }
    }
}
