//! # Mock Transport for Testing
//!
//! Provides a scripted `HttpTransport` that answers from per-route queues
//! and records every request it receives.

use super::http::{ApiRequest, ApiResponse, HttpError, HttpTransport};
use async_trait::async_trait;
use reqwest::Method;
use std::collections::{HashMap, VecDeque};
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

type Reply = Result<ApiResponse, HttpError>;

/// Queued reply and how long to hold it back
type ScriptedReply = (Reply, Option<Duration>);

#[derive(Default)]
struct Route {
    replies: VecDeque<ScriptedReply>,
    /// The only remaining reply has been served at least once
    repeating: bool,
}

/// Mock transport for testing
///
/// Replies are queued per `(method, path)`. The last queued reply of a route
/// is sticky and keeps answering once the others are used up, until a new
/// reply is queued for the route. Requests to routes without replies fail
/// with a 404 status error.
#[derive(Default)]
pub struct MockTransport {
    routes: Mutex<HashMap<(Method, String), Route>>,
    requests: Mutex<Vec<ApiRequest>>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a reply for `method` on `path`
    pub fn on(&self, method: Method, path: &str, reply: Reply) -> &Self {
        self.enqueue(method, path, (reply, None))
    }

    /// Queue a reply that is delivered only after `delay`, to model slow responses
    pub fn on_delayed(&self, method: Method, path: &str, reply: Reply, delay: Duration) -> &Self {
        self.enqueue(method, path, (reply, Some(delay)))
    }

    fn enqueue(&self, method: Method, path: &str, scripted: ScriptedReply) -> &Self {
        let mut routes = lock(&self.routes);
        let route = routes.entry((method, path.to_string())).or_default();
        if route.repeating {
            route.replies.clear();
            route.repeating = false;
        }
        route.replies.push_back(scripted);
        self
    }

    /// Every request received so far, in arrival order
    pub fn requests(&self) -> Vec<ApiRequest> {
        lock(&self.requests).clone()
    }

    /// Number of requests received for `method` on `path`
    pub fn request_count(&self, method: &Method, path: &str) -> usize {
        lock(&self.requests)
            .iter()
            .filter(|r| &r.method == method && r.path == path)
            .count()
    }

    pub fn last_request(&self) -> Option<ApiRequest> {
        lock(&self.requests).last().cloned()
    }

    fn next_reply(&self, request: &ApiRequest) -> ScriptedReply {
        let mut routes = lock(&self.routes);
        let key = (request.method.clone(), request.path.clone());
        let scripted = routes.get_mut(&key).and_then(|route| {
            if route.replies.len() > 1 {
                route.replies.pop_front()
            } else {
                route.repeating = true;
                route.replies.front().cloned()
            }
        });
        scripted.unwrap_or_else(|| (Err(not_found(&request.path)), None))
    }
}

fn not_found(path: &str) -> HttpError {
    HttpError::Status {
        url: path.to_string(),
        status: 404,
        status_text: "Not Found".to_string(),
        body: None,
    }
}

#[async_trait]
impl HttpTransport for MockTransport {
    async fn send(&self, request: ApiRequest) -> Result<ApiResponse, HttpError> {
        tracing::debug!("Mock {} {}", request.method, request.path);
        let (reply, delay) = self.next_reply(&request);
        let path = request.path.clone();
        lock(&self.requests).push(request);
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        reply.map(|response| {
            if response.url.is_empty() {
                response.with_url(path)
            } else {
                response
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn mock_should_replay_queue_then_stick_to_last_reply() {
        let mock = MockTransport::new();
        mock.on(Method::GET, "api/reservas", Ok(ApiResponse::json(json!([1]))))
            .on(Method::GET, "api/reservas", Ok(ApiResponse::json(json!([2]))));

        let first = mock.send(ApiRequest::get("api/reservas")).await.unwrap();
        let second = mock.send(ApiRequest::get("api/reservas")).await.unwrap();
        let third = mock.send(ApiRequest::get("api/reservas")).await.unwrap();

        assert_eq!(first.body, Some(json!([1])));
        assert_eq!(second.body, Some(json!([2])));
        assert_eq!(third.body, Some(json!([2])));
        assert_eq!(mock.request_count(&Method::GET, "api/reservas"), 3);
    }

    #[tokio::test]
    async fn new_reply_should_replace_a_repeating_one() {
        let mock = MockTransport::new();
        mock.on(Method::GET, "api/livros", Ok(ApiResponse::json(json!([1]))));
        mock.send(ApiRequest::get("api/livros")).await.unwrap();

        mock.on(Method::GET, "api/livros", Ok(ApiResponse::json(json!([2]))));
        let next = mock.send(ApiRequest::get("api/livros")).await.unwrap();
        assert_eq!(next.body, Some(json!([2])));
    }

    #[tokio::test]
    async fn replies_should_carry_the_requested_path() {
        let mock = MockTransport::new();
        mock.on(Method::GET, "api/livros", Ok(ApiResponse::new(304, None)));

        let reply = mock.send(ApiRequest::get("api/livros")).await.unwrap();
        assert_eq!(reply.url, "api/livros");
    }

    #[tokio::test]
    async fn mock_should_answer_unknown_routes_with_404() {
        let mock = MockTransport::new();
        let result = mock.send(ApiRequest::delete("api/livros/1")).await;
        assert_eq!(result.unwrap_err().status(), Some(404));
        assert_eq!(mock.last_request().unwrap().method, Method::DELETE);
    }
}
