// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

//! Recording stand-ins for the transport and presentation collaborators.

use std::sync::Mutex;

use async_trait::async_trait;
use calview_core::{
    CalendarState, Method, Notifier, Renderer, Request, Response, Severity, StateKey,
    SwipeDirection, Transport, TransportError,
};

/// A canned answer of [`MockTransport`].
#[derive(Debug, Clone)]
pub enum Reply {
    /// Answer with a status and a body.
    Status(u16, String),

    /// Fail as if the connection was refused.
    Fail,

    /// Never answer.
    Hang,
}

impl Reply {
    /// A 200 answer with a JSON body.
    pub fn json(value: &serde_json::Value) -> Self {
        Reply::Status(200, value.to_string())
    }
}

/// Transport answering from a route table keyed by method and URL suffix.
///
/// Unrouted requests fail. Every request is recorded.
#[derive(Debug, Default)]
pub struct MockTransport {
    routes: Mutex<Vec<(Method, String, Reply)>>,
    requests: Mutex<Vec<Request>>,
}

impl MockTransport {
    /// A transport where every request fails.
    pub fn failing() -> Self {
        Self::default()
    }

    /// A transport serving `value` for `GET .../events`.
    pub fn serving(value: &serde_json::Value) -> Self {
        let transport = Self::default();
        transport.route(Method::Get, "/events", Reply::json(value));
        transport
    }

    /// Sets the reply for `method` on URLs ending with `suffix`, replacing earlier ones.
    pub fn route(&self, method: Method, suffix: &str, reply: Reply) {
        let mut routes = self.routes.lock().unwrap();
        routes.retain(|(m, s, _)| !(*m == method && s == suffix));
        routes.push((method, suffix.to_string(), reply));
    }

    /// Removes every route, so that all requests fail.
    pub fn clear(&self) {
        self.routes.lock().unwrap().clear();
    }

    /// Every request received so far.
    pub fn requests(&self) -> Vec<Request> {
        self.requests.lock().unwrap().clone()
    }

    /// Requests received for `method` on URLs ending with `suffix`.
    pub fn requests_to(&self, method: Method, suffix: &str) -> Vec<Request> {
        self.requests()
            .into_iter()
            .filter(|r| r.method == method && r.url.ends_with(suffix))
            .collect()
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn send(&self, request: Request) -> Result<Response, TransportError> {
        let reply = {
            let routes = self.routes.lock().unwrap();
            routes
                .iter()
                .find(|(m, s, _)| *m == request.method && request.url.ends_with(s.as_str()))
                .map_or(Reply::Fail, |(_, _, reply)| reply.clone())
        };
        self.requests.lock().unwrap().push(request);

        match reply {
            Reply::Status(status, body) => Ok(Response { status, body }),
            Reply::Fail => Err(TransportError::Network("connection refused".to_string())),
            Reply::Hang => std::future::pending().await,
        }
    }
}

/// Renderer that records every call.
#[derive(Debug, Default)]
pub struct RecordingRenderer {
    renders: Mutex<Vec<CalendarState>>,
    updates: Mutex<Vec<StateKey>>,
    swipes: Mutex<Vec<SwipeDirection>>,
}

impl RecordingRenderer {
    /// Number of full renders.
    pub fn render_count(&self) -> usize {
        self.renders.lock().unwrap().len()
    }

    /// The state passed to the last full render.
    pub fn last_render(&self) -> Option<CalendarState> {
        self.renders.lock().unwrap().last().cloned()
    }

    /// Keys passed to `update`, in order.
    pub fn updates(&self) -> Vec<StateKey> {
        self.updates.lock().unwrap().clone()
    }

    /// Swipe feedback played, in order.
    pub fn swipes(&self) -> Vec<SwipeDirection> {
        self.swipes.lock().unwrap().clone()
    }
}

impl Renderer for RecordingRenderer {
    fn render(&self, state: &CalendarState) {
        self.renders.lock().unwrap().push(state.clone());
    }

    fn update(&self, key: StateKey, _state: &CalendarState) {
        self.updates.lock().unwrap().push(key);
    }

    fn swipe_feedback(&self, direction: SwipeDirection) {
        self.swipes.lock().unwrap().push(direction);
    }
}

/// Notifier that records every message.
#[derive(Debug, Default)]
pub struct RecordingNotifier {
    messages: Mutex<Vec<(String, Severity)>>,
}

impl RecordingNotifier {
    /// Every message shown so far.
    pub fn messages(&self) -> Vec<(String, Severity)> {
        self.messages.lock().unwrap().clone()
    }

    /// Severities of the messages, in order.
    pub fn severities(&self) -> Vec<Severity> {
        self.messages().into_iter().map(|(_, s)| s).collect()
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, message: &str, severity: Severity) {
        self.messages
            .lock()
            .unwrap()
            .push((message.to_string(), severity));
    }
}
