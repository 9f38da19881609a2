//! Test doubles shared across modules.
//!
//! `FakeApi` is a real HTTP server on `127.0.0.1:0` that records every request
//! and answers from a responder closure. The recording chat/workflow doubles
//! stand in for the traits when no HTTP is involved.

use async_trait::async_trait;
use axum::Router;
use axum::body::Bytes;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode, Uri};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::oneshot;

use crate::domain::errors::WorkflowError;
use crate::domain::traits::{ChatProvider, WorkflowProvider};
use crate::domain::types::{DispatchRequest, Reply, RunId};

/// One request seen by a `FakeApi`.
#[derive(Debug, Clone)]
pub struct Recorded {
    pub path: String,
    pub headers: HashMap<String, String>,
    pub body: String,
}

type Responder = dyn Fn(&str) -> (StatusCode, String) + Send + Sync;

#[derive(Clone)]
struct FakeState {
    calls: Arc<Mutex<Vec<Recorded>>>,
    responder: Arc<Responder>,
    delay: Duration,
}

pub struct FakeApi {
    base_url: String,
    calls: Arc<Mutex<Vec<Recorded>>>,
    _shutdown: oneshot::Sender<()>,
}

impl FakeApi {
    pub async fn start<F>(responder: F) -> Self
    where
        F: Fn(&str) -> (StatusCode, String) + Send + Sync + 'static,
    {
        Self::start_delayed(Duration::ZERO, responder).await
    }

    /// Like `start`, but every answer waits `delay` first.
    pub async fn start_delayed<F>(delay: Duration, responder: F) -> Self
    where
        F: Fn(&str) -> (StatusCode, String) + Send + Sync + 'static,
    {
        let calls = Arc::new(Mutex::new(Vec::new()));
        let state = FakeState {
            calls: calls.clone(),
            responder: Arc::new(responder),
            delay,
        };

        let app = Router::new().fallback(record).with_state(state);
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let base_url = format!("http://{}", listener.local_addr().unwrap());

        let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();
        tokio::spawn(async move {
            let _ = axum::serve(listener, app)
                .with_graceful_shutdown(async move {
                    let _ = shutdown_rx.await;
                })
                .await;
        });

        Self {
            base_url,
            calls,
            _shutdown: shutdown_tx,
        }
    }

    /// Answers every request with the same status and body.
    pub async fn respond(status: StatusCode, body: &str) -> Self {
        let body = body.to_string();
        Self::start(move |_| (status, body.clone())).await
    }

    /// Minimal Bot API: `sendMessage` returns a message, everything else `true`.
    pub async fn telegram() -> Self {
        Self::start(|path| {
            if path.ends_with("/sendMessage") {
                (StatusCode::OK, r#"{"ok":true,"result":{"message_id":7}}"#.to_string())
            } else {
                (StatusCode::OK, r#"{"ok":true,"result":true}"#.to_string())
            }
        })
        .await
    }

    pub fn base_url(&self) -> String {
        self.base_url.clone()
    }

    pub fn calls(&self) -> Vec<Recorded> {
        self.calls.lock().unwrap().clone()
    }

    /// Requests whose path ends with `suffix`.
    pub fn calls_to(&self, suffix: &str) -> Vec<Recorded> {
        self.calls()
            .into_iter()
            .filter(|c| c.path.ends_with(suffix))
            .collect()
    }
}

async fn record(
    State(state): State<FakeState>,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> (StatusCode, String) {
    let path = uri.path().to_string();
    let headers = headers
        .iter()
        .map(|(k, v)| {
            let value = v.to_str().unwrap_or_default().to_string();
            (k.as_str().to_string(), value)
        })
        .collect();
    state.calls.lock().unwrap().push(Recorded {
        path: path.clone(),
        headers,
        body: String::from_utf8_lossy(&body).into_owned(),
    });
    tokio::time::sleep(state.delay).await;
    (state.responder.as_ref())(&path)
}

/// Base URL of a port nothing listens on.
pub async fn closed_port_url() -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{addr}")
}

/// Base URL of a server that answers `status` and then hangs up mid-body.
pub async fn truncated_response_url(status: u16) -> String {
    use tokio::io::{AsyncReadExt, AsyncWriteExt};

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        while let Ok((mut socket, _)) = listener.accept().await {
            let mut buf = [0u8; 4096];
            let _ = socket.read(&mut buf).await;
            let head = format!(
                "HTTP/1.1 {status} Error\r\nContent-Length: 1000\r\nConnection: close\r\n\r\npartial"
            );
            let _ = socket.write_all(head.as_bytes()).await;
            let _ = socket.shutdown().await;
        }
    });
    format!("http://{addr}")
}

/// What a `RecordingChat` was asked to do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChatAction {
    Sent(Reply),
    Edited(i64, Reply),
    Answered {
        callback_id: String,
        alert: Option<String>,
    },
}

pub struct RecordingChat {
    pub chat_id: i64,
    actions: Mutex<Vec<ChatAction>>,
}

impl RecordingChat {
    pub fn new(chat_id: i64) -> Self {
        Self {
            chat_id,
            actions: Mutex::new(Vec::new()),
        }
    }

    pub fn actions(&self) -> Vec<ChatAction> {
        self.actions.lock().unwrap().clone()
    }

    /// Texts of sent and edited messages, in order.
    pub fn texts(&self) -> Vec<String> {
        self.actions()
            .into_iter()
            .filter_map(|a| match a {
                ChatAction::Sent(r) | ChatAction::Edited(_, r) => Some(r.text),
                ChatAction::Answered { .. } => None,
            })
            .collect()
    }
}

#[async_trait]
impl ChatProvider for RecordingChat {
    async fn send(&self, reply: Reply) -> Result<i64, String> {
        self.actions.lock().unwrap().push(ChatAction::Sent(reply));
        Ok(1)
    }

    async fn edit(&self, message_id: i64, reply: Reply) -> Result<(), String> {
        self.actions
            .lock()
            .unwrap()
            .push(ChatAction::Edited(message_id, reply));
        Ok(())
    }

    async fn answer_callback(&self, callback_id: &str, alert: Option<&str>) -> Result<(), String> {
        self.actions.lock().unwrap().push(ChatAction::Answered {
            callback_id: callback_id.to_string(),
            alert: alert.map(str::to_string),
        });
        Ok(())
    }

    fn chat_id(&self) -> i64 {
        self.chat_id
    }
}

/// Workflow double that records calls and replays a canned outcome.
pub struct RecordingWorkflows {
    outcome: fn() -> Result<(), WorkflowError>,
    pub dispatched: Mutex<Vec<DispatchRequest>>,
    pub cancelled: Mutex<Vec<String>>,
}

impl RecordingWorkflows {
    pub fn new(outcome: fn() -> Result<(), WorkflowError>) -> Self {
        Self {
            outcome,
            dispatched: Mutex::new(Vec::new()),
            cancelled: Mutex::new(Vec::new()),
        }
    }

    pub fn succeeding() -> Self {
        Self::new(|| Ok(()))
    }

    pub fn call_count(&self) -> usize {
        self.dispatched.lock().unwrap().len() + self.cancelled.lock().unwrap().len()
    }
}

#[async_trait]
impl WorkflowProvider for RecordingWorkflows {
    async fn dispatch(&self, request: &DispatchRequest) -> Result<(), WorkflowError> {
        self.dispatched.lock().unwrap().push(request.clone());
        (self.outcome)()
    }

    async fn cancel(&self, run_id: &RunId) -> Result<(), WorkflowError> {
        self.cancelled.lock().unwrap().push(run_id.to_string());
        (self.outcome)()
    }
}
