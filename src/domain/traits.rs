//! # Domain Traits
//!
//! Abstract interfaces for the two external systems (Chat, Workflows).
//! Allows the router to be driven by Telegram in production and by recording doubles in tests.

use async_trait::async_trait;

use crate::domain::errors::WorkflowError;
use crate::domain::types::{DispatchRequest, Reply, RunId};

/// Abstract interface for a Chat Provider bound to one conversation.
#[async_trait]
pub trait ChatProvider: Send + Sync {
    /// Send a message to the chat, returning the new message id
    async fn send(&self, reply: Reply) -> Result<i64, String>;

    /// Replace the content of an existing message
    async fn edit(&self, message_id: i64, reply: Reply) -> Result<(), String>;

    /// Acknowledge a button press, optionally with an alert popup
    async fn answer_callback(&self, callback_id: &str, alert: Option<&str>) -> Result<(), String>;

    /// Get the current chat ID
    fn chat_id(&self) -> i64;
}

/// Abstract interface for the CI provider that runs the workloads.
#[async_trait]
pub trait WorkflowProvider: Send + Sync {
    /// Start one workflow run. Single attempt.
    async fn dispatch(&self, request: &DispatchRequest) -> Result<(), WorkflowError>;

    /// Ask the provider to cancel a run. Single attempt.
    async fn cancel(&self, run_id: &RunId) -> Result<(), WorkflowError>;
}
