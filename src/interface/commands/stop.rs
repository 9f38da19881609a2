//! # Stop Command
//!
//! Handles the Cancel button attached to deployment messages.
//! Any authorized user may cancel any run id; ownership is not checked.

use anyhow::Result;

use crate::domain::traits::{ChatProvider, WorkflowProvider};
use crate::domain::types::{Reply, RunId};
use crate::strings::messages;

pub async fn handle_stop(
    workflows: &dyn WorkflowProvider,
    chat: &impl ChatProvider,
    message_id: i64,
    run_id: &RunId,
) -> Result<()> {
    tracing::info!("Attempting to stop workflow run {}", run_id);
    let result = workflows.cancel(run_id).await;

    chat.edit(message_id, Reply::plain(messages::cancel_outcome(run_id, &result)))
        .await
        .map_err(anyhow::Error::msg)
}
