//! # Launch Command
//!
//! Handles the per-workload commands (`/chrome`, `/kde`, ...).
//! Acknowledges, dispatches one workflow run, and reports the outcome.

use anyhow::Result;

use crate::domain::config::AppConfig;
use crate::domain::traits::{ChatProvider, WorkflowProvider};
use crate::domain::types::{DispatchRequest, Reply};
use crate::strings::messages;

pub async fn handle_launch(
    config: &AppConfig,
    workflows: &dyn WorkflowProvider,
    chat: &impl ChatProvider,
    user_id: i64,
    image: &str,
) -> Result<()> {
    let chat_id = chat.chat_id().to_string();
    tracing::info!("User {} requested {} in chat {}", user_id, image, chat_id);

    chat.send(Reply::plain(messages::starting_instance(image)))
        .await
        .map_err(anyhow::Error::msg)?;

    let request = DispatchRequest {
        chat_id,
        image: image.to_string(),
        bot_token: config.telegram.token.clone(),
        tunnel_token: config.github.tunnel_token.clone(),
    };
    let result = workflows.dispatch(&request).await;

    chat.send(Reply::plain(messages::dispatch_outcome(&result)))
        .await
        .map(|_| ())
        .map_err(anyhow::Error::msg)
}
