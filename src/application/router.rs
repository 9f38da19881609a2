//! # Command Router
//!
//! Routes incoming chat events to the appropriate command handler (in `interface/commands`).
//! Every path goes through the allow-list first; nothing else runs for unknown users.

use anyhow::Result;
use std::sync::Arc;

use crate::domain::config::AppConfig;
use crate::domain::traits::{ChatProvider, WorkflowProvider};
use crate::domain::types::{Event, IncomingCallback, IncomingMessage, Reply, RunId};
use crate::interface::commands;
use crate::strings::messages;

pub const MENU_COMMANDS: &str = "list_commands";
pub const MENU_HELP: &str = "show_help";

pub struct CommandRouter {
    config: Arc<AppConfig>,
    workflows: Arc<dyn WorkflowProvider>,
}

impl CommandRouter {
    pub fn new(config: Arc<AppConfig>, workflows: Arc<dyn WorkflowProvider>) -> Self {
        Self { config, workflows }
    }

    pub async fn handle<C>(&self, chat: &C, event: Event) -> Result<()>
    where
        C: ChatProvider,
    {
        match event {
            Event::Message(message) => self.route(chat, &message).await,
            Event::Callback(callback) => self.route_callback(chat, &callback).await,
        }
    }

    pub async fn route<C>(&self, chat: &C, message: &IncomingMessage) -> Result<()>
    where
        C: ChatProvider,
    {
        tracing::info!(
            "Received message from user {} in chat {}: {}",
            message.user_id,
            message.chat_id,
            message.text.as_deref().unwrap_or("<no text>")
        );

        if !self.config.allowed_users.is_authorized(message.user_id) {
            tracing::warn!("User {} is not authorized", message.user_id);
            chat.send(Reply::plain(messages::AUTH_DENIED))
                .await
                .map_err(anyhow::Error::msg)?;
            return Ok(());
        }

        let Some(cmd) = message.text.as_deref().and_then(parse_command) else {
            tracing::debug!("Message is not a command, ignoring");
            return Ok(());
        };

        tracing::info!("Router dispatching cmd='{}' sender='{}'", cmd, message.user_id);

        match cmd {
            "start" => {
                let name = message.first_name.as_deref().unwrap_or("User");
                commands::help::handle_start(&self.config, chat, name).await
            }
            "help" => commands::help::handle_help(&self.config, chat).await,
            "actionslist" => commands::help::handle_actions_list(&self.config, chat).await,
            other => match self.config.commands.resolve(other) {
                Some(image) => {
                    commands::launch::handle_launch(
                        &self.config,
                        self.workflows.as_ref(),
                        chat,
                        message.user_id,
                        image,
                    )
                    .await
                }
                None => {
                    tracing::info!("Unknown command: {}", other);
                    chat.send(Reply::plain(messages::INVALID_COMMAND))
                        .await
                        .map(|_| ())
                        .map_err(anyhow::Error::msg)
                }
            },
        }
    }

    pub async fn route_callback<C>(&self, chat: &C, callback: &IncomingCallback) -> Result<()>
    where
        C: ChatProvider,
    {
        let data = callback.data.as_deref().unwrap_or_default();
        tracing::info!(
            "Received callback query from user {} with data: {}",
            callback.user_id,
            data
        );

        if !self.config.allowed_users.is_authorized(callback.user_id) {
            tracing::warn!("User {} is not authorized for callback query", callback.user_id);
            chat.answer_callback(&callback.id, Some(messages::AUTH_DENIED_ACTION))
                .await
                .map_err(anyhow::Error::msg)?;
            return Ok(());
        }

        if let Err(e) = chat.answer_callback(&callback.id, None).await {
            // The spinner times out on its own; keep going.
            tracing::warn!("Failed to answer callback query {}: {}", callback.id, e);
        }

        match data {
            MENU_COMMANDS | MENU_HELP => {
                commands::help::handle_menu(&self.config, chat, callback.message_id, data).await
            }
            _ => match RunId::parse(data) {
                Some(run_id) => {
                    commands::stop::handle_stop(
                        self.workflows.as_ref(),
                        chat,
                        callback.message_id,
                        &run_id,
                    )
                    .await
                }
                None => {
                    tracing::info!("Unknown callback data: {}", data);
                    Ok(())
                }
            },
        }
    }
}

/// `/chrome@neko_bot extra` -> `chrome`. Non-commands yield `None`.
pub fn parse_command(text: &str) -> Option<&str> {
    let first = text.split_whitespace().next()?;
    let cmd = first.strip_prefix('/')?;
    let cmd = cmd.split('@').next().unwrap_or_default();
    if cmd.is_empty() { None } else { Some(cmd) }
}
