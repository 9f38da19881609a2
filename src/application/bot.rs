//! # Bot
//!
//! Wires configuration, the Telegram API and the GitHub client into one shareable handle.
//! Both update sources (polling and webhook) hand updates to `Bot::deliver`.

use anyhow::Result;
use std::sync::Arc;

use crate::application::router::CommandRouter;
use crate::domain::config::AppConfig;
use crate::domain::traits::WorkflowProvider;
use crate::infrastructure::github::GitHubClient;
use crate::infrastructure::telegram::{SharedTelegramApi, TelegramApi, TelegramChat, Update};

pub struct Bot {
    pub config: Arc<AppConfig>,
    pub api: SharedTelegramApi,
    router: CommandRouter,
}

impl Bot {
    pub fn new(config: AppConfig) -> Result<Self> {
        let config = Arc::new(config);
        let api = Arc::new(TelegramApi::new(&config.telegram)?);
        let github = GitHubClient::new(config.github.clone())?;
        let workflows: Arc<dyn WorkflowProvider> = Arc::new(github);
        let router = CommandRouter::new(config.clone(), workflows);
        Ok(Self {
            config,
            api,
            router,
        })
    }

    /// Handles one update to completion. Failures are logged, never returned.
    pub async fn deliver(&self, update: Update) {
        let update_id = update.update_id;
        let Some(event) = update.into_event() else {
            tracing::debug!("Update {} type not recognized", update_id);
            return;
        };

        let chat = TelegramChat::new(self.api.clone(), event.chat_id());
        if let Err(e) = self.router.handle(&chat, event).await {
            tracing::error!("Failed to handle update {}: {}", update_id, e);
        }
    }
}
