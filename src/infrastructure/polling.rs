//! # Long Polling
//!
//! Pulls updates with `getUpdates` and hands each one to its own task.
//! On shutdown, handlers already running are awaited before returning.

use anyhow::{Context, Result};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinSet;

use crate::application::bot::Bot;

const POLL_WAIT_SECS: u64 = 30;
const RETRY_DELAY: Duration = Duration::from_secs(5);

pub struct Poller {
    bot: Arc<Bot>,
    offset: i64,
    tasks: JoinSet<()>,
}

impl Poller {
    pub fn new(bot: Arc<Bot>) -> Self {
        Self {
            bot,
            offset: 0,
            tasks: JoinSet::new(),
        }
    }

    /// Fetches one batch and spawns a handler per update. Returns how many were spawned.
    pub async fn poll_once(&mut self, wait_secs: u64) -> Result<usize> {
        while let Some(done) = self.tasks.try_join_next() {
            log_join(done);
        }

        let updates = self.bot.api.get_updates(self.offset, wait_secs).await?;
        let count = updates.len();
        for update in updates {
            self.offset = self.offset.max(update.update_id + 1);
            let bot = self.bot.clone();
            self.tasks.spawn(async move { bot.deliver(update).await });
        }
        Ok(count)
    }

    /// Waits for every spawned handler to finish.
    pub async fn drain(&mut self) {
        while let Some(done) = self.tasks.join_next().await {
            log_join(done);
        }
    }

    /// Polls until `shutdown` resolves.
    pub async fn run(mut self, shutdown: impl Future<Output = ()>) -> Result<()> {
        // getUpdates is refused while a webhook is registered.
        self.bot
            .api
            .delete_webhook(false)
            .await
            .context("Failed to remove webhook before polling")?;

        tracing::info!("Bot is running. Press Ctrl+C to stop.");
        tokio::pin!(shutdown);

        loop {
            let batch = tokio::select! {
                _ = &mut shutdown => break,
                batch = self.poll_once(POLL_WAIT_SECS) => batch,
            };

            if let Err(e) = batch {
                tracing::error!("Polling failed: {}", e);
                tokio::select! {
                    _ = &mut shutdown => break,
                    _ = tokio::time::sleep(RETRY_DELAY) => {}
                }
            }
        }

        if !self.tasks.is_empty() {
            tracing::info!("Waiting for {} in-flight updates", self.tasks.len());
        }
        self.drain().await;
        tracing::info!("Polling stopped");
        Ok(())
    }
}

fn log_join(done: Result<(), tokio::task::JoinError>) {
    if let Err(e) = done {
        tracing::error!("Update handler crashed: {}", e);
    }
}
