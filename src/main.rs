//! # Main Entry Point
//!
//! Telegram front end for on-demand remote desktops run as GitHub Actions workflows:
//! - Domain: Configuration, Command Table and Types
//! - Infrastructure: Telegram, GitHub, Polling, Webhook
//! - Application: Router, Bot, Logging
//! - Interface: Command Handlers
//!

mod application;
mod domain;
mod infrastructure;
mod interface;
mod strings;

#[cfg(test)]
mod test_support;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::net::TcpListener;

use crate::application::bot::Bot;
use crate::domain::commands::CommandTable;
use crate::domain::config::AppConfig;
use crate::infrastructure::polling::Poller;

#[derive(Debug, Parser)]
#[command(
    name = "neko-bot",
    version,
    about = "Start and stop remote desktop containers on GitHub Actions from Telegram"
)]
struct Cli {
    /// Directory for session.log
    #[arg(long, global = true, default_value = "data")]
    log_dir: PathBuf,

    /// YAML file replacing the built-in command table
    #[arg(long, global = true)]
    commands: Option<PathBuf>,

    /// Environment file loaded before reading configuration
    #[arg(long, global = true, default_value = ".env")]
    env_file: PathBuf,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Receive updates by long polling (default)
    Poll,
    /// Receive updates through the webhook HTTP server
    Serve {
        #[arg(long, default_value = "0.0.0.0:8080")]
        bind: String,
    },
    /// Manage the Telegram webhook registration
    Webhook {
        #[command(subcommand)]
        action: WebhookAction,
    },
}

#[derive(Debug, Subcommand)]
enum WebhookAction {
    /// Point Telegram at a public URL
    Set { url: String },
    /// Show the current registration
    Info,
    /// Remove the registration
    Delete {
        #[arg(long)]
        drop_pending: bool,
    },
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for Ctrl+C: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Received Ctrl+C, shutting down");
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // 1. Environment (.env is optional; real env vars win)
    let env_loaded = dotenvy::from_path(&cli.env_file).is_ok();

    // 2. Logging Setup
    let _guard = application::logging::init(&cli.log_dir)?;
    if env_loaded {
        tracing::info!("Loaded environment from {}", cli.env_file.display());
    }

    // 3. Load Configuration
    let commands = match &cli.commands {
        Some(path) => CommandTable::load(path)?,
        None => CommandTable::default(),
    };
    let config = match AppConfig::from_env(commands) {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("{}", e);
            return Err(e.into());
        }
    };
    tracing::info!(
        "Configured {} commands for {} ({}), {} allowed users",
        config.commands.len(),
        config.github.repo,
        config.github.workflow,
        config.allowed_users.len()
    );
    if config.allowed_users.is_empty() {
        tracing::warn!("ALLOWED_USER_IDS is empty; every request will be declined");
    }

    // 4. Initialize Infrastructure
    let bot = Arc::new(Bot::new(config)?);

    // 5. Run
    match cli.command.unwrap_or(Command::Poll) {
        Command::Poll => {
            tracing::info!("Starting Telegram bot...");
            let me = bot
                .api
                .get_me()
                .await
                .context("Failed to log in to Telegram")?;
            tracing::info!("Logged in as @{}", me.username.unwrap_or_default());
            Poller::new(bot).run(shutdown_signal()).await?;
        }
        Command::Serve { bind } => {
            let listener = TcpListener::bind(&bind)
                .await
                .with_context(|| format!("Failed to bind to {bind}"))?;
            infrastructure::webhook::serve(listener, bot, shutdown_signal()).await?;
        }
        Command::Webhook { action } => match action {
            WebhookAction::Set { url } => {
                let accepted = bot.api.set_webhook(&url).await?;
                tracing::info!("setWebhook {} -> {}", url, accepted);
            }
            WebhookAction::Info => {
                let info = bot.api.get_webhook_info().await?;
                println!("{}", serde_json::to_string_pretty(&info)?);
            }
            WebhookAction::Delete { drop_pending } => {
                let accepted = bot.api.delete_webhook(drop_pending).await?;
                tracing::info!("deleteWebhook -> {}", accepted);
            }
        },
    }

    Ok(())
}
