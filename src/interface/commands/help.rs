//! # Help Commands
//!
//! Handles `/start`, `/help`, `/actionslist` and the menu buttons on the welcome screen.

use anyhow::Result;

use crate::application::router::{MENU_COMMANDS, MENU_HELP};
use crate::domain::config::AppConfig;
use crate::domain::traits::ChatProvider;
use crate::domain::types::{Button, Keyboard, Reply};
use crate::strings::help;

pub async fn handle_start(
    config: &AppConfig,
    chat: &impl ChatProvider,
    first_name: &str,
) -> Result<()> {
    let keyboard = Keyboard::new()
        .row(Button::callback(help::BUTTON_COMMANDS, MENU_COMMANDS))
        .row(Button::callback(help::BUTTON_HELP, MENU_HELP))
        .row(Button::url(help::BUTTON_REPO, config.repo_url()));

    chat.send(Reply::markdown(help::welcome(first_name)).with_keyboard(keyboard))
        .await
        .map(|_| ())
        .map_err(anyhow::Error::msg)
}

pub async fn handle_help(config: &AppConfig, chat: &impl ChatProvider) -> Result<()> {
    chat.send(Reply::markdown(help::guide(&config.repo_url())).without_preview())
        .await
        .map(|_| ())
        .map_err(anyhow::Error::msg)
}

pub async fn handle_actions_list(config: &AppConfig, chat: &impl ChatProvider) -> Result<()> {
    chat.send(Reply::markdown(help::actions_list(&config.commands)))
        .await
        .map(|_| ())
        .map_err(anyhow::Error::msg)
}

/// Replaces the welcome message with the page behind a menu button.
pub async fn handle_menu(
    config: &AppConfig,
    chat: &impl ChatProvider,
    message_id: i64,
    token: &str,
) -> Result<()> {
    let text = if token == MENU_COMMANDS {
        help::actions_menu(&config.commands)
    } else {
        help::QUICK_GUIDE.to_string()
    };

    chat.edit(message_id, Reply::markdown(text))
        .await
        .map_err(anyhow::Error::msg)
}
