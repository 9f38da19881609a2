//! # Infrastructure Layer
//!
//! Handles interactions with external systems: the Telegram Bot API and GitHub Actions.
//! Implements the traits defined in the Domain layer (ChatProvider, WorkflowProvider).

pub mod github;
pub mod polling;
pub mod telegram;
pub mod webhook;
