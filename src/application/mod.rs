//! # Application Layer
//!
//! Contains the bot's orchestration: command routing, update delivery and logging setup.

pub mod bot;
pub mod logging;
pub mod router;
