//! # Domain Layer
//!
//! Core definitions, types, and traits of the bot.
//! Independent of the chat platform and of the CI provider, serving as the contract for other layers.

pub mod commands;
pub mod config;
pub mod errors;
pub mod traits;
pub mod types;
