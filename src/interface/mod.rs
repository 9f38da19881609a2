//! # Interface Layer
//!
//! User-facing command handlers, invoked by the router.

pub mod commands;
