//! # Command Handlers
//!
//! Contains specific handler functions for each supported command (e.g., /start, /actionslist, workload launches).
//! These handlers are invoked by the Router after authorization.

pub mod help;
pub mod launch;
pub mod stop;
