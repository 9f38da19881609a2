//! # Messages
//!
//! Contains constant strings and format functions for user-facing messages.
//! Includes authorization replies, workflow outcomes, and progress notices.

use crate::domain::errors::WorkflowError;
use crate::domain::types::RunId;

pub const AUTH_DENIED: &str = "⛔ You are not authorized to use this bot.";
pub const AUTH_DENIED_ACTION: &str = "⛔ You are not authorized to perform this action.";
pub const INVALID_COMMAND: &str = "❌ Invalid command!";
pub const DISPATCH_OK: &str = "✅ Workflow successfully triggered!";
pub const NETWORK_ERROR: &str = "❌ Network Error: could not reach GitHub. Please try again later.";

/// Longest provider error body echoed to chat. Telegram rejects texts over 4096 chars.
pub const MAX_ERROR_BODY_CHARS: usize = 3500;

pub fn starting_instance(image: &str) -> String {
    format!("🔄 Starting {image} instance...")
}

pub fn dispatch_outcome(result: &Result<(), WorkflowError>) -> String {
    match result {
        Ok(()) => DISPATCH_OK.to_string(),
        Err(WorkflowError::Http { status, body }) => {
            format!("❌ HTTP Error: {status}\n{}", clip(body))
        }
        Err(WorkflowError::Network(_)) => NETWORK_ERROR.to_string(),
    }
}

pub fn cancel_outcome(run_id: &RunId, result: &Result<(), WorkflowError>) -> String {
    match result {
        Ok(()) => format!("🟠 Workflow {run_id} is being stopped!"),
        Err(WorkflowError::Http { status, body }) => {
            format!("❌ Failed to stop: {status}\n{}", clip(body))
        }
        Err(WorkflowError::Network(_)) => NETWORK_ERROR.to_string(),
    }
}

/// Cuts `body` to `MAX_ERROR_BODY_CHARS`. The full body is logged by the client.
fn clip(body: &str) -> std::borrow::Cow<'_, str> {
    match body.char_indices().nth(MAX_ERROR_BODY_CHARS) {
        Some((end, _)) => format!("{}…", &body[..end]).into(),
        None => body.into(),
    }
}

// Webhook test endpoint
pub const TEST_PLAIN: &str = "🧪 Test 1: Simple message";
pub const TEST_MARKDOWN: &str = "*Test 2:* Message with `Markdown`";
pub const TEST_KEYBOARD: &str = "🧪 Test 3: Message with keyboard";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dispatch_outcomes() {
        assert_eq!(dispatch_outcome(&Ok(())), DISPATCH_OK);

        let http = dispatch_outcome(&Err(WorkflowError::Http {
            status: 422,
            body: r#"{"message":"Unexpected inputs provided"}"#.into(),
        }));
        assert!(http.contains("422"));
        assert!(http.contains("Unexpected inputs provided"));

        let net = dispatch_outcome(&Err(WorkflowError::Network("dns failure".into())));
        assert_eq!(net, NETWORK_ERROR);
    }

    #[test]
    fn test_cancel_outcomes() {
        let run = RunId::parse("123456").unwrap();
        let ok = cancel_outcome(&run, &Ok(()));
        assert!(ok.contains("123456"));
        assert!(ok.contains("being stopped"));

        let http = cancel_outcome(
            &run,
            &Err(WorkflowError::Http {
                status: 409,
                body: "conflict".into(),
            }),
        );
        assert!(http.starts_with("❌ Failed to stop: 409"));
        assert!(http.ends_with("conflict"));

        let net = cancel_outcome(&run, &Err(WorkflowError::Network("timed out".into())));
        assert_eq!(net, NETWORK_ERROR);
    }

    #[test]
    fn test_oversized_error_body_fits_one_message() {
        let err = Err(WorkflowError::Http {
            status: 500,
            body: "é".repeat(10_000),
        });
        let run = RunId::parse("9").unwrap();
        let kept = "é".repeat(MAX_ERROR_BODY_CHARS);

        for text in [dispatch_outcome(&err), cancel_outcome(&run, &err)] {
            assert!(text.chars().count() <= 4096);
            assert!(text.ends_with(&format!("{kept}…")));
        }
    }
}
