//! # Domain Errors

/// Failure of a single call to the workflow provider.
#[derive(Debug, thiserror::Error)]
pub enum WorkflowError {
    /// The provider answered with a non-2xx status.
    #[error("HTTP {status}: {body}")]
    Http { status: u16, body: String },
    /// The request never produced a response (DNS, connect, timeout).
    #[error("network error: {0}")]
    Network(String),
}

/// Problems found while loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{0} not found in environment variables!")]
    Missing(&'static str),
    #[error("invalid value for {name}: {reason}")]
    Invalid {
        name: &'static str,
        reason: String,
    },
    #[error("invalid command table: {0}")]
    CommandTable(String),
}
