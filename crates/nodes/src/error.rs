//! Node-level error types.

use thiserror::Error;

/// Errors returned by a node's `execute` method.
///
/// The host uses the variant to decide retry behaviour:
/// - `Retryable` — nothing was persisted; running the node again is safe.
/// - `Fatal`     — the workflow branch is aborted.
#[derive(Debug, Error, Clone)]
pub enum NodeError {
    /// Transient failure; the host may re-try the node.
    #[error("retryable node error: {0}")]
    Retryable(String),

    /// Permanent failure; no retry should be attempted.
    #[error("fatal node error: {0}")]
    Fatal(String),
}

/// Failures reading host-supplied parameters or credentials.
#[derive(Debug, Error)]
pub enum ContextError {
    #[error("credential '{0}' was not supplied")]
    MissingCredential(String),

    #[error("credential '{name}' is malformed: {source}")]
    InvalidCredential {
        name: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid node parameters: {0}")]
    InvalidParameters(#[source] serde_json::Error),
}
