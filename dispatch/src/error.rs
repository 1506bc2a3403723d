//! Error types for registry, loader and dispatcher operations.
//!
//! Discovery and lookup are best-effort and never produce these errors; a
//! missing commands directory or an unknown command simply yields nothing.
//! What remains is configuration I/O, handler failures, and the deliberate
//! refusal to mutate the command view directly.

use thiserror::Error;

/// Errors that can occur while configuring or dispatching commands.
#[derive(Debug, Error)]
pub enum DispatchError {
    /// Attempt to replace the dispatcher's command view instead of registering.
    #[error("invalid mutation: {0}")]
    InvalidMutation(String),

    /// File I/O failure.
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// YAML parsing or serialization failure.
    #[error("YAML error: {0}")]
    YamlError(#[from] serde_yaml::Error),

    /// A command handler reported a failure.
    #[error("command '{command}' failed: {message}")]
    HandlerFailed { command: String, message: String },

    /// The handler does not implement `run`.
    #[error("command '{0}' does not implement run()")]
    NotImplemented(String),

    /// An action table has no entry for the requested action.
    #[error("unknown action: {0}")]
    UnknownAction(String),
}

/// Convenience alias for results with [`DispatchError`].
pub type Result<T> = std::result::Result<T, DispatchError>;
