//! Error taxonomy for the shell
//!
//! Recoverable classes (configuration, resources, child processes) are
//! logged and absorbed where they are detected; only a failed display
//! connection is allowed to end the process.

use thiserror::Error;

/// Errors surfaced by shell subsystems
#[derive(Debug, Error)]
pub enum ShellError {
    /// A launcher command was empty after tokenization
    #[error("launcher command is empty")]
    EmptyCommand,

    /// A launcher token could not be turned into a C string
    #[error("launcher command contains an interior NUL byte")]
    NulInCommand,

    /// fork(2) failed; the activation is abandoned
    #[error("failed to fork launcher child: {0}")]
    Fork(#[source] std::io::Error),

    /// An icon file could not be decoded
    #[error("failed to load icon {path}: {reason}")]
    Icon { path: String, reason: String },

    /// The toolkit display connection could not be created (fatal at startup)
    #[error("failed to create display connection: {0}")]
    Connect(String),

    /// No wire transport is compiled into this build
    #[error("no wire transport available: {0}")]
    Transport(String),
}
