//! Error types shared across the crate.

use std::path::PathBuf;
use thiserror::Error;

/// Everything that can go wrong inside carta.
#[derive(Error, Debug)]
pub enum Error {
    /// Filesystem access failed.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// A JSON payload could not be encoded or decoded.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// A search pattern could not be compiled.
    #[error("pattern error: {0}")]
    Pattern(#[from] regex::Error),

    /// The chat endpoint refused or failed the request.
    #[error("chat request failed: {reason}")]
    Chat {
        /// HTTP status when the server answered at all.
        status: Option<u16>,
        /// Human readable cause.
        reason: String,
    },

    /// The configuration file exists but could not be used.
    #[error("invalid config {path:?}: {reason}")]
    Config {
        /// Location of the offending file.
        path: PathBuf,
        /// Parser message.
        reason: String,
    },

    /// Preferences could not be written.
    #[error("failed to store preference {key}: {reason}")]
    Preferences {
        /// Preference key being written.
        key: String,
        /// Underlying cause.
        reason: String,
    },
}

impl Error {
    #[must_use]
    /// Build a chat error for a transport-level failure.
    pub fn chat_transport(reason: impl std::fmt::Display) -> Self {
        Self::Chat {
            status: None,
            reason: reason.to_string(),
        }
    }
}

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;
