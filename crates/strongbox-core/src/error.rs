// SPDX-FileCopyrightText: 2026 Strongbox Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for Strongbox.

use thiserror::Error;

/// The primary error type used across all Strongbox crates.
///
/// Single-record cryptographic failures never surface through this type:
/// envelope decryption reports them as `None` and batch operations count them.
#[derive(Debug, Error)]
pub enum StrongboxError {
    /// Configuration errors (invalid TOML, missing required fields, type mismatches).
    #[error("configuration error: {0}")]
    Config(String),

    /// Persistence backend errors (database connection, query failure, serialization).
    #[error("storage error: {source}")]
    Storage {
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Wrong master password.
    #[error("master password is incorrect")]
    AuthFailure,

    /// Short or mismatched password during setup or rotation.
    #[error("weak input: {0}")]
    WeakInput(String),

    /// A stored envelope could not be decrypted or is structurally invalid.
    #[error("envelope {index} is corrupt: {reason}")]
    EnvelopeCorrupt { index: usize, reason: String },

    /// The cloud payload is not in a recognized format.
    #[error("invalid cloud data format: {0}")]
    SyncFormat(String),

    /// The cloud collaborator failed (network, auth, missing file).
    #[error("cloud sync failed: {message}")]
    SyncTransport {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Low-level cryptographic failure (RNG, key construction).
    #[error("vault error: {0}")]
    Vault(String),

    /// The operation requires an unlocked vault.
    #[error("vault is locked")]
    Locked,

    /// No master password has been set up yet.
    #[error("vault has not been initialized -- run setup first")]
    NotInitialized,

    /// A master password already exists.
    #[error("vault is already initialized")]
    AlreadyInitialized,

    /// An entry failed validation on save.
    #[error("invalid entry: {0}")]
    InvalidEntry(String),

    /// No entry with the given id exists in the working set.
    #[error("entry not found: {0}")]
    EntryNotFound(String),

    /// The clipboard collaborator failed.
    #[error("clipboard error: {0}")]
    Clipboard(String),

    /// Operation timed out.
    #[error("operation timed out after {duration:?}")]
    Timeout { duration: std::time::Duration },

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}

impl StrongboxError {
    /// Shorthand for a transport failure without an underlying source.
    pub fn transport(message: impl Into<String>) -> Self {
        Self::SyncTransport {
            message: message.into(),
            source: None,
        }
    }

    /// True for errors the user can fix by re-entering input.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Self::AuthFailure | Self::WeakInput(_) | Self::InvalidEntry(_)
        )
    }
}

impl From<serde_json::Error> for StrongboxError {
    fn from(e: serde_json::Error) -> Self {
        Self::Storage {
            source: Box::new(e),
        }
    }
}
