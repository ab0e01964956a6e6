// SPDX-FileCopyrightText: 2026 Strongbox Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Cloud blob store collaborator.

use async_trait::async_trait;
use serde_json::Value;

use crate::error::StrongboxError;
use crate::traits::adapter::PluginAdapter;

/// Remote storage addressed by file name. One logical file per vault.
///
/// Implementations report remote failures as
/// [`StrongboxError::SyncTransport`].
#[async_trait]
pub trait CloudStore: PluginAdapter {
    /// True if credentials for the remote are currently held.
    async fn is_connected(&self) -> Result<bool, StrongboxError>;

    /// Creates or replaces `filename` with the JSON payload. Returns the remote file id.
    async fn upload(&self, filename: &str, payload: &Value) -> Result<String, StrongboxError>;

    /// Fetches the raw bytes of `filename`, or `None` if it does not exist.
    async fn download(&self, filename: &str) -> Result<Option<Vec<u8>>, StrongboxError>;

    /// Deletes `filename`. Returns whether it existed.
    async fn delete(&self, filename: &str) -> Result<bool, StrongboxError>;

    /// Forgets the remote credentials.
    async fn disconnect(&self) -> Result<(), StrongboxError>;
}
