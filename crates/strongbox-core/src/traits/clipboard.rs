// SPDX-FileCopyrightText: 2026 Strongbox Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! OS clipboard collaborator. Write-only: the vault never reads the clipboard.

use async_trait::async_trait;

use crate::error::StrongboxError;

#[async_trait]
pub trait ClipboardWriter: Send + Sync {
    /// Places `text` on the system clipboard.
    async fn write_text(&self, text: &str) -> Result<(), StrongboxError>;
}
