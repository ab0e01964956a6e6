// SPDX-FileCopyrightText: 2026 Strongbox Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Key-value persistence collaborator.

use async_trait::async_trait;
use serde_json::Value;

use crate::error::StrongboxError;
use crate::traits::adapter::PluginAdapter;

/// Namespaced JSON key-value persistence.
///
/// The vault keeps everything it persists under one namespace: the
/// envelope array, the master hash and the master salt.
#[async_trait]
pub trait KeyValueStore: PluginAdapter {
    /// Reads a value, returning `None` if the key was never written.
    async fn get(&self, namespace: &str, key: &str) -> Result<Option<Value>, StrongboxError>;

    /// Writes a single value, replacing any previous one.
    async fn set(&self, namespace: &str, key: &str, value: Value) -> Result<(), StrongboxError>;

    /// Writes several values atomically: either all become visible or none do.
    async fn set_many(
        &self,
        namespace: &str,
        entries: Vec<(String, Value)>,
    ) -> Result<(), StrongboxError>;

    /// Removes a key. Returns whether it existed.
    async fn delete(&self, namespace: &str, key: &str) -> Result<bool, StrongboxError>;
}
