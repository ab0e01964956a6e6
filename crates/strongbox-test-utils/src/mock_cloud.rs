// SPDX-FileCopyrightText: 2026 Strongbox Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! In-memory cloud drive.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::Mutex;

use strongbox_core::{AdapterType, CloudStore, HealthStatus, PluginAdapter, StrongboxError};

/// A [`CloudStore`] whose files live in a map.
///
/// Supports transport-failure injection, for every call or for deletes
/// only, and an artificial delay for exercising caller-side timeouts.
pub struct MemoryCloudStore {
    files: Mutex<HashMap<String, Vec<u8>>>,
    connected: AtomicBool,
    fail: AtomicBool,
    fail_deletes: AtomicBool,
    delay: Mutex<Option<Duration>>,
    uploads: AtomicUsize,
}

impl MemoryCloudStore {
    /// A connected drive with no files.
    pub fn new() -> Self {
        Self {
            files: Mutex::new(HashMap::new()),
            connected: AtomicBool::new(true),
            fail: AtomicBool::new(false),
            fail_deletes: AtomicBool::new(false),
            delay: Mutex::new(None),
            uploads: AtomicUsize::new(0),
        }
    }

    /// A drive that reports no credentials.
    pub fn disconnected() -> Self {
        let store = Self::new();
        store.connected.store(false, Ordering::SeqCst);
        store
    }

    pub fn set_connected(&self, connected: bool) {
        self.connected.store(connected, Ordering::SeqCst);
    }

    /// Make every subsequent call fail with a transport error.
    pub fn fail_requests(&self, fail: bool) {
        self.fail.store(fail, Ordering::SeqCst);
    }

    /// Make deletes fail while uploads and downloads keep working.
    pub fn fail_deletes(&self, fail: bool) {
        self.fail_deletes.store(fail, Ordering::SeqCst);
    }

    /// Delay every subsequent upload or download by `delay`.
    pub async fn set_delay(&self, delay: Option<Duration>) {
        *self.delay.lock().await = delay;
    }

    /// Place raw bytes at `filename`, as another device would.
    pub async fn put_raw(&self, filename: &str, bytes: impl Into<Vec<u8>>) {
        self.files
            .lock()
            .await
            .insert(filename.to_string(), bytes.into());
    }

    /// Current bytes at `filename`.
    pub async fn raw(&self, filename: &str) -> Option<Vec<u8>> {
        self.files.lock().await.get(filename).cloned()
    }

    /// Current contents of `filename` parsed as JSON.
    pub async fn json(&self, filename: &str) -> Option<Value> {
        self.raw(filename)
            .await
            .and_then(|bytes| serde_json::from_slice(&bytes).ok())
    }

    pub fn upload_count(&self) -> usize {
        self.uploads.load(Ordering::SeqCst)
    }

    async fn simulate_network(&self) -> Result<(), StrongboxError> {
        let delay = *self.delay.lock().await;
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        if self.fail.load(Ordering::SeqCst) {
            return Err(StrongboxError::transport("injected network failure"));
        }
        if !self.connected.load(Ordering::SeqCst) {
            return Err(StrongboxError::transport("not connected"));
        }
        Ok(())
    }
}

impl Default for MemoryCloudStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PluginAdapter for MemoryCloudStore {
    fn name(&self) -> &str {
        "memory-cloud"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Cloud
    }

    async fn health_check(&self) -> Result<HealthStatus, StrongboxError> {
        if self.connected.load(Ordering::SeqCst) {
            Ok(HealthStatus::Healthy)
        } else {
            Ok(HealthStatus::Degraded("not connected".into()))
        }
    }

    async fn shutdown(&self) -> Result<(), StrongboxError> {
        Ok(())
    }
}

#[async_trait]
impl CloudStore for MemoryCloudStore {
    async fn is_connected(&self) -> Result<bool, StrongboxError> {
        Ok(self.connected.load(Ordering::SeqCst))
    }

    async fn upload(&self, filename: &str, payload: &Value) -> Result<String, StrongboxError> {
        self.simulate_network().await?;
        let bytes = serde_json::to_vec(payload)?;
        self.files.lock().await.insert(filename.to_string(), bytes);
        self.uploads.fetch_add(1, Ordering::SeqCst);
        Ok(format!("mem-{filename}"))
    }

    async fn download(&self, filename: &str) -> Result<Option<Vec<u8>>, StrongboxError> {
        self.simulate_network().await?;
        Ok(self.raw(filename).await)
    }

    async fn delete(&self, filename: &str) -> Result<bool, StrongboxError> {
        self.simulate_network().await?;
        if self.fail_deletes.load(Ordering::SeqCst) {
            return Err(StrongboxError::transport("delete refused"));
        }
        Ok(self.files.lock().await.remove(filename).is_some())
    }

    async fn disconnect(&self) -> Result<(), StrongboxError> {
        self.connected.store(false, Ordering::SeqCst);
        Ok(())
    }
}
