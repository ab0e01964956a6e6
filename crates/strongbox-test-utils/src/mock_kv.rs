// SPDX-FileCopyrightText: 2026 Strongbox Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! In-memory key-value store.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::Mutex;

use strongbox_core::{AdapterType, HealthStatus, KeyValueStore, PluginAdapter, StrongboxError};

/// A [`KeyValueStore`] held entirely in memory.
///
/// `fail_writes(true)` makes every subsequent write fail without touching
/// the stored values, which lets tests observe that multi-key writes are
/// all-or-nothing.
#[derive(Default)]
pub struct MemoryKvStore {
    values: Mutex<HashMap<(String, String), Value>>,
    fail_writes: AtomicBool,
    writes: AtomicUsize,
}

impl MemoryKvStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Toggle write-failure injection.
    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Number of successful `set`/`set_many` calls so far.
    pub fn write_count(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    /// Direct read that bypasses the trait, for assertions.
    pub async fn peek(&self, namespace: &str, key: &str) -> Option<Value> {
        self.values
            .lock()
            .await
            .get(&(namespace.to_string(), key.to_string()))
            .cloned()
    }

    /// Direct write that bypasses failure injection, for seeding state.
    pub async fn seed(&self, namespace: &str, key: &str, value: Value) {
        self.values
            .lock()
            .await
            .insert((namespace.to_string(), key.to_string()), value);
    }

    fn check_writable(&self) -> Result<(), StrongboxError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(StrongboxError::Storage {
                source: "injected write failure".into(),
            });
        }
        Ok(())
    }
}

#[async_trait]
impl PluginAdapter for MemoryKvStore {
    fn name(&self) -> &str {
        "memory-kv"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Persistence
    }

    async fn health_check(&self) -> Result<HealthStatus, StrongboxError> {
        Ok(HealthStatus::Healthy)
    }

    async fn shutdown(&self) -> Result<(), StrongboxError> {
        Ok(())
    }
}

#[async_trait]
impl KeyValueStore for MemoryKvStore {
    async fn get(&self, namespace: &str, key: &str) -> Result<Option<Value>, StrongboxError> {
        Ok(self.peek(namespace, key).await)
    }

    async fn set(&self, namespace: &str, key: &str, value: Value) -> Result<(), StrongboxError> {
        self.set_many(namespace, vec![(key.to_string(), value)])
            .await
    }

    async fn set_many(
        &self,
        namespace: &str,
        entries: Vec<(String, Value)>,
    ) -> Result<(), StrongboxError> {
        self.check_writable()?;
        let mut values = self.values.lock().await;
        for (key, value) in entries {
            values.insert((namespace.to_string(), key), value);
        }
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn delete(&self, namespace: &str, key: &str) -> Result<bool, StrongboxError> {
        self.check_writable()?;
        Ok(self
            .values
            .lock()
            .await
            .remove(&(namespace.to_string(), key.to_string()))
            .is_some())
    }
}
