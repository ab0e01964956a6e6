// SPDX-FileCopyrightText: 2026 Strongbox Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Directory-backed cloud store.
//!
//! The "credentials" are the path of a linked directory, typically one kept
//! in sync by a desktop cloud client. The link lives in the key-value store
//! so that [`CloudStore::disconnect`] forgets it the way a logout would.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;
use strongbox_core::{
    AdapterType, CloudStore, HealthStatus, KeyValueStore, PluginAdapter, StrongboxError,
};
use tracing::{debug, info};

/// Key-value namespace holding sync collaborator state.
pub const SYNC_NAMESPACE: &str = "strongbox_sync";

/// Key under [`SYNC_NAMESPACE`] holding the linked directory.
pub const DRIVE_LINK_KEY: &str = "drive_dir";

fn io_error(message: impl Into<String>, e: std::io::Error) -> StrongboxError {
    StrongboxError::SyncTransport {
        message: message.into(),
        source: Some(Box::new(e)),
    }
}

fn checked_filename(filename: &str) -> Result<&str, StrongboxError> {
    let plain = Path::new(filename)
        .file_name()
        .is_some_and(|name| name == filename);
    if plain && !filename.starts_with('.') {
        Ok(filename)
    } else {
        Err(StrongboxError::transport(format!(
            "invalid cloud file name: {filename:?}"
        )))
    }
}

/// Cloud store writing one file per name into a linked directory.
pub struct LocalDriveStore {
    kv: Arc<dyn KeyValueStore>,
}

impl LocalDriveStore {
    pub fn new(kv: Arc<dyn KeyValueStore>) -> Self {
        Self { kv }
    }

    /// Link `dir`, creating it if needed.
    pub async fn connect(&self, dir: &Path) -> Result<PathBuf, StrongboxError> {
        tokio::fs::create_dir_all(dir)
            .await
            .map_err(|e| io_error(format!("cannot create {}", dir.display()), e))?;
        let dir = tokio::fs::canonicalize(dir)
            .await
            .map_err(|e| io_error(format!("cannot resolve {}", dir.display()), e))?;
        self.kv
            .set(
                SYNC_NAMESPACE,
                DRIVE_LINK_KEY,
                Value::String(dir.to_string_lossy().into_owned()),
            )
            .await?;
        info!(dir = %dir.display(), "cloud directory linked");
        Ok(dir)
    }

    /// The linked directory, if any.
    pub async fn linked_dir(&self) -> Result<Option<PathBuf>, StrongboxError> {
        match self.kv.get(SYNC_NAMESPACE, DRIVE_LINK_KEY).await? {
            Some(Value::String(path)) if !path.is_empty() => Ok(Some(PathBuf::from(path))),
            _ => Ok(None),
        }
    }

    async fn require_dir(&self) -> Result<PathBuf, StrongboxError> {
        self.linked_dir()
            .await?
            .ok_or_else(|| StrongboxError::transport("not connected to a cloud directory"))
    }
}

#[async_trait]
impl PluginAdapter for LocalDriveStore {
    fn name(&self) -> &str {
        "local-drive"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Cloud
    }

    async fn health_check(&self) -> Result<HealthStatus, StrongboxError> {
        let Some(dir) = self.linked_dir().await? else {
            return Ok(HealthStatus::Degraded("not connected".into()));
        };
        match tokio::fs::metadata(&dir).await {
            Ok(meta) if meta.is_dir() => Ok(HealthStatus::Healthy),
            Ok(_) => Ok(HealthStatus::Unhealthy(format!(
                "{} is not a directory",
                dir.display()
            ))),
            Err(e) => Ok(HealthStatus::Unhealthy(format!("{}: {e}", dir.display()))),
        }
    }

    async fn shutdown(&self) -> Result<(), StrongboxError> {
        Ok(())
    }
}

#[async_trait]
impl CloudStore for LocalDriveStore {
    async fn is_connected(&self) -> Result<bool, StrongboxError> {
        Ok(self.linked_dir().await?.is_some())
    }

    /// Write atomically via a temporary sibling file and rename.
    async fn upload(&self, filename: &str, payload: &Value) -> Result<String, StrongboxError> {
        let filename = checked_filename(filename)?;
        let dir = self.require_dir().await?;
        let target = dir.join(filename);
        let staging = dir.join(format!(".{filename}.tmp"));

        let bytes = serde_json::to_vec_pretty(payload)?;
        tokio::fs::write(&staging, &bytes)
            .await
            .map_err(|e| io_error(format!("cannot write {}", staging.display()), e))?;
        tokio::fs::rename(&staging, &target)
            .await
            .map_err(|e| io_error(format!("cannot replace {}", target.display()), e))?;

        debug!(path = %target.display(), bytes = bytes.len(), "cloud file written");
        Ok(target.to_string_lossy().into_owned())
    }

    async fn download(&self, filename: &str) -> Result<Option<Vec<u8>>, StrongboxError> {
        let filename = checked_filename(filename)?;
        let path = self.require_dir().await?.join(filename);
        match tokio::fs::read(&path).await {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(io_error(format!("cannot read {}", path.display()), e)),
        }
    }

    async fn delete(&self, filename: &str) -> Result<bool, StrongboxError> {
        let filename = checked_filename(filename)?;
        let path = self.require_dir().await?.join(filename);
        match tokio::fs::remove_file(&path).await {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(io_error(format!("cannot delete {}", path.display()), e)),
        }
    }

    async fn disconnect(&self) -> Result<(), StrongboxError> {
        self.kv.delete(SYNC_NAMESPACE, DRIVE_LINK_KEY).await?;
        info!("cloud directory unlinked");
        Ok(())
    }
}
