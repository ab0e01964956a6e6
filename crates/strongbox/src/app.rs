// SPDX-FileCopyrightText: 2026 Strongbox Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Wiring shared by every command: storage, vault, cloud store and sync.

use std::sync::Arc;

use secrecy::SecretString;
use strongbox_config::StrongboxConfig;
use strongbox_core::{ClipboardWriter, PluginAdapter, StrongboxError};
use strongbox_storage::SqliteKvStore;
use strongbox_sync::{LocalDriveStore, SyncReconciler, UploadOutcome};
use strongbox_vault::{Vault, prompt};
use tracing::{debug, info, warn};

use crate::clipboard::Osc52Clipboard;

pub struct App {
    pub config: StrongboxConfig,
    pub kv: Arc<SqliteKvStore>,
    pub vault: Arc<Vault>,
    pub drive: Arc<LocalDriveStore>,
    pub sync: SyncReconciler,
}

impl App {
    pub async fn open(config: StrongboxConfig) -> Result<Self, StrongboxError> {
        Self::open_with_clipboard(config, Arc::new(Osc52Clipboard)).await
    }

    pub async fn open_with_clipboard(
        config: StrongboxConfig,
        clipboard: Arc<dyn ClipboardWriter>,
    ) -> Result<Self, StrongboxError> {
        let kv = Arc::new(SqliteKvStore::open(config.storage.clone()).await?);
        let vault = Arc::new(Vault::new(kv.clone(), &config).with_clipboard(clipboard));
        let drive = Arc::new(LocalDriveStore::new(kv.clone()));
        let sync = SyncReconciler::new(vault.clone(), drive.clone(), &config.sync);
        debug!(path = %config.storage.database_path, "strongbox opened");
        Ok(Self {
            config,
            kv,
            vault,
            drive,
            sync,
        })
    }

    /// Unlock with the master password from the environment or a prompt,
    /// then merge the cloud copy if a directory is linked.
    pub async fn unlock(&self) -> Result<(), StrongboxError> {
        let password = self.read_master_password().await?;
        self.unlock_with(&password).await
    }

    /// Unlock without touching the cloud copy.
    ///
    /// Used by `sync` commands, which decide for themselves whether remote
    /// data is merged.
    pub async fn unlock_local(&self) -> Result<(), StrongboxError> {
        let password = self.read_master_password().await?;
        self.open_session(&password).await
    }

    pub async fn unlock_with(&self, password: &SecretString) -> Result<(), StrongboxError> {
        self.open_session(password).await?;
        self.pull_on_unlock().await;
        Ok(())
    }

    async fn read_master_password(&self) -> Result<SecretString, StrongboxError> {
        if !self.vault.has_master_key().await? {
            return Err(StrongboxError::NotInitialized);
        }
        prompt::get_master_password()
    }

    async fn open_session(&self, password: &SecretString) -> Result<(), StrongboxError> {
        if self.vault.unlock(password).await? {
            Ok(())
        } else {
            Err(StrongboxError::AuthFailure)
        }
    }

    /// A failed pull is reported and the session continues on local data.
    async fn pull_on_unlock(&self) {
        match self.sync.pull_if_connected().await {
            Ok(Some(report)) => info!(
                added = report.added,
                failed = report.failed,
                "merged cloud copy on unlock"
            ),
            Ok(None) => {}
            Err(e) => warn!(error = %e, "cloud pull on unlock failed, using local vault"),
        }
    }

    /// Push the vault to the cloud after a saved change, if connected.
    ///
    /// A failed upload is reported but never fails the change itself.
    pub async fn auto_upload(&self) {
        match self.sync.upload_if_connected().await {
            Ok(Some(UploadOutcome::Uploaded { count, .. })) => {
                info!(count, "vault synced to cloud");
            }
            Ok(_) => {}
            Err(e) => warn!(error = %e, "automatic cloud upload failed"),
        }
    }

    /// Persist pending changes, lock, and checkpoint the database.
    pub async fn close(&self) -> Result<(), StrongboxError> {
        self.vault.lock().await?;
        self.kv.shutdown().await
    }
}
