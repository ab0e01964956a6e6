// SPDX-FileCopyrightText: 2026 Strongbox Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Upload, download and local-first reconciliation against a cloud store.
//!
//! Uploads send the persisted envelope array, never plaintext. Downloads are
//! normalized, decrypted record by record, and merged so that no local entry
//! is ever overwritten. Every cloud call is bounded by the configured
//! timeout; a failed or timed-out call leaves local state untouched.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use strongbox_config::model::SyncConfig;
use strongbox_core::{Clock, CloudStore, StrongboxError, SystemClock};
use strongbox_vault::{MergeReport, Vault};
use tracing::{debug, error, info, warn};

use crate::snapshot::{build_snapshot, normalize_payload};

/// Result of an upload attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UploadOutcome {
    /// The snapshot was stored remotely.
    Uploaded { file_id: String, count: usize },
    /// The vault has no persisted records, so nothing was sent.
    NothingToSync,
}

/// Connection state reported by [`SyncReconciler::status`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SyncStatus {
    pub connected: bool,
    pub remote_exists: bool,
}

/// Reconciles one vault with one remote file.
pub struct SyncReconciler {
    vault: Arc<Vault>,
    cloud: Arc<dyn CloudStore>,
    clock: Arc<dyn Clock>,
    filename: String,
    timeout: Duration,
    auto_upload: bool,
}

impl SyncReconciler {
    pub fn new(vault: Arc<Vault>, cloud: Arc<dyn CloudStore>, config: &SyncConfig) -> Self {
        Self {
            vault,
            cloud,
            clock: Arc::new(SystemClock),
            filename: config.filename.clone(),
            timeout: Duration::from_secs(config.timeout_secs),
            auto_upload: config.auto_upload,
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn filename(&self) -> &str {
        &self.filename
    }

    async fn bounded<T>(
        &self,
        call: impl Future<Output = Result<T, StrongboxError>>,
    ) -> Result<T, StrongboxError> {
        tokio::time::timeout(self.timeout, call)
            .await
            .map_err(|_| StrongboxError::Timeout {
                duration: self.timeout,
            })?
    }

    pub async fn is_connected(&self) -> Result<bool, StrongboxError> {
        self.bounded(self.cloud.is_connected()).await
    }

    /// Whether credentials are held and whether the remote file exists.
    pub async fn status(&self) -> Result<SyncStatus, StrongboxError> {
        if !self.is_connected().await? {
            return Ok(SyncStatus {
                connected: false,
                remote_exists: false,
            });
        }
        let remote = self.bounded(self.cloud.download(&self.filename)).await?;
        Ok(SyncStatus {
            connected: true,
            remote_exists: remote.is_some(),
        })
    }

    /// Upload the persisted envelopes as a snapshot.
    ///
    /// Pending in-memory changes are flushed first. An empty vault is not
    /// uploaded.
    pub async fn upload(&self) -> Result<UploadOutcome, StrongboxError> {
        let envelopes = self.vault.persisted_envelopes().await?;
        if envelopes.is_empty() {
            info!("no passwords to sync");
            return Ok(UploadOutcome::NothingToSync);
        }

        let count = envelopes.len();
        let snapshot = build_snapshot(envelopes, self.clock.now());
        let payload = serde_json::to_value(&snapshot)?;
        let file_id = self
            .bounded(self.cloud.upload(&self.filename, &payload))
            .await
            .inspect_err(|e| error!(error = %e, "upload to cloud failed"))?;

        info!(count, file_id = %file_id, "uploaded to cloud");
        Ok(UploadOutcome::Uploaded { file_id, count })
    }

    /// Download the remote snapshot and merge it into the vault local-first.
    pub async fn download_and_merge(&self) -> Result<MergeReport, StrongboxError> {
        let bytes = self.fetch_remote().await?.ok_or_else(|| {
            StrongboxError::transport(format!("no cloud data found in {}", self.filename))
        })?;
        self.merge_bytes(&bytes).await
    }

    /// Merge the remote snapshot right after unlock, when connected.
    ///
    /// Returns `None` if no directory is linked or nothing has been uploaded
    /// yet. Errors are returned for the caller to report; local state is
    /// unchanged on failure.
    pub async fn pull_if_connected(&self) -> Result<Option<MergeReport>, StrongboxError> {
        if !self.is_connected().await? {
            return Ok(None);
        }
        let Some(bytes) = self.fetch_remote().await? else {
            debug!(filename = %self.filename, "no remote snapshot to pull");
            return Ok(None);
        };
        self.merge_bytes(&bytes).await.map(Some)
    }

    async fn fetch_remote(&self) -> Result<Option<Vec<u8>>, StrongboxError> {
        self.bounded(self.cloud.download(&self.filename))
            .await
            .inspect_err(|e| error!(error = %e, "download from cloud failed"))
    }

    async fn merge_bytes(&self, bytes: &[u8]) -> Result<MergeReport, StrongboxError> {
        let values =
            normalize_payload(bytes).inspect_err(|e| error!(error = %e, "cloud data rejected"))?;
        let report = self.vault.merge_remote(values).await?;
        if report.failed > 0 {
            warn!(
                failed = report.failed,
                decrypted = report.decrypted,
                "partial sync: some cloud records could not be decrypted"
            );
        }
        Ok(report)
    }

    /// Delete the remote file and upload local state afresh.
    ///
    /// A failed delete is logged and the upload still runs, since the upload
    /// replaces the file anyway.
    pub async fn reset_sync(&self) -> Result<UploadOutcome, StrongboxError> {
        match self.bounded(self.cloud.delete(&self.filename)).await {
            Ok(existed) => info!(existed, "remote sync file cleared"),
            Err(e) => warn!(error = %e, "could not delete remote sync file, uploading over it"),
        }
        self.upload().await
    }

    /// Forget the remote credentials.
    pub async fn disconnect(&self) -> Result<(), StrongboxError> {
        self.bounded(self.cloud.disconnect()).await
    }

    /// Upload after a saved mutation, when enabled and connected.
    ///
    /// Returns `None` if no upload was attempted.
    pub async fn upload_if_connected(&self) -> Result<Option<UploadOutcome>, StrongboxError> {
        if !self.auto_upload || !self.is_connected().await? {
            return Ok(None);
        }
        self.upload().await.map(Some)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::SecretString;
    use serde_json::{Value, json};
    use strongbox_config::StrongboxConfig;
    use strongbox_test_utils::{FixedClock, MemoryCloudStore, MemoryKvStore};
    use strongbox_vault::EntryDraft;

    async fn unlocked_vault() -> Arc<Vault> {
        let vault = Vault::new(Arc::new(MemoryKvStore::new()), &StrongboxConfig::default());
        let pw = SecretString::from("abc123".to_string());
        let confirm = SecretString::from("abc123".to_string());
        vault.setup(&pw, &confirm).await.unwrap();
        Arc::new(vault)
    }

    fn draft(title: &str) -> EntryDraft {
        EntryDraft {
            title: title.into(),
            username: "user".into(),
            password: "pw".into(),
            ..EntryDraft::default()
        }
    }

    fn reconciler(vault: Arc<Vault>, cloud: Arc<MemoryCloudStore>) -> SyncReconciler {
        SyncReconciler::new(vault, cloud, &SyncConfig::default())
            .with_clock(Arc::new(FixedClock::at_unix(1_714_557_600)))
    }

    #[tokio::test]
    async fn empty_vault_is_not_uploaded() {
        let cloud = Arc::new(MemoryCloudStore::new());
        let sync = reconciler(unlocked_vault().await, cloud.clone());
        assert_eq!(sync.upload().await.unwrap(), UploadOutcome::NothingToSync);
        assert_eq!(cloud.upload_count(), 0);
    }

    #[tokio::test]
    async fn upload_wraps_persisted_envelopes() {
        let vault = unlocked_vault().await;
        vault.add(draft("A")).await.unwrap();
        vault.add(draft("B")).await.unwrap();
        let cloud = Arc::new(MemoryCloudStore::new());
        let sync = reconciler(vault, cloud.clone());

        let outcome = sync.upload().await.unwrap();
        assert!(matches!(outcome, UploadOutcome::Uploaded { count: 2, .. }));

        let stored = cloud.json("passwords.enc").await.unwrap();
        assert_eq!(stored["version"], "1.0");
        assert_eq!(stored["timestamp"], 1_714_557_600_000_i64);
        let data = stored["data"].as_array().unwrap();
        assert_eq!(data.len(), 2);
        assert!(data[0].get("encrypted").is_some());
        assert!(!stored.to_string().contains("\"pw\""));
    }

    #[tokio::test]
    async fn transport_failure_surfaces() {
        let vault = unlocked_vault().await;
        vault.add(draft("A")).await.unwrap();
        let cloud = Arc::new(MemoryCloudStore::new());
        cloud.fail_requests(true);
        let sync = reconciler(vault.clone(), cloud);

        assert!(matches!(
            sync.upload().await,
            Err(StrongboxError::SyncTransport { .. })
        ));
        assert!(matches!(
            sync.download_and_merge().await,
            Err(StrongboxError::SyncTransport { .. })
        ));
        assert_eq!(vault.list().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn missing_remote_file_is_an_error() {
        let sync = reconciler(unlocked_vault().await, Arc::new(MemoryCloudStore::new()));
        assert!(matches!(
            sync.download_and_merge().await,
            Err(StrongboxError::SyncTransport { .. })
        ));
    }

    #[tokio::test]
    async fn bad_format_leaves_vault_untouched() {
        let vault = unlocked_vault().await;
        vault.add(draft("A")).await.unwrap();
        let cloud = Arc::new(MemoryCloudStore::new());
        cloud.put_raw("passwords.enc", br#"{"entries": []}"#.to_vec()).await;
        let sync = reconciler(vault.clone(), cloud);

        assert!(matches!(
            sync.download_and_merge().await,
            Err(StrongboxError::SyncFormat(_))
        ));
        assert_eq!(vault.list().await.unwrap().len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn slow_cloud_times_out() {
        let vault = unlocked_vault().await;
        let cloud = Arc::new(MemoryCloudStore::new());
        cloud.set_delay(Some(Duration::from_secs(120))).await;
        let sync = reconciler(vault, cloud).with_timeout(Duration::from_secs(30));

        assert!(matches!(
            sync.download_and_merge().await,
            Err(StrongboxError::Timeout { .. })
        ));
    }

    #[tokio::test]
    async fn reset_replaces_remote_with_local() {
        let vault = unlocked_vault().await;
        vault.add(draft("A")).await.unwrap();
        let cloud = Arc::new(MemoryCloudStore::new());
        cloud
            .put_raw("passwords.enc", serde_json::to_vec(&json!([1, 2, 3])).unwrap())
            .await;
        let sync = reconciler(vault, cloud.clone());

        sync.reset_sync().await.unwrap();
        let stored: Value = cloud.json("passwords.enc").await.unwrap();
        assert_eq!(stored["data"].as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn reset_uploads_even_when_delete_fails() {
        let vault = unlocked_vault().await;
        vault.add(draft("A")).await.unwrap();
        let cloud = Arc::new(MemoryCloudStore::new());
        cloud.put_raw("passwords.enc", b"stale".to_vec()).await;
        cloud.fail_deletes(true);
        let sync = reconciler(vault, cloud.clone());

        let outcome = sync.reset_sync().await.unwrap();
        assert!(matches!(outcome, UploadOutcome::Uploaded { count: 1, .. }));
        let stored: Value = cloud.json("passwords.enc").await.unwrap();
        assert_eq!(stored["data"].as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn pull_after_unlock_merges_only_when_there_is_something_to_pull() {
        let cloud = Arc::new(MemoryCloudStore::new());
        let here = reconciler(unlocked_vault().await, cloud.clone());
        assert_eq!(here.pull_if_connected().await.unwrap(), None);

        let other_vault = unlocked_vault().await;
        other_vault.add(draft("Remote")).await.unwrap();
        reconciler(other_vault, cloud.clone()).upload().await.unwrap();

        let report = here.pull_if_connected().await.unwrap().unwrap();
        assert_eq!((report.decrypted, report.failed, report.added), (1, 0, 1));

        cloud.set_connected(false);
        assert_eq!(here.pull_if_connected().await.unwrap(), None);
    }

    #[tokio::test]
    async fn auto_upload_respects_connection_and_config() {
        let vault = unlocked_vault().await;
        vault.add(draft("A")).await.unwrap();

        let offline = Arc::new(MemoryCloudStore::disconnected());
        let sync = reconciler(vault.clone(), offline.clone());
        assert_eq!(sync.upload_if_connected().await.unwrap(), None);

        let online = Arc::new(MemoryCloudStore::new());
        let disabled = SyncReconciler::new(
            vault.clone(),
            online.clone(),
            &SyncConfig {
                auto_upload: false,
                ..SyncConfig::default()
            },
        );
        assert_eq!(disabled.upload_if_connected().await.unwrap(), None);

        let enabled = reconciler(vault, online.clone());
        assert!(enabled.upload_if_connected().await.unwrap().is_some());
        assert_eq!(online.upload_count(), 1);
    }

    #[tokio::test]
    async fn status_and_disconnect() {
        let vault = unlocked_vault().await;
        let cloud = Arc::new(MemoryCloudStore::new());
        let sync = reconciler(vault, cloud.clone());
        assert_eq!(
            sync.status().await.unwrap(),
            SyncStatus {
                connected: true,
                remote_exists: false
            }
        );

        sync.disconnect().await.unwrap();
        assert!(!sync.status().await.unwrap().connected);
    }
}
