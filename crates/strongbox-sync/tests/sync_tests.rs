// SPDX-FileCopyrightText: 2026 Strongbox Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Two devices sharing one linked directory.

use std::sync::Arc;

use secrecy::SecretString;
use strongbox_config::StrongboxConfig;
use strongbox_config::model::SyncConfig;
use strongbox_core::{CloudStore, StrongboxError};
use strongbox_sync::{LocalDriveStore, SyncReconciler, UploadOutcome};
use strongbox_test_utils::MemoryKvStore;
use strongbox_vault::{EntryDraft, Vault};

fn secret(s: &str) -> SecretString {
    SecretString::from(s.to_string())
}

fn login(title: &str) -> EntryDraft {
    EntryDraft {
        title: title.to_string(),
        username: "me".to_string(),
        password: format!("{title}-pw"),
        ..EntryDraft::default()
    }
}

struct Device {
    vault: Arc<Vault>,
    sync: SyncReconciler,
}

async fn device(shared: &std::path::Path, password: &str) -> Device {
    let kv = Arc::new(MemoryKvStore::new());
    let vault = Arc::new(Vault::new(kv.clone(), &StrongboxConfig::default()));
    vault
        .setup(&secret(password), &secret(password))
        .await
        .unwrap();
    let drive = Arc::new(LocalDriveStore::new(kv));
    drive.connect(shared).await.unwrap();
    let sync = SyncReconciler::new(vault.clone(), drive, &SyncConfig::default());
    Device { vault, sync }
}

#[tokio::test(flavor = "multi_thread")]
async fn push_then_pull_between_devices() {
    let dir = tempfile::tempdir().unwrap();
    let laptop = device(dir.path(), "abc123").await;
    let phone = device(dir.path(), "abc123").await;

    laptop.vault.add(login("Mail")).await.unwrap();
    laptop.vault.add(login("Bank")).await.unwrap();
    phone.vault.add(login("Chat")).await.unwrap();

    let pushed = laptop.sync.upload().await.unwrap();
    assert!(matches!(pushed, UploadOutcome::Uploaded { count: 2, .. }));

    let report = phone.sync.download_and_merge().await.unwrap();
    assert_eq!((report.decrypted, report.failed, report.added), (2, 0, 2));

    let mut titles: Vec<String> = phone
        .vault
        .list()
        .await
        .unwrap()
        .into_iter()
        .map(|e| e.title)
        .collect();
    titles.sort();
    assert_eq!(titles, ["Bank", "Chat", "Mail"]);

    // Pulling the same snapshot again adds nothing.
    let again = phone.sync.download_and_merge().await.unwrap();
    assert_eq!(again.added, 0);
}

#[tokio::test(flavor = "multi_thread")]
async fn second_device_sees_entries_after_unlock() {
    let dir = tempfile::tempdir().unwrap();
    let laptop = device(dir.path(), "abc123").await;
    let phone = device(dir.path(), "abc123").await;
    phone.vault.add(login("Chat")).await.unwrap();
    phone.vault.lock().await.unwrap();

    laptop.vault.add(login("Mail")).await.unwrap();
    laptop.sync.upload_if_connected().await.unwrap();

    assert!(phone.vault.unlock(&secret("abc123")).await.unwrap());
    let report = phone.sync.pull_if_connected().await.unwrap().unwrap();
    assert_eq!(report.added, 1);

    let mut titles: Vec<String> = phone
        .vault
        .list()
        .await
        .unwrap()
        .into_iter()
        .map(|e| e.title)
        .collect();
    titles.sort();
    assert_eq!(titles, ["Chat", "Mail"]);
}

#[tokio::test(flavor = "multi_thread")]
async fn foreign_password_snapshot_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let theirs = device(dir.path(), "abc123").await;
    let ours = device(dir.path(), "xyz789").await;

    theirs.vault.add(login("Mail")).await.unwrap();
    theirs.sync.upload().await.unwrap();
    ours.vault.add(login("Local")).await.unwrap();

    assert!(matches!(
        ours.sync.download_and_merge().await,
        Err(StrongboxError::SyncFormat(_))
    ));
    assert_eq!(ours.vault.list().await.unwrap().len(), 1);
}

#[tokio::test(flavor = "multi_thread")]
async fn reset_after_disconnect_needs_a_new_link() {
    let dir = tempfile::tempdir().unwrap();
    let laptop = device(dir.path(), "abc123").await;
    laptop.vault.add(login("Mail")).await.unwrap();
    laptop.sync.upload().await.unwrap();
    assert!(dir.path().join("passwords.enc").exists());

    laptop.sync.disconnect().await.unwrap();
    assert!(!laptop.sync.is_connected().await.unwrap());
    assert!(matches!(
        laptop.sync.reset_sync().await,
        Err(StrongboxError::SyncTransport { .. })
    ));
    // The remote file is left alone when unlinked.
    assert!(dir.path().join("passwords.enc").exists());
}

#[tokio::test(flavor = "multi_thread")]
async fn unlinked_drive_reports_disconnected() {
    let kv = Arc::new(MemoryKvStore::new());
    let drive = LocalDriveStore::new(kv);
    assert!(!drive.is_connected().await.unwrap());
    assert_eq!(drive.linked_dir().await.unwrap(), None);
}
