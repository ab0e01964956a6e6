// SPDX-FileCopyrightText: 2026 Strongbox Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Vault lifecycle: setup, unlock, lock, rotate, entry CRUD, and merge.
//!
//! A [`Vault`] is either Locked (no plaintext, no live key) or Unlocked
//! (decrypted working set plus the live master password). Every mutating
//! operation takes the same writer lock, so a timer-driven persist can never
//! interleave with an edit, a merge or a rotation.

use std::sync::Arc;

use secrecy::{ExposeSecret, SecretString};
use serde_json::Value;
use strongbox_config::StrongboxConfig;
use strongbox_core::types::PASSWORDS_KEY;
use strongbox_core::{
    ClipboardWriter, Clock, EntryId, KeyValueStore, MasterKeyRecord, StrongboxError, SystemClock,
    TotpGenerator, VaultEntry,
};
use tokio::sync::Mutex;
use tracing::{debug, error, info, warn};
use zeroize::Zeroizing;

use crate::entry::{EntryDraft, EntryPatch, generate_id};
use crate::envelope::{self, BatchOutcome};
use crate::master::{self, MasterKeyManager};
use crate::merge::merge_local_first;
use crate::store::{VaultStore, offload, read_envelopes};
use crate::totp::{self, RfcTotp};

/// Outcome of merging a downloaded batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MergeReport {
    /// Records that decrypted with the live key.
    pub decrypted: usize,
    /// Records skipped as malformed or undecryptable.
    pub failed: usize,
    /// Decrypted records whose id was new locally.
    pub added: usize,
}

/// Which secret [`Vault::copy_secret`] placed on the clipboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CopiedSecret {
    Password,
    TotpCode,
}

struct Session {
    password: SecretString,
    store: VaultStore,
    dirty: bool,
}

enum VaultState {
    Locked,
    Unlocked(Session),
}

fn session_mut(state: &mut VaultState) -> Result<&mut Session, StrongboxError> {
    match state {
        VaultState::Unlocked(session) => Ok(session),
        VaultState::Locked => Err(StrongboxError::Locked),
    }
}

fn copy_password(secret: &SecretString) -> Zeroizing<String> {
    Zeroizing::new(secret.expose_secret().to_string())
}

/// The password vault service object.
///
/// Collaborators are injected so tests can substitute in-memory doubles.
pub struct Vault {
    kv: Arc<dyn KeyValueStore>,
    master: MasterKeyManager,
    clock: Arc<dyn Clock>,
    totp: Arc<dyn TotpGenerator>,
    clipboard: Option<Arc<dyn ClipboardWriter>>,
    namespace: String,
    min_password_length: usize,
    state: Mutex<VaultState>,
}

impl std::fmt::Debug for Vault {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Vault")
            .field("namespace", &self.namespace)
            .field("master_password", &"[REDACTED]")
            .finish_non_exhaustive()
    }
}

impl Vault {
    /// Create a locked vault over `kv` using the configured namespace and
    /// password policy, the system clock and the RFC 6238 TOTP generator.
    pub fn new(kv: Arc<dyn KeyValueStore>, config: &StrongboxConfig) -> Self {
        let namespace = config.storage.namespace.clone();
        Self {
            master: MasterKeyManager::new(kv.clone(), namespace.clone()),
            kv,
            clock: Arc::new(SystemClock),
            totp: Arc::new(RfcTotp),
            clipboard: None,
            namespace,
            min_password_length: config
                .vault
                .min_password_length
                .max(strongbox_config::validation::MIN_MASTER_PASSWORD_LENGTH),
            state: Mutex::new(VaultState::Locked),
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn with_totp(mut self, totp: Arc<dyn TotpGenerator>) -> Self {
        self.totp = totp;
        self
    }

    pub fn with_clipboard(mut self, clipboard: Arc<dyn ClipboardWriter>) -> Self {
        self.clipboard = Some(clipboard);
        self
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    pub fn key_value_store(&self) -> &Arc<dyn KeyValueStore> {
        &self.kv
    }

    /// True iff a master key record exists.
    pub async fn has_master_key(&self) -> Result<bool, StrongboxError> {
        self.master.has_master_key().await
    }

    pub async fn is_unlocked(&self) -> bool {
        matches!(*self.state.lock().await, VaultState::Unlocked(_))
    }

    /// True if the working set changed since the last successful persist.
    pub async fn is_dirty(&self) -> bool {
        match &*self.state.lock().await {
            VaultState::Unlocked(session) => session.dirty,
            VaultState::Locked => false,
        }
    }

    /// First-time setup. Leaves the vault Unlocked with an empty working set.
    pub async fn setup(
        &self,
        password: &SecretString,
        confirmation: &SecretString,
    ) -> Result<MasterKeyRecord, StrongboxError> {
        let mut state = self.state.lock().await;
        if self.master.has_master_key().await? {
            return Err(StrongboxError::AlreadyInitialized);
        }
        master::check_new_password(
            password.expose_secret(),
            confirmation.expose_secret(),
            self.min_password_length,
        )?;

        let record = master::new_record(password.expose_secret())?;
        self.master.store(&record).await?;

        *state = VaultState::Unlocked(Session {
            password: SecretString::from(password.expose_secret().to_string()),
            store: VaultStore::new(),
            dirty: false,
        });
        info!("master password set up");
        Ok(record)
    }

    /// Verify `password` and, if the vault is Locked, load the working set.
    ///
    /// Returns `Ok(false)` on a wrong password, leaving the state unchanged.
    pub async fn unlock(&self, password: &SecretString) -> Result<bool, StrongboxError> {
        let mut state = self.state.lock().await;
        if !self.master.verify_password(password.expose_secret()).await? {
            warn!("unlock rejected: wrong master password");
            return Ok(false);
        }
        if matches!(*state, VaultState::Unlocked(_)) {
            return Ok(true);
        }

        let (store, failed) =
            VaultStore::load(self.kv.as_ref(), &self.namespace, password.expose_secret()).await?;
        info!(entries = store.len(), failed, "vault unlocked");
        *state = VaultState::Unlocked(Session {
            password: SecretString::from(password.expose_secret().to_string()),
            store,
            dirty: false,
        });
        Ok(true)
    }

    /// Persist pending changes, then drop the working set and the live key.
    pub async fn lock(&self) -> Result<(), StrongboxError> {
        let mut state = self.state.lock().await;
        if let VaultState::Unlocked(session) = &mut *state
            && session.dirty
        {
            self.persist_session(session).await?;
        }
        *state = VaultState::Locked;
        info!("vault locked");
        Ok(())
    }

    /// Change the master password, re-encrypting every stored record.
    ///
    /// Any stored record that cannot be decrypted with `old` aborts the whole
    /// rotation with [`StrongboxError::EnvelopeCorrupt`] before anything is
    /// written. The new hash, salt and envelopes are committed in one atomic
    /// write. On success the vault is Unlocked under the new password.
    /// Returns the number of records re-encrypted.
    pub async fn rotate(
        &self,
        old: &SecretString,
        new: &SecretString,
        confirmation: &SecretString,
    ) -> Result<usize, StrongboxError> {
        let mut state = self.state.lock().await;
        let record = self
            .master
            .load()
            .await?
            .ok_or(StrongboxError::NotInitialized)?;
        if !master::verify(&record, old.expose_secret()) {
            warn!("rotation rejected: wrong current master password");
            return Err(StrongboxError::AuthFailure);
        }
        master::check_new_password(
            new.expose_secret(),
            confirmation.expose_secret(),
            self.min_password_length,
        )?;

        if let VaultState::Unlocked(session) = &mut *state
            && session.dirty
        {
            self.persist_session(session).await?;
        }

        let values = read_envelopes(self.kv.as_ref(), &self.namespace).await?;
        let old_password = copy_password(old);
        let new_password = copy_password(new);
        let (store, sealed) = offload(move || {
            let mut entries = Vec::with_capacity(values.len());
            for (index, value) in values.iter().enumerate() {
                let entry: VaultEntry = envelope::decrypt_value(value, &old_password)
                    .ok_or_else(|| StrongboxError::EnvelopeCorrupt {
                        index,
                        reason: "cannot be decrypted with the current master password"
                            .to_string(),
                    })?;
                entries.push(entry);
            }
            let store = VaultStore::from_entries(entries);
            let sealed = store.seal_all(&new_password)?;
            Ok((store, sealed))
        })
        .await
        .inspect_err(|e| error!(error = %e, "rotation aborted, nothing written"))?;

        let new_record = master::new_record(new.expose_secret())?;
        let mut batch = master::record_entries(&new_record);
        batch.push((PASSWORDS_KEY.to_string(), Value::Array(sealed)));
        self.kv.set_many(&self.namespace, batch).await?;

        let count = store.len();
        *state = VaultState::Unlocked(Session {
            password: SecretString::from(new.expose_secret().to_string()),
            store,
            dirty: false,
        });
        info!(count, "master password rotated");
        Ok(count)
    }

    /// Add a new entry at the front of the working set and persist.
    pub async fn add(&self, draft: EntryDraft) -> Result<EntryId, StrongboxError> {
        let draft = draft.normalized()?;
        let mut state = self.state.lock().await;
        let session = session_mut(&mut state)?;

        let now = self.clock.now();
        let mut id = generate_id(now);
        while session.store.contains(&id) {
            id = generate_id(now);
        }
        session.store.add(draft.into_entry(id.clone(), now));
        session.dirty = true;
        debug!(id = %id, "entry added");

        self.persist_after_save(session).await;
        Ok(id)
    }

    /// Apply `patch` to the entry with `id`. Returns `Ok(false)` if absent.
    pub async fn update(&self, id: &EntryId, patch: EntryPatch) -> Result<bool, StrongboxError> {
        let mut state = self.state.lock().await;
        let session = session_mut(&mut state)?;
        let Some(current) = session.store.get(id) else {
            return Ok(false);
        };

        let updated = patch.apply(current, self.clock.now())?;
        session.store.replace(updated);
        session.dirty = true;
        debug!(id = %id, "entry updated");

        self.persist_after_save(session).await;
        Ok(true)
    }

    /// Remove the entry with exactly `id`. Returns whether it existed.
    pub async fn remove(&self, id: &EntryId) -> Result<bool, StrongboxError> {
        let mut state = self.state.lock().await;
        let session = session_mut(&mut state)?;
        if !session.store.remove(id) {
            return Ok(false);
        }
        session.dirty = true;
        debug!(id = %id, "entry removed");

        self.persist_after_save(session).await;
        Ok(true)
    }

    pub async fn get(&self, id: &EntryId) -> Result<Option<VaultEntry>, StrongboxError> {
        let mut state = self.state.lock().await;
        Ok(session_mut(&mut state)?.store.get(id).cloned())
    }

    /// All entries, newest-added first.
    pub async fn list(&self) -> Result<Vec<VaultEntry>, StrongboxError> {
        let mut state = self.state.lock().await;
        Ok(session_mut(&mut state)?.store.entries().to_vec())
    }

    pub async fn search(&self, query: &str) -> Result<Vec<VaultEntry>, StrongboxError> {
        let mut state = self.state.lock().await;
        Ok(session_mut(&mut state)?
            .store
            .search(query)
            .into_iter()
            .cloned()
            .collect())
    }

    /// Re-encrypt and write the whole working set unconditionally.
    pub async fn persist(&self) -> Result<usize, StrongboxError> {
        let mut state = self.state.lock().await;
        let session = session_mut(&mut state)?;
        self.persist_session(session).await
    }

    /// Persist only if there are unsaved changes. A locked vault has none.
    pub async fn flush(&self) -> Result<bool, StrongboxError> {
        let mut state = self.state.lock().await;
        match &mut *state {
            VaultState::Unlocked(session) if session.dirty => {
                self.persist_session(session).await?;
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    /// The persisted envelope array, after flushing pending changes.
    pub async fn persisted_envelopes(&self) -> Result<Vec<Value>, StrongboxError> {
        let mut state = self.state.lock().await;
        let session = session_mut(&mut state)?;
        if session.dirty {
            self.persist_session(session).await?;
        }
        read_envelopes(self.kv.as_ref(), &self.namespace).await
    }

    /// Decrypt a downloaded batch with the live key and merge it local-first.
    ///
    /// Fails without touching local state when no record decrypts.
    pub async fn merge_remote(&self, values: Vec<Value>) -> Result<MergeReport, StrongboxError> {
        let mut state = self.state.lock().await;
        let session = session_mut(&mut state)?;

        let password = copy_password(&session.password);
        let BatchOutcome { decrypted, failed } = offload(move || {
            Ok(envelope::decrypt_batch::<VaultEntry>(&values, &password))
        })
        .await?;

        if decrypted.is_empty() {
            error!(failed, "no cloud record could be decrypted");
            return Err(StrongboxError::SyncFormat(format!(
                "no usable records in cloud data ({failed} failed to decrypt)"
            )));
        }

        let decrypted_count = decrypted.len();
        let added = merge_local_first(&mut session.store, decrypted);
        if added > 0 {
            session.dirty = true;
        }
        self.persist_session(session).await?;

        if failed > 0 {
            warn!(failed, "skipped undecryptable cloud records");
        }
        info!(decrypted = decrypted_count, failed, added, "cloud merge complete");
        Ok(MergeReport {
            decrypted: decrypted_count,
            failed,
            added,
        })
    }

    /// Copy the entry's current TOTP code if it has a secret, otherwise its
    /// password.
    pub async fn copy_secret(&self, id: &EntryId) -> Result<CopiedSecret, StrongboxError> {
        let entry = self
            .get(id)
            .await?
            .ok_or_else(|| StrongboxError::EntryNotFound(id.to_string()))?;
        let clipboard = self
            .clipboard
            .as_ref()
            .ok_or_else(|| StrongboxError::Clipboard("no clipboard configured".to_string()))?;

        if entry.has_totp() {
            let code = self
                .code_for(&entry)
                .ok_or_else(|| StrongboxError::InvalidEntry("invalid TOTP secret".to_string()))?;
            clipboard.write_text(&code).await?;
            debug!(id = %id, "TOTP code copied");
            Ok(CopiedSecret::TotpCode)
        } else {
            let password = Zeroizing::new(entry.password.clone());
            clipboard.write_text(&password).await?;
            debug!(id = %id, "password copied");
            Ok(CopiedSecret::Password)
        }
    }

    /// Current TOTP code, or `None` if the entry has no usable secret.
    pub async fn totp_code(&self, id: &EntryId) -> Result<Option<String>, StrongboxError> {
        let entry = self
            .get(id)
            .await?
            .ok_or_else(|| StrongboxError::EntryNotFound(id.to_string()))?;
        Ok(self.code_for(&entry))
    }

    /// Seconds until the current TOTP code rolls over.
    pub fn totp_remaining(&self) -> u64 {
        totp::remaining(self.clock.now())
    }

    fn code_for(&self, entry: &VaultEntry) -> Option<String> {
        let secret = totp::sanitize_secret(entry.totp_secret.as_deref()?);
        if secret.is_empty() {
            return None;
        }
        let now = u64::try_from(self.clock.now().timestamp()).unwrap_or_default();
        self.totp.generate(&secret, now)
    }

    async fn persist_session(&self, session: &mut Session) -> Result<usize, StrongboxError> {
        let count = session
            .store
            .persist(
                self.kv.as_ref(),
                &self.namespace,
                session.password.expose_secret(),
            )
            .await?;
        session.dirty = false;
        Ok(count)
    }

    /// Save-time persist. A failure keeps the set dirty for autosave to retry.
    async fn persist_after_save(&self, session: &mut Session) {
        if let Err(e) = self.persist_session(session).await {
            warn!(error = %e, "persist after save failed, autosave will retry");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strongbox_test_utils::{FixedClock, FixedTotp, MemoryKvStore, RecordingClipboard};

    fn secret(s: &str) -> SecretString {
        SecretString::from(s.to_string())
    }

    fn draft(title: &str) -> EntryDraft {
        EntryDraft {
            title: title.to_string(),
            username: format!("{}@example.com", title.to_lowercase()),
            password: format!("{title}-pw"),
            ..EntryDraft::default()
        }
    }

    fn vault_over(kv: Arc<MemoryKvStore>) -> Vault {
        Vault::new(kv, &StrongboxConfig::default())
            .with_clock(Arc::new(FixedClock::at_unix(1_714_557_615)))
            .with_totp(Arc::new(FixedTotp::new("492039").reject("BADSECRET")))
    }

    async fn unlocked_vault() -> (Vault, Arc<MemoryKvStore>) {
        let kv = Arc::new(MemoryKvStore::new());
        let vault = vault_over(kv.clone());
        vault.setup(&secret("abc123"), &secret("abc123")).await.unwrap();
        (vault, kv)
    }

    #[tokio::test]
    async fn setup_rejects_weak_and_mismatched_passwords() {
        let vault = vault_over(Arc::new(MemoryKvStore::new()));
        assert!(matches!(
            vault.setup(&secret("abc"), &secret("abc")).await,
            Err(StrongboxError::WeakInput(_))
        ));
        assert!(matches!(
            vault.setup(&secret("abc123"), &secret("abc12x")).await,
            Err(StrongboxError::WeakInput(_))
        ));
        assert!(!vault.has_master_key().await.unwrap());
        assert!(!vault.is_unlocked().await);
    }

    #[tokio::test]
    async fn setup_unlocks_and_cannot_run_twice() {
        let (vault, _kv) = unlocked_vault().await;
        assert!(vault.is_unlocked().await);
        assert!(vault.has_master_key().await.unwrap());
        assert!(matches!(
            vault.setup(&secret("abc123"), &secret("abc123")).await,
            Err(StrongboxError::AlreadyInitialized)
        ));
    }

    #[tokio::test]
    async fn unlock_before_setup_is_not_initialized() {
        let vault = vault_over(Arc::new(MemoryKvStore::new()));
        assert!(matches!(
            vault.unlock(&secret("abc123")).await,
            Err(StrongboxError::NotInitialized)
        ));
    }

    #[tokio::test]
    async fn locked_vault_refuses_mutations() {
        let (vault, _kv) = unlocked_vault().await;
        vault.lock().await.unwrap();
        assert!(matches!(vault.add(draft("A")).await, Err(StrongboxError::Locked)));
        assert!(matches!(vault.list().await, Err(StrongboxError::Locked)));
        assert!(matches!(
            vault.remove(&EntryId::from("x")).await,
            Err(StrongboxError::Locked)
        ));
        assert!(!vault.flush().await.unwrap());
    }

    #[tokio::test]
    async fn entries_survive_lock_and_unlock() {
        let (vault, kv) = unlocked_vault().await;
        let a = vault.add(draft("A")).await.unwrap();
        vault.add(draft("B")).await.unwrap();
        vault.lock().await.unwrap();

        let reopened = vault_over(kv);
        assert!(!reopened.unlock(&secret("wrong1")).await.unwrap());
        assert!(!reopened.is_unlocked().await);
        assert!(reopened.unlock(&secret("abc123")).await.unwrap());

        let titles: Vec<_> = reopened.list().await.unwrap().into_iter().map(|e| e.title).collect();
        assert_eq!(titles, ["B", "A"]);
        assert_eq!(reopened.get(&a).await.unwrap().unwrap().password, "A-pw");
    }

    #[tokio::test]
    async fn add_rejects_invalid_entry() {
        let (vault, _kv) = unlocked_vault().await;
        let result = vault
            .add(EntryDraft {
                title: "No password".into(),
                username: "me".into(),
                ..EntryDraft::default()
            })
            .await;
        assert!(matches!(result, Err(StrongboxError::InvalidEntry(_))));
        assert!(vault.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn update_stamps_and_missing_id_is_noop() {
        let (vault, _kv) = unlocked_vault().await;
        let id = vault.add(draft("A")).await.unwrap();
        let patch = EntryPatch {
            notes: Some("rotated".into()),
            ..EntryPatch::default()
        };

        assert!(!vault.update(&EntryId::from("missing"), patch.clone()).await.unwrap());
        assert!(vault.update(&id, patch).await.unwrap());

        let entry = vault.get(&id).await.unwrap().unwrap();
        assert_eq!(entry.notes, "rotated");
        assert!(entry.updated_at.is_some());
    }

    #[tokio::test]
    async fn mutations_persist_immediately() {
        let (vault, kv) = unlocked_vault().await;
        let id = vault.add(draft("A")).await.unwrap();
        assert!(!vault.is_dirty().await);
        let stored = read_envelopes(kv.as_ref(), "password_db").await.unwrap();
        assert_eq!(stored.len(), 1);

        assert!(vault.remove(&id).await.unwrap());
        assert!(!vault.remove(&id).await.unwrap());
        let stored = read_envelopes(kv.as_ref(), "password_db").await.unwrap();
        assert!(stored.is_empty());
    }

    #[tokio::test]
    async fn failed_save_stays_dirty_until_flushed() {
        let (vault, kv) = unlocked_vault().await;
        kv.fail_writes(true);
        vault.add(draft("A")).await.unwrap();
        assert!(vault.is_dirty().await);
        assert!(vault.flush().await.is_err());

        kv.fail_writes(false);
        assert!(vault.flush().await.unwrap());
        assert!(!vault.is_dirty().await);
        assert!(!vault.flush().await.unwrap());
    }

    #[tokio::test]
    async fn copy_secret_prefers_totp_code() {
        let kv = Arc::new(MemoryKvStore::new());
        let clipboard = Arc::new(RecordingClipboard::new());
        let vault = vault_over(kv).with_clipboard(clipboard.clone());
        vault.setup(&secret("abc123"), &secret("abc123")).await.unwrap();

        let login = vault.add(draft("Mail")).await.unwrap();
        let otp = vault
            .add(EntryDraft {
                title: "AWS".into(),
                totp_secret: Some("jbsw y3dp ehpk 3pxp".into()),
                ..EntryDraft::default()
            })
            .await
            .unwrap();

        assert_eq!(vault.copy_secret(&login).await.unwrap(), CopiedSecret::Password);
        assert_eq!(clipboard.last().await.as_deref(), Some("Mail-pw"));
        assert_eq!(vault.copy_secret(&otp).await.unwrap(), CopiedSecret::TotpCode);
        assert_eq!(clipboard.last().await.as_deref(), Some("492039"));
    }

    #[tokio::test]
    async fn invalid_totp_secret_is_not_copied() {
        let clipboard = Arc::new(RecordingClipboard::new());
        let vault = vault_over(Arc::new(MemoryKvStore::new())).with_clipboard(clipboard.clone());
        vault.setup(&secret("abc123"), &secret("abc123")).await.unwrap();
        let id = vault
            .add(EntryDraft {
                title: "Broken".into(),
                totp_secret: Some("bad secret".into()),
                ..EntryDraft::default()
            })
            .await
            .unwrap();

        assert!(matches!(
            vault.copy_secret(&id).await,
            Err(StrongboxError::InvalidEntry(_))
        ));
        assert_eq!(vault.totp_code(&id).await.unwrap(), None);
        assert_eq!(clipboard.count().await, 0);
    }

    #[tokio::test]
    async fn copy_without_clipboard_or_entry_fails() {
        let (vault, _kv) = unlocked_vault().await;
        let id = vault.add(draft("A")).await.unwrap();
        assert!(matches!(
            vault.copy_secret(&id).await,
            Err(StrongboxError::Clipboard(_))
        ));
        assert!(matches!(
            vault.totp_code(&EntryId::from("nope")).await,
            Err(StrongboxError::EntryNotFound(_))
        ));
    }

    #[tokio::test]
    async fn totp_remaining_uses_injected_clock() {
        let (vault, _kv) = unlocked_vault().await;
        // 1_714_557_615 % 30 == 15
        assert_eq!(vault.totp_remaining(), 15);
    }

    #[tokio::test]
    async fn search_filters_working_set() {
        let (vault, _kv) = unlocked_vault().await;
        vault.add(draft("GitHub")).await.unwrap();
        vault.add(draft("Mail")).await.unwrap();
        let hits = vault.search("GITHUB").await.unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].title, "GitHub");
    }

    #[tokio::test]
    async fn merge_of_nothing_usable_fails_without_changes() {
        let (vault, _kv) = unlocked_vault().await;
        vault.add(draft("A")).await.unwrap();
        let foreign = envelope::encrypt(&strongbox_test_utils::entry("9", "X"), "other").unwrap();

        let result = vault
            .merge_remote(vec![serde_json::to_value(foreign).unwrap()])
            .await;
        assert!(matches!(result, Err(StrongboxError::SyncFormat(_))));
        assert_eq!(vault.list().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn rotation_with_wrong_old_password_changes_nothing() {
        let (vault, kv) = unlocked_vault().await;
        vault.add(draft("A")).await.unwrap();
        let before = kv.peek("password_db", PASSWORDS_KEY).await;

        let result = vault
            .rotate(&secret("nope12"), &secret("xyz789"), &secret("xyz789"))
            .await;
        assert!(matches!(result, Err(StrongboxError::AuthFailure)));
        assert_eq!(kv.peek("password_db", PASSWORDS_KEY).await, before);
        assert!(vault.master.verify_password("abc123").await.unwrap());
    }

    #[tokio::test]
    async fn rotation_aborts_on_corrupt_record() {
        let (vault, kv) = unlocked_vault().await;
        vault.add(draft("A")).await.unwrap();
        let mut stored = read_envelopes(kv.as_ref(), "password_db").await.unwrap();
        stored.push(serde_json::json!({"encrypted": [], "iv": [], "salt": []}));
        kv.seed("password_db", PASSWORDS_KEY, Value::Array(stored.clone()))
            .await;

        let result = vault
            .rotate(&secret("abc123"), &secret("xyz789"), &secret("xyz789"))
            .await;
        assert!(matches!(
            result,
            Err(StrongboxError::EnvelopeCorrupt { index: 1, .. })
        ));
        assert_eq!(
            kv.peek("password_db", PASSWORDS_KEY).await,
            Some(Value::Array(stored))
        );
        assert!(vault.master.verify_password("abc123").await.unwrap());
    }

    #[tokio::test]
    async fn rotation_write_is_all_or_nothing() {
        let (vault, kv) = unlocked_vault().await;
        vault.add(draft("A")).await.unwrap();
        let record_before = vault.master.load().await.unwrap();
        let passwords_before = kv.peek("password_db", PASSWORDS_KEY).await;

        kv.fail_writes(true);
        assert!(
            vault
                .rotate(&secret("abc123"), &secret("xyz789"), &secret("xyz789"))
                .await
                .is_err()
        );
        assert_eq!(vault.master.load().await.unwrap(), record_before);
        assert_eq!(kv.peek("password_db", PASSWORDS_KEY).await, passwords_before);
    }

    #[tokio::test]
    #[tracing_test::traced_test]
    async fn rejected_unlock_is_logged_without_the_password() {
        let (vault, kv) = unlocked_vault().await;
        vault.lock().await.unwrap();
        let reopened = vault_over(kv);
        assert!(!reopened.unlock(&secret("hunter22")).await.unwrap());

        assert!(logs_contain("unlock rejected"));
        assert!(!logs_contain("hunter22"));
        assert!(!logs_contain("abc123"));
    }
}
