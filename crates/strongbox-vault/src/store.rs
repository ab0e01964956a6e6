// SPDX-FileCopyrightText: 2026 Strongbox Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The decrypted working set of an unlocked vault, and its persistence as an
//! envelope array.

use serde_json::Value;
use strongbox_core::types::PASSWORDS_KEY;
use strongbox_core::{EntryId, KeyValueStore, StrongboxError, VaultEntry};
use tracing::{debug, warn};
use zeroize::Zeroizing;

use crate::envelope::{self, BatchOutcome};

/// Run CPU-bound key derivation off the async scheduler.
pub(crate) async fn offload<T, F>(work: F) -> Result<T, StrongboxError>
where
    F: FnOnce() -> Result<T, StrongboxError> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(work)
        .await
        .map_err(|e| StrongboxError::Internal(format!("crypto task failed: {e}")))?
}

/// In-memory entries, newest-added first.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct VaultStore {
    entries: Vec<VaultEntry>,
}

impl VaultStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_entries(entries: Vec<VaultEntry>) -> Self {
        Self { entries }
    }

    pub fn entries(&self) -> &[VaultEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, id: &EntryId) -> bool {
        self.entries.iter().any(|e| &e.id == id)
    }

    pub fn get(&self, id: &EntryId) -> Option<&VaultEntry> {
        self.entries.iter().find(|e| &e.id == id)
    }

    /// Prepend `entry`. The caller guarantees its id is unused.
    pub fn add(&mut self, entry: VaultEntry) -> EntryId {
        let id = entry.id.clone();
        self.entries.insert(0, entry);
        id
    }

    /// Replace the entry with the same id in place. Returns false if absent.
    pub fn replace(&mut self, entry: VaultEntry) -> bool {
        match self.entries.iter_mut().find(|e| e.id == entry.id) {
            Some(slot) => {
                *slot = entry;
                true
            }
            None => false,
        }
    }

    pub fn remove(&mut self, id: &EntryId) -> bool {
        let before = self.entries.len();
        self.entries.retain(|e| &e.id != id);
        self.entries.len() != before
    }

    /// Append without reordering existing entries.
    pub fn append(&mut self, entry: VaultEntry) {
        self.entries.push(entry);
    }

    /// Case-insensitive filter over title, username, url and notes.
    pub fn search(&self, query: &str) -> Vec<&VaultEntry> {
        let needle = query.trim().to_lowercase();
        if needle.is_empty() {
            return self.entries.iter().collect();
        }
        self.entries.iter().filter(|e| e.matches(&needle)).collect()
    }

    /// Encrypt every entry into a fresh envelope.
    pub fn seal_all(&self, password: &str) -> Result<Vec<Value>, StrongboxError> {
        self.entries
            .iter()
            .map(|entry| Ok(serde_json::to_value(envelope::encrypt(entry, password)?)?))
            .collect()
    }

    /// Decrypt a persisted envelope array, dropping records that fail.
    pub fn open_all(values: &[Value], password: &str) -> (Self, usize) {
        let BatchOutcome { decrypted, failed } = envelope::decrypt_batch(values, password);
        (Self::from_entries(decrypted), failed)
    }

    /// Re-encrypt the whole set and write it under the `passwords` key.
    pub async fn persist(
        &self,
        kv: &dyn KeyValueStore,
        namespace: &str,
        password: &str,
    ) -> Result<usize, StrongboxError> {
        let store = self.clone();
        let password = Zeroizing::new(password.to_string());
        let envelopes = offload(move || store.seal_all(&password)).await?;
        let count = envelopes.len();
        kv.set(namespace, PASSWORDS_KEY, Value::Array(envelopes))
            .await?;
        debug!(count, "vault persisted");
        Ok(count)
    }

    /// Read and decrypt the persisted set. Undecryptable records are dropped
    /// and counted.
    pub async fn load(
        kv: &dyn KeyValueStore,
        namespace: &str,
        password: &str,
    ) -> Result<(Self, usize), StrongboxError> {
        let values = read_envelopes(kv, namespace).await?;
        let password = Zeroizing::new(password.to_string());
        let (store, failed) = offload(move || Ok(Self::open_all(&values, &password))).await?;
        if failed > 0 {
            warn!(failed, loaded = store.len(), "dropped undecryptable records on load");
        }
        Ok((store, failed))
    }
}

/// The persisted envelope array, empty if never written.
///
/// A legacy value stored as a JSON string is parsed once more.
pub async fn read_envelopes(
    kv: &dyn KeyValueStore,
    namespace: &str,
) -> Result<Vec<Value>, StrongboxError> {
    match kv.get(namespace, PASSWORDS_KEY).await? {
        None | Some(Value::Null) => Ok(Vec::new()),
        Some(Value::Array(values)) => Ok(values),
        Some(Value::String(text)) => match serde_json::from_str(&text)? {
            Value::Array(values) => Ok(values),
            _ => Err(StrongboxError::Storage {
                source: "persisted passwords value is not an array".into(),
            }),
        },
        Some(_) => Err(StrongboxError::Storage {
            source: "persisted passwords value is not an array".into(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use strongbox_test_utils::{MemoryKvStore, entry};

    fn abc() -> VaultStore {
        let mut store = VaultStore::new();
        store.add(entry("1", "A"));
        store.add(entry("2", "B"));
        store.add(entry("3", "C"));
        store
    }

    #[test]
    fn add_prepends() {
        let store = abc();
        let titles: Vec<_> = store.entries().iter().map(|e| e.title.as_str()).collect();
        assert_eq!(titles, ["C", "B", "A"]);
    }

    #[test]
    fn replace_and_remove_by_exact_id() {
        let mut store = abc();
        let mut b = store.get(&EntryId::from("2")).unwrap().clone();
        b.title = "B2".into();
        assert!(store.replace(b));
        assert_eq!(store.entries()[1].title, "B2");

        assert!(!store.replace(entry("9", "Z")));
        assert!(!store.remove(&EntryId::from("22")));
        assert!(store.remove(&EntryId::from("2")));
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn search_is_case_insensitive_and_ordered() {
        let store = abc();
        let hits = store.search("  B.EXAMPLE ");
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].title, "B");
        assert_eq!(store.search("").len(), 3);
        assert!(store.search("nothing").is_empty());
    }

    #[tokio::test]
    async fn persist_then_load_round_trips() {
        let kv = MemoryKvStore::new();
        let store = abc();
        assert_eq!(store.persist(&kv, "ns", "abc123").await.unwrap(), 3);

        let (loaded, failed) = VaultStore::load(&kv, "ns", "abc123").await.unwrap();
        assert_eq!(failed, 0);
        assert_eq!(loaded, store);
    }

    #[tokio::test]
    async fn persist_writes_fresh_envelopes_each_time() {
        let kv = MemoryKvStore::new();
        let store = abc();
        store.persist(&kv, "ns", "pw").await.unwrap();
        let first = kv.peek("ns", PASSWORDS_KEY).await;
        store.persist(&kv, "ns", "pw").await.unwrap();
        assert_ne!(first, kv.peek("ns", PASSWORDS_KEY).await);
    }

    #[tokio::test]
    async fn load_is_tolerant_of_bad_records() {
        let kv = MemoryKvStore::new();
        let mut values = abc().seal_all("pw").unwrap();
        values.push(json!({"encrypted": "nope"}));
        let foreign = envelope::encrypt(&entry("4", "D"), "other").unwrap();
        values.push(serde_json::to_value(foreign).unwrap());
        kv.seed("ns", PASSWORDS_KEY, Value::Array(values)).await;

        let (loaded, failed) = VaultStore::load(&kv, "ns", "pw").await.unwrap();
        assert_eq!(loaded.len(), 3);
        assert_eq!(failed, 2);
    }

    #[tokio::test]
    async fn load_of_empty_namespace_is_empty() {
        let kv = MemoryKvStore::new();
        let (loaded, failed) = VaultStore::load(&kv, "ns", "pw").await.unwrap();
        assert!(loaded.is_empty());
        assert_eq!(failed, 0);
    }

    #[tokio::test]
    async fn legacy_string_array_is_read() {
        let kv = MemoryKvStore::new();
        let values = abc().seal_all("pw").unwrap();
        kv.seed("ns", PASSWORDS_KEY, Value::String(Value::Array(values).to_string()))
            .await;
        assert_eq!(read_envelopes(&kv, "ns").await.unwrap().len(), 3);
    }
}
