// SPDX-FileCopyrightText: 2026 Strongbox Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Master password verifier: setup checks, hashing and persistence of the
//! [`MasterKeyRecord`].
//!
//! The stored hash is `hex(SHA-256(password || salt_hex))` where the salt is
//! concatenated in its hex-string form. Existing vaults depend on that exact
//! byte layout.

use std::sync::Arc;

use ring::digest::{SHA256, digest};
use serde_json::Value;
use strongbox_core::types::{MASTER_HASH_KEY, MASTER_SALT_KEY};
use strongbox_core::{KeyValueStore, MasterKeyRecord, StrongboxError};
use zeroize::Zeroizing;

use crate::crypto::random_bytes;

/// Master salt length in bytes, before hex encoding.
pub const MASTER_SALT_LEN: usize = 32;

/// Hash `password` against a hex salt.
pub fn hash_password(password: &str, salt_hex: &str) -> String {
    let mut input = Zeroizing::new(Vec::with_capacity(password.len() + salt_hex.len()));
    input.extend_from_slice(password.as_bytes());
    input.extend_from_slice(salt_hex.as_bytes());
    hex::encode(digest(&SHA256, &input))
}

/// Constant-time check of `password` against a stored record.
pub fn verify(record: &MasterKeyRecord, password: &str) -> bool {
    let candidate = hash_password(password, &record.salt);
    ring::constant_time::verify_slices_are_equal(
        candidate.as_bytes(),
        record.hash.to_ascii_lowercase().as_bytes(),
    )
    .is_ok()
}

/// Build a fresh record with a new random salt.
pub fn new_record(password: &str) -> Result<MasterKeyRecord, StrongboxError> {
    let salt = hex::encode(random_bytes::<MASTER_SALT_LEN>()?);
    Ok(MasterKeyRecord {
        hash: hash_password(password, &salt),
        salt,
    })
}

/// Reject passwords shorter than `min_len` characters or not matching the confirmation.
pub fn check_new_password(
    password: &str,
    confirmation: &str,
    min_len: usize,
) -> Result<(), StrongboxError> {
    if password.chars().count() < min_len {
        return Err(StrongboxError::WeakInput(format!(
            "master password must be at least {min_len} characters"
        )));
    }
    if password != confirmation {
        return Err(StrongboxError::WeakInput(
            "passwords do not match".to_string(),
        ));
    }
    Ok(())
}

/// Key-value pairs that persist `record`, for inclusion in an atomic batch.
pub fn record_entries(record: &MasterKeyRecord) -> Vec<(String, Value)> {
    vec![
        (MASTER_HASH_KEY.to_string(), Value::String(record.hash.clone())),
        (MASTER_SALT_KEY.to_string(), Value::String(record.salt.clone())),
    ]
}

/// Reads and writes the [`MasterKeyRecord`] in the vault namespace.
#[derive(Clone)]
pub struct MasterKeyManager {
    kv: Arc<dyn KeyValueStore>,
    namespace: String,
}

impl MasterKeyManager {
    pub fn new(kv: Arc<dyn KeyValueStore>, namespace: impl Into<String>) -> Self {
        Self {
            kv,
            namespace: namespace.into(),
        }
    }

    /// True iff both the hash and the salt are stored.
    pub async fn has_master_key(&self) -> Result<bool, StrongboxError> {
        Ok(self.load().await?.is_some())
    }

    /// The stored record, or `None` before setup.
    pub async fn load(&self) -> Result<Option<MasterKeyRecord>, StrongboxError> {
        let hash = self.kv.get(&self.namespace, MASTER_HASH_KEY).await?;
        let salt = self.kv.get(&self.namespace, MASTER_SALT_KEY).await?;
        match (hash, salt) {
            (Some(Value::String(hash)), Some(Value::String(salt)))
                if !hash.is_empty() && !salt.is_empty() =>
            {
                Ok(Some(MasterKeyRecord { hash, salt }))
            }
            (None, None) => Ok(None),
            (Some(_), None) | (None, Some(_)) => Err(StrongboxError::Storage {
                source: "master key record is incomplete".into(),
            }),
            _ => Err(StrongboxError::Storage {
                source: "master key record is not a pair of hex strings".into(),
            }),
        }
    }

    /// Persist `record` (hash and salt in one atomic write).
    pub async fn store(&self, record: &MasterKeyRecord) -> Result<(), StrongboxError> {
        self.kv
            .set_many(&self.namespace, record_entries(record))
            .await
    }

    /// Load the record and verify `password` against it.
    pub async fn verify_password(&self, password: &str) -> Result<bool, StrongboxError> {
        let record = self.load().await?.ok_or(StrongboxError::NotInitialized)?;
        Ok(verify(&record, password))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strongbox_test_utils::MemoryKvStore;

    #[test]
    fn hash_concatenates_password_and_hex_salt() {
        let expected = hex::encode(digest(&SHA256, b"abc123deadbeef"));
        assert_eq!(hash_password("abc123", "deadbeef"), expected);
        assert_eq!(expected.len(), 64);
    }

    #[test]
    fn new_record_verifies_only_its_password() {
        let record = new_record("abc123").unwrap();
        assert_eq!(record.salt.len(), MASTER_SALT_LEN * 2);
        assert!(verify(&record, "abc123"));
        assert!(!verify(&record, "abc124"));
        assert!(!verify(&record, ""));
    }

    #[test]
    fn records_for_same_password_differ() {
        let a = new_record("abc123").unwrap();
        let b = new_record("abc123").unwrap();
        assert_ne!(a.salt, b.salt);
        assert_ne!(a.hash, b.hash);
    }

    #[test]
    fn weak_and_mismatched_passwords_are_rejected() {
        assert!(matches!(
            check_new_password("abc12", "abc12", 6),
            Err(StrongboxError::WeakInput(_))
        ));
        assert!(matches!(
            check_new_password("abc123", "abc124", 6),
            Err(StrongboxError::WeakInput(_))
        ));
        assert!(check_new_password("abc123", "abc123", 6).is_ok());
    }

    #[tokio::test]
    async fn manager_stores_and_loads_record() {
        let kv = Arc::new(MemoryKvStore::new());
        let manager = MasterKeyManager::new(kv.clone(), "password_db");
        assert!(!manager.has_master_key().await.unwrap());
        assert!(matches!(
            manager.verify_password("abc123").await,
            Err(StrongboxError::NotInitialized)
        ));

        let record = new_record("abc123").unwrap();
        manager.store(&record).await.unwrap();
        assert!(manager.has_master_key().await.unwrap());
        assert_eq!(manager.load().await.unwrap(), Some(record.clone()));
        assert!(manager.verify_password("abc123").await.unwrap());
        assert_eq!(
            kv.peek("password_db", MASTER_SALT_KEY).await,
            Some(Value::String(record.salt))
        );
    }

    #[tokio::test]
    async fn half_written_record_is_an_error() {
        let kv = Arc::new(MemoryKvStore::new());
        kv.seed("password_db", MASTER_HASH_KEY, Value::String("ab".into()))
            .await;
        let manager = MasterKeyManager::new(kv, "password_db");
        assert!(manager.load().await.is_err());
    }
}
