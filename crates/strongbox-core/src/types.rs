// SPDX-FileCopyrightText: 2026 Strongbox Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Vault data types shared across the Strongbox crates.
//!
//! Field names serialize in the camelCase shape of existing vaults so that
//! previously persisted records keep decrypting.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use strum::{Display, EnumString};

/// Key-value store key holding the persisted envelope array.
pub const PASSWORDS_KEY: &str = "passwords";

/// Key-value store key holding the hex SHA-256 of the master password.
pub const MASTER_HASH_KEY: &str = "master_password_hash";

/// Key-value store key holding the hex master salt.
pub const MASTER_SALT_KEY: &str = "salt";

/// Unique, immutable identifier of a vault entry.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntryId(pub String);

impl EntryId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for EntryId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for EntryId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// One decrypted credential record.
///
/// Exists in plaintext only inside an unlocked session.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VaultEntry {
    pub id: EntryId,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub notes: String,
    #[serde(
        default,
        deserialize_with = "empty_string_as_none",
        skip_serializing_if = "Option::is_none"
    )]
    pub totp_secret: Option<String>,
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl VaultEntry {
    /// True if the entry carries a non-blank TOTP secret.
    pub fn has_totp(&self) -> bool {
        self.totp_secret
            .as_deref()
            .is_some_and(|s| !s.trim().is_empty())
    }

    /// Case-insensitive substring match over title, username, url and notes.
    ///
    /// `needle` must already be lowercased.
    pub fn matches(&self, needle: &str) -> bool {
        [&self.title, &self.username, &self.url, &self.notes]
            .iter()
            .any(|field| field.to_lowercase().contains(needle))
    }
}

impl std::fmt::Debug for VaultEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VaultEntry")
            .field("id", &self.id)
            .field("title", &self.title)
            .field("username", &self.username)
            .field("password", &"[REDACTED]")
            .field("url", &self.url)
            .field("has_totp", &self.has_totp())
            .field("created_at", &self.created_at)
            .field("updated_at", &self.updated_at)
            .finish()
    }
}

fn empty_string_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<String>::deserialize(deserializer)?;
    Ok(value.filter(|s| !s.is_empty()))
}

/// Self-contained at-rest form of one [`VaultEntry`].
///
/// Byte fields serialize as JSON number arrays under the keys
/// `encrypted`, `iv` and `salt`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Envelope {
    /// AES-256-GCM ciphertext with the 16-byte tag appended.
    #[serde(rename = "encrypted")]
    pub ciphertext: Vec<u8>,
    /// 96-bit GCM nonce.
    pub iv: [u8; 12],
    /// 128-bit PBKDF2 salt for this envelope only.
    pub salt: [u8; 16],
}

/// Stored verifier for the master password.
///
/// Never contains the password itself.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MasterKeyRecord {
    /// Hex SHA-256 of `password || salt`.
    pub hash: String,
    /// Hex encoding of 32 random bytes.
    pub salt: String,
}

impl std::fmt::Debug for MasterKeyRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MasterKeyRecord")
            .field("hash", &"[REDACTED]")
            .field("salt", &self.salt)
            .finish()
    }
}

/// Cloud-stored batch of envelopes.
///
/// `data` stays untyped so one malformed element cannot fail the whole
/// batch at parse time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CloudSnapshot {
    pub version: String,
    /// Milliseconds since the Unix epoch at upload time.
    pub timestamp: i64,
    pub data: Vec<serde_json::Value>,
}

/// Current cloud snapshot format version.
pub const SNAPSHOT_VERSION: &str = "1.0";

/// Health status reported by adapter health checks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HealthStatus {
    /// Adapter is fully operational.
    Healthy,
    /// Adapter is operational but experiencing issues.
    Degraded(String),
    /// Adapter is not operational.
    Unhealthy(String),
}

/// Identifies the kind of collaborator behind an adapter.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
pub enum AdapterType {
    Persistence,
    Cloud,
}
