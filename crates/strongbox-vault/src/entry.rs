// SPDX-FileCopyrightText: 2026 Strongbox Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Entry input types, save-time validation, and id generation.

use chrono::{DateTime, Utc};
use rand::Rng;
use strongbox_core::{EntryId, StrongboxError, VaultEntry};

const BASE36: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";
const ID_SUFFIX_LEN: usize = 10;

/// User-supplied fields for a new entry.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct EntryDraft {
    pub title: String,
    pub username: String,
    pub password: String,
    pub url: String,
    pub notes: String,
    pub totp_secret: Option<String>,
}

impl std::fmt::Debug for EntryDraft {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EntryDraft")
            .field("title", &self.title)
            .field("username", &self.username)
            .field("password", &"[REDACTED]")
            .finish_non_exhaustive()
    }
}

impl EntryDraft {
    /// Trim every field and enforce the required-field rules.
    ///
    /// With a TOTP secret only the title is required; without one the
    /// title, username and password all are.
    pub fn normalized(self) -> Result<Self, StrongboxError> {
        let draft = Self {
            title: self.title.trim().to_string(),
            username: self.username.trim().to_string(),
            password: self.password.trim().to_string(),
            url: self.url.trim().to_string(),
            notes: self.notes.trim().to_string(),
            totp_secret: self
                .totp_secret
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty()),
        };

        if draft.totp_secret.is_some() {
            if draft.title.is_empty() {
                return Err(StrongboxError::InvalidEntry(
                    "title is required".to_string(),
                ));
            }
        } else if draft.title.is_empty() || draft.username.is_empty() || draft.password.is_empty()
        {
            return Err(StrongboxError::InvalidEntry(
                "title, username and password are required".to_string(),
            ));
        }
        Ok(draft)
    }

    /// Materialize into a stored entry.
    pub fn into_entry(self, id: EntryId, created_at: DateTime<Utc>) -> VaultEntry {
        VaultEntry {
            id,
            title: self.title,
            username: self.username,
            password: self.password,
            url: self.url,
            notes: self.notes,
            totp_secret: self.totp_secret,
            created_at,
            updated_at: None,
        }
    }

    fn from_entry(entry: &VaultEntry) -> Self {
        Self {
            title: entry.title.clone(),
            username: entry.username.clone(),
            password: entry.password.clone(),
            url: entry.url.clone(),
            notes: entry.notes.clone(),
            totp_secret: entry.totp_secret.clone(),
        }
    }
}

/// Field replacements for an existing entry. `None` leaves a field as is.
///
/// `totp_secret: Some(None)` clears the secret.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EntryPatch {
    pub title: Option<String>,
    pub username: Option<String>,
    pub password: Option<String>,
    pub url: Option<String>,
    pub notes: Option<String>,
    pub totp_secret: Option<Option<String>>,
}

impl EntryPatch {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Apply to `entry`, re-validating the result. `id` and `created_at`
    /// are preserved and `updated_at` is stamped with `now`.
    pub fn apply(self, entry: &VaultEntry, now: DateTime<Utc>) -> Result<VaultEntry, StrongboxError> {
        let current = EntryDraft::from_entry(entry);
        let merged = EntryDraft {
            title: self.title.unwrap_or(current.title),
            username: self.username.unwrap_or(current.username),
            password: self.password.unwrap_or(current.password),
            url: self.url.unwrap_or(current.url),
            notes: self.notes.unwrap_or(current.notes),
            totp_secret: self.totp_secret.unwrap_or(current.totp_secret),
        }
        .normalized()?;

        let mut updated = merged.into_entry(entry.id.clone(), entry.created_at);
        updated.updated_at = Some(now);
        Ok(updated)
    }
}

/// Time-ordered id: base36 milliseconds followed by a random base36 suffix.
pub fn generate_id(now: DateTime<Utc>) -> EntryId {
    let millis = u64::try_from(now.timestamp_millis()).unwrap_or_default();
    let mut id = to_base36(millis);
    let mut rng = rand::thread_rng();
    id.extend((0..ID_SUFFIX_LEN).map(|_| BASE36[rng.gen_range(0..BASE36.len())] as char));
    EntryId(id)
}

fn to_base36(mut n: u64) -> String {
    if n == 0 {
        return "0".to_string();
    }
    let mut digits = Vec::new();
    while n > 0 {
        digits.push(BASE36[(n % 36) as usize]);
        n /= 36;
    }
    digits.reverse();
    String::from_utf8_lossy(&digits).into_owned()
}
