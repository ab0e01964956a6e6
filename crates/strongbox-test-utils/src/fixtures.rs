// SPDX-FileCopyrightText: 2026 Strongbox Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Entry fixtures.

use chrono::{DateTime, TimeZone, Utc};

use strongbox_core::{EntryId, VaultEntry};

/// A login entry with predictable fields derived from `id` and `title`.
pub fn entry(id: &str, title: &str) -> VaultEntry {
    entry_at(id, title, Utc.timestamp_opt(1_714_557_600, 0).single().unwrap_or_default())
}

/// Like [`entry`] with an explicit creation time.
pub fn entry_at(id: &str, title: &str, created_at: DateTime<Utc>) -> VaultEntry {
    VaultEntry {
        id: EntryId::from(id),
        title: title.to_string(),
        username: format!("{}@example.com", title.to_lowercase()),
        password: format!("{title}-pw"),
        url: format!("https://{}.example.com", title.to_lowercase()),
        notes: String::new(),
        totp_secret: None,
        created_at,
        updated_at: None,
    }
}

/// A TOTP-only entry with no username or password.
pub fn totp_entry(id: &str, title: &str, secret: &str) -> VaultEntry {
    VaultEntry {
        username: String::new(),
        password: String::new(),
        totp_secret: Some(secret.to_string()),
        ..entry(id, title)
    }
}
