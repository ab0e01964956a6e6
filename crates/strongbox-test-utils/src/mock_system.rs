// SPDX-FileCopyrightText: 2026 Strongbox Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Deterministic clipboard, clock and TOTP collaborators.

use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{DateTime, Duration, TimeZone, Utc};

use strongbox_core::{ClipboardWriter, Clock, StrongboxError, TotpGenerator};

/// Clipboard that records every write.
#[derive(Default)]
pub struct RecordingClipboard {
    writes: tokio::sync::Mutex<Vec<String>>,
}

impl RecordingClipboard {
    pub fn new() -> Self {
        Self::default()
    }

    /// The most recent text written, if any.
    pub async fn last(&self) -> Option<String> {
        self.writes.lock().await.last().cloned()
    }

    pub async fn count(&self) -> usize {
        self.writes.lock().await.len()
    }
}

#[async_trait]
impl ClipboardWriter for RecordingClipboard {
    async fn write_text(&self, text: &str) -> Result<(), StrongboxError> {
        self.writes.lock().await.push(text.to_string());
        Ok(())
    }
}

/// Clock that only moves when told to.
pub struct FixedClock {
    now: Mutex<DateTime<Utc>>,
}

impl FixedClock {
    pub fn new(now: DateTime<Utc>) -> Self {
        Self {
            now: Mutex::new(now),
        }
    }

    /// A clock pinned at `unix_secs`.
    pub fn at_unix(unix_secs: i64) -> Self {
        Self::new(Utc.timestamp_opt(unix_secs, 0).single().unwrap_or_default())
    }

    pub fn advance(&self, by: Duration) {
        let mut now = self.now.lock().unwrap_or_else(|p| p.into_inner());
        *now += by;
    }
}

impl Default for FixedClock {
    fn default() -> Self {
        Self::at_unix(1_714_557_600)
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock().unwrap_or_else(|p| p.into_inner())
    }
}

/// TOTP generator returning a fixed code for any secret it accepts.
///
/// Secrets listed via [`FixedTotp::reject`] yield `None`.
pub struct FixedTotp {
    code: String,
    rejected: Vec<String>,
}

impl FixedTotp {
    pub fn new(code: &str) -> Self {
        Self {
            code: code.to_string(),
            rejected: Vec::new(),
        }
    }

    pub fn reject(mut self, secret: &str) -> Self {
        self.rejected.push(secret.to_string());
        self
    }
}

impl Default for FixedTotp {
    fn default() -> Self {
        Self::new("123456")
    }
}

impl TotpGenerator for FixedTotp {
    fn generate(&self, secret: &str, _unix_secs: u64) -> Option<String> {
        if secret.is_empty() || self.rejected.iter().any(|r| r == secret) {
            return None;
        }
        Some(self.code.clone())
    }
}
