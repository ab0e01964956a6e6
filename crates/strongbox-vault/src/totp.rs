// SPDX-FileCopyrightText: 2026 Strongbox Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! TOTP delegation: secret sanitization and the RFC 6238 generator.

use chrono::{DateTime, Utc};
use strongbox_core::TotpGenerator;
use totp_rs::{Algorithm, Secret, TOTP};

/// Length of one TOTP time step in seconds.
pub const TOTP_STEP_SECS: u64 = 30;

const TOTP_DIGITS: usize = 6;

/// Strip all whitespace and upper-case a base32 secret.
pub fn sanitize_secret(secret: &str) -> String {
    secret
        .chars()
        .filter(|c| !c.is_whitespace())
        .flat_map(char::to_uppercase)
        .collect()
}

/// Seconds until the current code expires, in `1..=30`.
pub fn remaining(now: DateTime<Utc>) -> u64 {
    let secs = u64::try_from(now.timestamp()).unwrap_or_default();
    TOTP_STEP_SECS - secs % TOTP_STEP_SECS
}

/// SHA-1, 6-digit, 30-second TOTP backed by `totp-rs`.
#[derive(Debug, Clone, Copy, Default)]
pub struct RfcTotp;

impl TotpGenerator for RfcTotp {
    fn generate(&self, secret: &str, unix_secs: u64) -> Option<String> {
        let bytes = Secret::Encoded(secret.to_string()).to_bytes().ok()?;
        if bytes.is_empty() {
            return None;
        }
        let totp = TOTP::new_unchecked(Algorithm::SHA1, TOTP_DIGITS, 1, TOTP_STEP_SECS, bytes);
        Some(totp.generate(unix_secs))
    }
}
