// SPDX-FileCopyrightText: 2026 Strongbox Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! TOTP code generator collaborator (RFC 6238).

/// Opaque TOTP generator.
///
/// Receives an already sanitized base32 secret (no whitespace, upper-case)
/// and returns the 6-digit code for the 30-second step containing
/// `unix_secs`, or `None` if the secret is invalid.
pub trait TotpGenerator: Send + Sync {
    fn generate(&self, secret: &str, unix_secs: u64) -> Option<String>;
}
