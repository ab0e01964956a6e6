// SPDX-FileCopyrightText: 2026 Strongbox Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post-deserialization validation for configuration values.

use crate::diagnostic::ConfigError;
use crate::model::StrongboxConfig;

/// Floor for the master password length; config may raise it, never lower it.
pub const MIN_MASTER_PASSWORD_LENGTH: usize = 6;

/// Validate a deserialized configuration for semantic correctness.
///
/// Collects every violation instead of failing fast.
pub fn validate_config(config: &StrongboxConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();
    let mut fail = |message: String| errors.push(ConfigError::Validation { message });

    if config.storage.database_path.trim().is_empty() {
        fail("storage.database_path must not be empty".to_string());
    }

    if config.storage.namespace.trim().is_empty() {
        fail("storage.namespace must not be empty".to_string());
    }

    if config.vault.min_password_length < MIN_MASTER_PASSWORD_LENGTH {
        fail(format!(
            "vault.min_password_length must be at least {MIN_MASTER_PASSWORD_LENGTH}, got {}",
            config.vault.min_password_length
        ));
    }

    if config.vault.autosave_interval_secs == 0 {
        fail("vault.autosave_interval_secs must be at least 1".to_string());
    }

    if config.sync.timeout_secs == 0 {
        fail("sync.timeout_secs must be at least 1".to_string());
    }

    let filename = config.sync.filename.trim();
    if filename.is_empty() {
        fail("sync.filename must not be empty".to_string());
    } else if filename.contains('/') || filename.contains('\\') {
        fail(format!(
            "sync.filename `{filename}` must be a bare file name without path separators"
        ));
    }

    let generator = &config.generator;
    if !(4..=128).contains(&generator.length) {
        fail(format!(
            "generator.length must be between 4 and 128, got {}",
            generator.length
        ));
    }
    if !(generator.uppercase || generator.lowercase || generator.numbers || generator.symbols) {
        fail("generator must enable at least one character class".to_string());
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
