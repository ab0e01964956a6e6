// SPDX-FileCopyrightText: 2026 Strongbox Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs for Strongbox.
//!
//! All structs use `#[serde(deny_unknown_fields)]` to reject unrecognized
//! config keys at startup, providing actionable error messages.

use serde::{Deserialize, Serialize};

/// Top-level Strongbox configuration.
///
/// Loaded from TOML files following XDG hierarchy, with environment variable overrides.
/// All sections are optional and default to sensible values.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct StrongboxConfig {
    /// Process-wide settings.
    #[serde(default)]
    pub general: GeneralConfig,

    /// Key-value persistence settings.
    #[serde(default)]
    pub storage: StorageConfig,

    /// Master password and session settings.
    #[serde(default)]
    pub vault: VaultConfig,

    /// Cloud synchronization settings.
    #[serde(default)]
    pub sync: SyncConfig,

    /// Password generator defaults.
    #[serde(default)]
    pub generator: GeneratorConfig,
}

/// Process-wide settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct GeneralConfig {
    /// Logging level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Key-value persistence configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct StorageConfig {
    /// Path to the SQLite database file.
    #[serde(default = "default_database_path")]
    pub database_path: String,

    /// Namespace holding the vault keys (`passwords`, `master_password_hash`, `salt`).
    #[serde(default = "default_namespace")]
    pub namespace: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            database_path: default_database_path(),
            namespace: default_namespace(),
        }
    }
}

fn default_database_path() -> String {
    dirs::data_dir()
        .map(|d| d.join("strongbox").join("strongbox.db"))
        .unwrap_or_else(|| std::path::PathBuf::from("strongbox.db"))
        .display()
        .to_string()
}

fn default_namespace() -> String {
    "password_db".to_string()
}

/// Master password and unlocked-session settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct VaultConfig {
    /// Minimum master password length accepted on setup and rotation (default: 6).
    #[serde(default = "default_min_password_length")]
    pub min_password_length: usize,

    /// Seconds between background persists while unlocked (default: 5).
    #[serde(default = "default_autosave_interval_secs")]
    pub autosave_interval_secs: u64,
}

impl Default for VaultConfig {
    fn default() -> Self {
        Self {
            min_password_length: default_min_password_length(),
            autosave_interval_secs: default_autosave_interval_secs(),
        }
    }
}

fn default_min_password_length() -> usize {
    6
}

fn default_autosave_interval_secs() -> u64 {
    5
}

/// Cloud synchronization settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct SyncConfig {
    /// Remote file name holding the snapshot (default: `passwords.enc`).
    #[serde(default = "default_sync_filename")]
    pub filename: String,

    /// Per-call timeout for cloud operations in seconds (default: 30).
    #[serde(default = "default_sync_timeout_secs")]
    pub timeout_secs: u64,

    /// Upload after every saved mutation while connected (default: true).
    #[serde(default = "default_true")]
    pub auto_upload: bool,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            filename: default_sync_filename(),
            timeout_secs: default_sync_timeout_secs(),
            auto_upload: true,
        }
    }
}

fn default_sync_filename() -> String {
    "passwords.enc".to_string()
}

fn default_sync_timeout_secs() -> u64 {
    30
}

fn default_true() -> bool {
    true
}

/// Password generator defaults.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct GeneratorConfig {
    /// Generated password length (default: 16).
    #[serde(default = "default_generator_length")]
    pub length: usize,

    #[serde(default = "default_true")]
    pub uppercase: bool,

    #[serde(default = "default_true")]
    pub lowercase: bool,

    #[serde(default = "default_true")]
    pub numbers: bool,

    #[serde(default = "default_true")]
    pub symbols: bool,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            length: default_generator_length(),
            uppercase: true,
            lowercase: true,
            numbers: true,
            symbols: true,
        }
    }
}

fn default_generator_length() -> usize {
    16
}
