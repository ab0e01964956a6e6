// SPDX-FileCopyrightText: 2026 Strongbox Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration loader using Figment for layered config merging.
//!
//! Supports XDG hierarchy: `./strongbox.toml` > `~/.config/strongbox/strongbox.toml`
//! > `/etc/strongbox/strongbox.toml`, with environment variable overrides via
//! the `STRONGBOX_` prefix.

#![allow(clippy::result_large_err)] // figment::Error is external and cannot be boxed without wrapper

use std::path::{Path, PathBuf};

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};

use crate::model::StrongboxConfig;

/// System-wide config file location.
pub const SYSTEM_CONFIG_PATH: &str = "/etc/strongbox/strongbox.toml";

/// Local config file name, looked up in the working directory.
pub const LOCAL_CONFIG_FILE: &str = "strongbox.toml";

/// Sections whose env vars map `STRONGBOX_<SECTION>_<KEY>` to `<section>.<key>`.
const SECTIONS: &[&str] = &["general", "storage", "vault", "sync", "generator"];

/// Per-user config file location under the XDG config dir.
pub fn user_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("strongbox").join(LOCAL_CONFIG_FILE))
}

/// Load configuration from the standard XDG hierarchy with env var overrides.
///
/// Merge order (later overrides earlier):
/// 1. Compiled defaults
/// 2. `/etc/strongbox/strongbox.toml`
/// 3. `~/.config/strongbox/strongbox.toml`
/// 4. `./strongbox.toml`
/// 5. `STRONGBOX_*` environment variables
pub fn load_config() -> Result<StrongboxConfig, figment::Error> {
    build_figment().extract()
}

/// Load configuration from a TOML string only (no files, no env).
pub fn load_config_from_str(toml_content: &str) -> Result<StrongboxConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(StrongboxConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
}

/// Load configuration from an explicit file path with env var overrides.
pub fn load_config_from_path(path: &Path) -> Result<StrongboxConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(StrongboxConfig::default()))
        .merge(Toml::file(path))
        .merge(env_provider())
        .extract()
}

/// Build the layered Figment without extracting it.
pub fn build_figment() -> Figment {
    Figment::new()
        .merge(Serialized::defaults(StrongboxConfig::default()))
        .merge(Toml::file(SYSTEM_CONFIG_PATH))
        .merge(Toml::file(user_config_path().unwrap_or_default()))
        .merge(Toml::file(LOCAL_CONFIG_FILE))
        .merge(env_provider())
}

/// Env provider mapping `STRONGBOX_SYNC_TIMEOUT_SECS` to `sync.timeout_secs`.
///
/// Only the first underscore after a known section name becomes a dot, so
/// keys that contain underscores survive intact. `STRONGBOX_MASTER_PASSWORD`
/// belongs to no section and is ignored here.
fn env_provider() -> Env {
    Env::prefixed("STRONGBOX_")
        .filter(|key| section_of(&key.as_str().to_ascii_lowercase()).is_some())
        .map(|key| {
            let key_str = key.as_str().to_ascii_lowercase();
            let mapped = match section_of(&key_str) {
                Some(section) => key_str.replacen(&format!("{section}_"), &format!("{section}."), 1),
                None => key_str,
            };
            mapped.into()
        })
}

fn section_of(key: &str) -> Option<&'static str> {
    SECTIONS
        .iter()
        .copied()
        .find(|section| key.starts_with(&format!("{section}_")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn env_overrides_nested_key_with_underscores() {
        figment::Jail::expect_with(|jail| {
            jail.set_env("STRONGBOX_SYNC_TIMEOUT_SECS", "7");
            jail.set_env("STRONGBOX_VAULT_AUTOSAVE_INTERVAL_SECS", "9");
            let config: StrongboxConfig = Figment::new()
                .merge(Serialized::defaults(StrongboxConfig::default()))
                .merge(env_provider())
                .extract()?;
            assert_eq!(config.sync.timeout_secs, 7);
            assert_eq!(config.vault.autosave_interval_secs, 9);
            Ok(())
        });
    }

    #[test]
    fn master_password_env_var_is_not_config() {
        figment::Jail::expect_with(|jail| {
            jail.set_env("STRONGBOX_MASTER_PASSWORD", "abc123");
            let config: StrongboxConfig = Figment::new()
                .merge(Serialized::defaults(StrongboxConfig::default()))
                .merge(env_provider())
                .extract()?;
            assert_eq!(config.general.log_level, "info");
            Ok(())
        });
    }

    #[test]
    fn local_file_is_picked_up() {
        figment::Jail::expect_with(|jail| {
            jail.create_file(
                LOCAL_CONFIG_FILE,
                "[storage]\nnamespace = \"custom_ns\"\n",
            )?;
            let config: StrongboxConfig = Figment::new()
                .merge(Serialized::defaults(StrongboxConfig::default()))
                .merge(Toml::file(LOCAL_CONFIG_FILE))
                .extract()?;
            assert_eq!(config.storage.namespace, "custom_ns");
            Ok(())
        });
    }
}
