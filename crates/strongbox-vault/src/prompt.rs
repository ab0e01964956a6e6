// SPDX-FileCopyrightText: 2026 Strongbox Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Master password acquisition via TTY prompt or the
//! `STRONGBOX_MASTER_PASSWORD` environment variable.

use secrecy::SecretString;
use strongbox_core::StrongboxError;

/// The environment variable name for providing the master password.
pub const MASTER_PASSWORD_ENV_VAR: &str = "STRONGBOX_MASTER_PASSWORD";

fn from_env() -> Option<String> {
    std::env::var(MASTER_PASSWORD_ENV_VAR)
        .ok()
        .filter(|value| !value.is_empty())
}

fn stdin_is_terminal() -> bool {
    std::io::IsTerminal::is_terminal(&std::io::stdin())
}

/// Read one line without echo. Empty input is returned as is.
pub fn read_hidden(label: &str) -> Result<SecretString, StrongboxError> {
    if !stdin_is_terminal() {
        return Err(StrongboxError::Vault(format!(
            "cannot prompt for {label}: stdin is not a terminal"
        )));
    }
    eprint!("{label}: ");
    rpassword::read_password()
        .map(SecretString::from)
        .map_err(|e| StrongboxError::Vault(format!("failed to read {label}: {e}")))
}

fn no_password_error() -> StrongboxError {
    StrongboxError::Vault(format!(
        "No master password provided. Set {MASTER_PASSWORD_ENV_VAR} or run interactively."
    ))
}

/// Get the master password for unlocking.
///
/// Priority:
/// 1. `STRONGBOX_MASTER_PASSWORD` (for scripts)
/// 2. Interactive TTY prompt via `rpassword`
pub fn get_master_password() -> Result<SecretString, StrongboxError> {
    if let Some(password) = from_env() {
        return Ok(SecretString::from(password));
    }
    if stdin_is_terminal() {
        return read_hidden("Master password");
    }
    Err(no_password_error())
}

/// Get a new master password and its confirmation.
///
/// The environment variable needs no confirmation and is returned twice.
/// Length and match checks are left to the vault.
pub fn get_new_master_password(
    label: &str,
) -> Result<(SecretString, SecretString), StrongboxError> {
    if let Some(password) = from_env() {
        return Ok((SecretString::from(password.clone()), SecretString::from(password)));
    }
    if stdin_is_terminal() {
        let password = read_hidden(label)?;
        let confirmation = read_hidden(&format!("Confirm {}", label.to_lowercase()))?;
        return Ok((password, confirmation));
    }
    Err(no_password_error())
}
