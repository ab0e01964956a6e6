// SPDX-FileCopyrightText: 2026 Strongbox Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Envelope-encrypted password vault.
//!
//! Every entry is sealed independently with AES-256-GCM under a key derived
//! from the master password via PBKDF2-HMAC-SHA256 and a per-entry salt.
//! The master password itself is only ever stored as a salted SHA-256
//! verifier. Changing it re-encrypts every entry.

pub mod autosave;
pub mod crypto;
pub mod entry;
pub mod envelope;
pub mod generator;
pub mod kdf;
pub mod master;
pub mod merge;
pub mod prompt;
pub mod store;
pub mod totp;
pub mod vault;

pub use autosave::{AutosaveHandle, spawn_autosave};
pub use entry::{EntryDraft, EntryPatch};
pub use envelope::BatchOutcome;
pub use generator::generate_password;
pub use master::MasterKeyManager;
pub use store::VaultStore;
pub use totp::RfcTotp;
pub use vault::{CopiedSecret, MergeReport, Vault};
