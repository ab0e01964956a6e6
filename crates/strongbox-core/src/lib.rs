// SPDX-FileCopyrightText: 2026 Strongbox Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for Strongbox.
//!
//! Provides the error taxonomy, the collaborator traits the vault consumes
//! (persistence, cloud, clipboard, TOTP, clock) and the data types shared by
//! every other crate in the workspace.

pub mod error;
pub mod traits;
pub mod types;

// Re-export key items at crate root for ergonomic imports.
pub use error::StrongboxError;
pub use types::{
    AdapterType, CloudSnapshot, EntryId, Envelope, HealthStatus, MasterKeyRecord, VaultEntry,
};

pub use traits::{
    ClipboardWriter, Clock, CloudStore, KeyValueStore, PluginAdapter, SystemClock, TotpGenerator,
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn adapter_type_round_trips_through_display() {
        use std::str::FromStr;

        for variant in [AdapterType::Persistence, AdapterType::Cloud] {
            let s = variant.to_string();
            let parsed = AdapterType::from_str(&s).expect("should parse back");
            assert_eq!(variant, parsed);
        }
    }

    #[test]
    fn system_clock_moves_forward() {
        let a = SystemClock.now();
        let b = SystemClock.now();
        assert!(b >= a);
    }

    #[test]
    fn all_collaborator_traits_are_exported() {
        fn _assert_store<T: KeyValueStore>() {}
        fn _assert_cloud<T: CloudStore>() {}
        fn _assert_clipboard<T: ClipboardWriter>() {}
        fn _assert_totp<T: TotpGenerator>() {}
        fn _assert_clock<T: Clock>() {}
        fn _assert_adapter<T: PluginAdapter>() {}
    }
}
