// SPDX-FileCopyrightText: 2026 Strongbox Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SQLite persistence for Strongbox.
//!
//! Provides the [`SqliteKvStore`] adapter backing the namespaced key-value
//! contract the vault persists its envelopes and master record through.

pub mod database;
pub mod kv;
pub mod migrations;

pub use database::Database;
pub use kv::SqliteKvStore;
