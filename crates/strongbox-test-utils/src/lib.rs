// SPDX-FileCopyrightText: 2026 Strongbox Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test utilities for Strongbox.
//!
//! In-memory implementations of every collaborator trait so vault and sync
//! behavior can be tested deterministically without disk or network.
//!
//! # Components
//!
//! - [`MemoryKvStore`] - key-value store with write-failure injection
//! - [`MemoryCloudStore`] - cloud drive backed by a map of files
//! - [`RecordingClipboard`] - captures clipboard writes
//! - [`FixedClock`] - manually advanced clock
//! - [`FixedTotp`] - TOTP generator returning a fixed code

pub mod fixtures;
pub mod mock_cloud;
pub mod mock_kv;
pub mod mock_system;

pub use fixtures::{entry, entry_at, totp_entry};
pub use mock_cloud::MemoryCloudStore;
pub use mock_kv::MemoryKvStore;
pub use mock_system::{FixedClock, FixedTotp, RecordingClipboard};
