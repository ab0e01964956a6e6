// SPDX-FileCopyrightText: 2026 Strongbox Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Local-first cloud synchronization.
//!
//! The cloud only ever sees the persisted envelope array wrapped in a
//! versioned snapshot. Downloads merge into the vault without overwriting
//! any local entry.

pub mod drive;
pub mod reconciler;
pub mod snapshot;

pub use drive::LocalDriveStore;
pub use reconciler::{SyncReconciler, SyncStatus, UploadOutcome};
pub use snapshot::{build_snapshot, normalize_payload};
