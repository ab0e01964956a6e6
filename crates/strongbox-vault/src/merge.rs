// SPDX-FileCopyrightText: 2026 Strongbox Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Local-first merge of downloaded entries into the working set.
//!
//! A remote entry whose id already exists locally is discarded, even when the
//! remote copy is newer. Remote entries with unseen ids are appended in batch
//! order. Merging the same batch twice therefore adds nothing the second time.

use std::collections::HashSet;

use strongbox_core::{EntryId, VaultEntry};

use crate::store::VaultStore;

/// Merge `remote` into `local`, returning how many entries were added.
pub fn merge_local_first(local: &mut VaultStore, remote: Vec<VaultEntry>) -> usize {
    let mut seen: HashSet<EntryId> = local.entries().iter().map(|e| e.id.clone()).collect();
    let mut added = 0;
    for entry in remote {
        if seen.insert(entry.id.clone()) {
            local.append(entry);
            added += 1;
        }
    }
    added
}
