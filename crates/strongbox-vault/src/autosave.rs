// SPDX-FileCopyrightText: 2026 Strongbox Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Periodic background persistence while the vault is unlocked.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::vault::Vault;

/// Handle to a running autosave task. Dropping it cancels the task.
pub struct AutosaveHandle {
    cancel: CancellationToken,
    task: Option<JoinHandle<()>>,
}

impl AutosaveHandle {
    /// Cancel the timer and wait for an in-flight save to finish.
    pub async fn stop(mut self) {
        self.cancel.cancel();
        if let Some(task) = self.task.take()
            && let Err(e) = task.await
        {
            warn!(error = %e, "autosave task ended abnormally");
        }
    }
}

impl Drop for AutosaveHandle {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

/// Spawn a task that flushes unsaved changes every `interval`.
///
/// A flush takes the vault's writer lock, so it never overlaps an edit,
/// merge or rotation. Clean or locked vaults are left alone: after a tick the
/// stored records decrypt to the working set whether or not it was rewritten,
/// and only salts and IVs would differ.
pub fn spawn_autosave(vault: Arc<Vault>, interval: Duration) -> AutosaveHandle {
    let cancel = CancellationToken::new();
    let token = cancel.clone();

    let task = tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // The first tick fires immediately.
        ticker.tick().await;

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    match vault.flush().await {
                        Ok(true) => debug!("autosave: changes persisted"),
                        Ok(false) => {}
                        Err(e) => warn!(error = %e, "autosave failed, will retry"),
                    }
                }
                _ = token.cancelled() => {
                    info!("autosave shutting down");
                    break;
                }
            }
        }
    });

    AutosaveHandle {
        cancel,
        task: Some(task),
    }
}
