// SPDX-FileCopyrightText: 2026 Strongbox Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `strongbox sync` subcommands.

use std::path::PathBuf;

use clap::Subcommand;
use colored::Colorize;
use strongbox_core::StrongboxError;
use strongbox_sync::{SyncStatus, UploadOutcome};

use crate::app::App;

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum SyncCommand {
    /// Link a directory kept in sync by a cloud client.
    Connect { dir: PathBuf },
    /// Forget the linked directory.
    Disconnect,
    /// Upload the encrypted vault.
    Push,
    /// Download and merge; local entries always win.
    Pull,
    /// Replace the remote copy with the local vault.
    Reset,
    /// Show whether a directory is linked and a remote copy exists.
    Status,
}

impl SyncCommand {
    /// Whether the command reads or writes vault records.
    pub fn needs_unlock(&self) -> bool {
        matches!(self, Self::Push | Self::Pull | Self::Reset)
    }
}

pub async fn run_sync_command(app: &App, command: SyncCommand) -> Result<(), StrongboxError> {
    match command {
        SyncCommand::Connect { dir } => {
            let linked = app.drive.connect(&dir).await?;
            println!("linked {}", linked.display().to_string().bold());
        }
        SyncCommand::Disconnect => {
            app.sync.disconnect().await?;
            println!("{}", "cloud directory unlinked".dimmed());
        }
        SyncCommand::Push => print_upload(app.sync.upload().await?),
        SyncCommand::Reset => print_upload(app.sync.reset_sync().await?),
        SyncCommand::Pull => {
            let report = app.sync.download_and_merge().await?;
            println!(
                "merged: {} new, {} already present",
                report.added.to_string().bold(),
                report.decrypted - report.added
            );
            if report.failed > 0 {
                eprintln!(
                    "{}",
                    format!("{} cloud records could not be decrypted", report.failed).yellow()
                );
            }
        }
        SyncCommand::Status => {
            let status = app.sync.status().await?;
            let dir = app.drive.linked_dir().await?;
            println!("{}", status_line(status, dir.as_deref()));
        }
    }
    Ok(())
}

fn print_upload(outcome: UploadOutcome) {
    match outcome {
        UploadOutcome::Uploaded { count, file_id } => {
            println!("uploaded {count} entries to {file_id}");
        }
        UploadOutcome::NothingToSync => println!("{}", "no passwords to sync".dimmed()),
    }
}

fn status_line(status: SyncStatus, dir: Option<&std::path::Path>) -> String {
    match (status.connected, dir) {
        (true, Some(dir)) if status.remote_exists => {
            format!("connected to {} (remote copy present)", dir.display())
        }
        (true, Some(dir)) => format!("connected to {} (no remote copy yet)", dir.display()),
        _ => "not connected".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    #[test]
    fn only_record_transfers_need_unlock() {
        assert!(SyncCommand::Push.needs_unlock());
        assert!(SyncCommand::Pull.needs_unlock());
        assert!(SyncCommand::Reset.needs_unlock());
        assert!(!SyncCommand::Status.needs_unlock());
        assert!(!SyncCommand::Disconnect.needs_unlock());
        assert!(
            !SyncCommand::Connect {
                dir: PathBuf::from("/tmp")
            }
            .needs_unlock()
        );
    }

    #[test]
    fn status_lines() {
        let off = SyncStatus {
            connected: false,
            remote_exists: false,
        };
        assert_eq!(status_line(off, None), "not connected");

        let on = SyncStatus {
            connected: true,
            remote_exists: true,
        };
        assert_eq!(
            status_line(on, Some(Path::new("/drive"))),
            "connected to /drive (remote copy present)"
        );
    }
}
