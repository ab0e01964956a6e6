// SPDX-FileCopyrightText: 2026 Strongbox Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Entry and master-password commands shared by the CLI and the shell.

use std::io::{BufRead, IsTerminal, Write};

use clap::{Args, Subcommand};
use colored::Colorize;
use secrecy::ExposeSecret;
use strongbox_config::model::GeneratorConfig;
use strongbox_core::{EntryId, StrongboxError, VaultEntry};
use strongbox_vault::{CopiedSecret, EntryDraft, EntryPatch, generate_password, prompt};

use crate::app::App;

/// Commands that operate on an unlocked vault.
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum VaultCommand {
    /// Add a new entry.
    Add(AddArgs),
    /// List entries, newest first.
    List {
        /// Only show entries whose title, username, URL or notes contain this text.
        #[arg(long, short)]
        search: Option<String>,
    },
    /// Show one entry.
    Show {
        id: String,
        /// Print the password in clear text.
        #[arg(long)]
        reveal: bool,
    },
    /// Change fields of an entry.
    Edit(EditArgs),
    /// Delete an entry.
    Remove {
        id: String,
        /// Skip the confirmation prompt.
        #[arg(long, short)]
        yes: bool,
    },
    /// Copy the entry's TOTP code, or its password, to the clipboard.
    Copy { id: String },
    /// Print the entry's current TOTP code.
    Totp { id: String },
    /// Generate a random password.
    Generate {
        /// Override the configured length.
        #[arg(long, short)]
        length: Option<usize>,
    },
    /// Change the master password and re-encrypt every entry.
    Passwd,
}

#[derive(Args, Debug, Clone, PartialEq, Eq)]
pub struct AddArgs {
    #[arg(long, short)]
    pub title: String,
    #[arg(long, short, default_value = "")]
    pub username: String,
    #[arg(long, default_value = "")]
    pub url: String,
    #[arg(long, default_value = "")]
    pub notes: String,
    /// Base32 TOTP secret.
    #[arg(long)]
    pub totp: Option<String>,
    /// Use a generated password instead of prompting for one.
    #[arg(long, short, conflicts_with = "no_password")]
    pub generate: bool,
    /// Store no password (TOTP-only entries).
    #[arg(long)]
    pub no_password: bool,
}

#[derive(Args, Debug, Clone, PartialEq, Eq)]
pub struct EditArgs {
    pub id: String,
    #[arg(long, short)]
    pub title: Option<String>,
    #[arg(long, short)]
    pub username: Option<String>,
    #[arg(long)]
    pub url: Option<String>,
    #[arg(long)]
    pub notes: Option<String>,
    /// Replace the TOTP secret.
    #[arg(long, conflicts_with = "clear_totp")]
    pub totp: Option<String>,
    /// Remove the TOTP secret.
    #[arg(long)]
    pub clear_totp: bool,
    /// Prompt for a new password.
    #[arg(long, conflicts_with = "generate")]
    pub password: bool,
    /// Replace the password with a generated one.
    #[arg(long, short)]
    pub generate: bool,
}

impl EditArgs {
    fn into_patch(self, generator: &GeneratorConfig) -> Result<EntryPatch, StrongboxError> {
        let password = if self.generate {
            Some(generate_password(generator).to_string())
        } else if self.password {
            Some(
                prompt::read_hidden("New entry password")?
                    .expose_secret()
                    .to_string(),
            )
        } else {
            None
        };
        let totp_secret = if self.clear_totp {
            Some(None)
        } else {
            self.totp.map(Some)
        };
        Ok(EntryPatch {
            title: self.title,
            username: self.username,
            password,
            url: self.url,
            notes: self.notes,
            totp_secret,
        })
    }
}

/// First-time setup of the master password.
pub async fn run_init(app: &App) -> Result<(), StrongboxError> {
    if app.vault.has_master_key().await? {
        return Err(StrongboxError::AlreadyInitialized);
    }
    let (password, confirmation) = prompt::get_new_master_password("Master password")?;
    app.vault.setup(&password, &confirmation).await?;
    println!("{}", "vault initialized".green());
    Ok(())
}

/// Run one vault command. The vault must already be unlocked, except for
/// `generate` (no vault access) and `passwd` (verifies the old password
/// itself).
pub async fn run_vault_command(app: &App, command: VaultCommand) -> Result<(), StrongboxError> {
    match command {
        VaultCommand::Add(args) => {
            let password = if args.generate {
                generate_password(&app.config.generator).to_string()
            } else if args.no_password {
                String::new()
            } else {
                prompt::read_hidden("Entry password")?
                    .expose_secret()
                    .to_string()
            };
            let id = app
                .vault
                .add(EntryDraft {
                    title: args.title,
                    username: args.username,
                    password,
                    url: args.url,
                    notes: args.notes,
                    totp_secret: args.totp,
                })
                .await?;
            println!("added {}", id.to_string().bold());
            app.auto_upload().await;
        }
        VaultCommand::List { search } => {
            let entries = match search.as_deref() {
                Some(query) => app.vault.search(query).await?,
                None => app.vault.list().await?,
            };
            if entries.is_empty() {
                println!("{}", "no entries".dimmed());
            }
            for entry in &entries {
                println!("{}", summary_line(entry));
            }
        }
        VaultCommand::Show { id, reveal } => {
            let entry = find(app, &id).await?;
            print!("{}", detail(&entry, reveal));
            if entry.has_totp()
                && let Some(code) = app.vault.totp_code(&entry.id).await?
            {
                println!(
                    "{:>9} {} ({}s)",
                    "totp:",
                    code.bold(),
                    app.vault.totp_remaining()
                );
            }
        }
        VaultCommand::Edit(args) => {
            let id = EntryId::from(args.id.as_str());
            let patch = args.into_patch(&app.config.generator)?;
            if patch.is_empty() {
                return Err(StrongboxError::InvalidEntry("nothing to change".to_string()));
            }
            if !app.vault.update(&id, patch).await? {
                return Err(StrongboxError::EntryNotFound(id.to_string()));
            }
            println!("updated {}", id.to_string().bold());
            app.auto_upload().await;
        }
        VaultCommand::Remove { id, yes } => {
            let entry = find(app, &id).await?;
            if !yes && !confirm(&format!("Delete \"{}\"?", entry.title))? {
                println!("{}", "cancelled".dimmed());
                return Ok(());
            }
            app.vault.remove(&entry.id).await?;
            println!("removed {}", entry.id.to_string().bold());
            app.auto_upload().await;
        }
        VaultCommand::Copy { id } => {
            let what = app.vault.copy_secret(&EntryId::from(id.as_str())).await?;
            match what {
                CopiedSecret::Password => eprintln!("{}", "password copied".green()),
                CopiedSecret::TotpCode => eprintln!("{}", "TOTP code copied".green()),
            }
        }
        VaultCommand::Totp { id } => {
            let entry = find(app, &id).await?;
            let code = app
                .vault
                .totp_code(&entry.id)
                .await?
                .ok_or_else(|| StrongboxError::InvalidEntry("entry has no usable TOTP secret".to_string()))?;
            println!("{code}");
            eprintln!("{}", format!("valid for {}s", app.vault.totp_remaining()).dimmed());
        }
        VaultCommand::Generate { length } => {
            let mut config = app.config.generator.clone();
            if let Some(length) = length {
                config.length = length;
            }
            println!("{}", generate_password(&config).as_str());
        }
        VaultCommand::Passwd => {
            let old = prompt::read_hidden("Current master password")?;
            let (new, confirmation) = prompt::get_new_master_password("New master password")?;
            let count = app.vault.rotate(&old, &new, &confirmation).await?;
            println!("master password changed, {count} entries re-encrypted");
            app.auto_upload().await;
        }
    }
    Ok(())
}

/// Whether `command` needs an unlocked vault.
pub fn needs_unlock(command: &VaultCommand) -> bool {
    !matches!(command, VaultCommand::Generate { .. } | VaultCommand::Passwd)
}

async fn find(app: &App, id: &str) -> Result<VaultEntry, StrongboxError> {
    app.vault
        .get(&EntryId::from(id))
        .await?
        .ok_or_else(|| StrongboxError::EntryNotFound(id.to_string()))
}

fn confirm(question: &str) -> Result<bool, StrongboxError> {
    let stdin = std::io::stdin();
    if !stdin.is_terminal() {
        return Err(StrongboxError::Internal(
            "refusing to delete without --yes when stdin is not a terminal".to_string(),
        ));
    }
    eprint!("{question} [y/N] ");
    std::io::stderr()
        .flush()
        .map_err(|e| StrongboxError::Internal(format!("stderr: {e}")))?;
    let mut answer = String::new();
    stdin
        .lock()
        .read_line(&mut answer)
        .map_err(|e| StrongboxError::Internal(format!("stdin: {e}")))?;
    Ok(matches!(answer.trim(), "y" | "Y" | "yes"))
}

pub(crate) fn summary_line(entry: &VaultEntry) -> String {
    let mut line = format!("{}  {}", entry.id.as_str().dimmed(), entry.title.bold());
    if !entry.username.is_empty() {
        line.push_str(&format!("  {}", entry.username));
    }
    if !entry.url.is_empty() {
        line.push_str(&format!("  {}", entry.url.cyan()));
    }
    if entry.has_totp() {
        line.push_str(&format!("  {}", "[totp]".yellow()));
    }
    line
}

pub(crate) fn detail(entry: &VaultEntry, reveal: bool) -> String {
    let password = if entry.password.is_empty() {
        String::new()
    } else if reveal {
        entry.password.clone()
    } else {
        "********".to_string()
    };
    let mut out = String::new();
    for (label, value) in [
        ("id:", entry.id.as_str()),
        ("title:", entry.title.as_str()),
        ("username:", entry.username.as_str()),
        ("password:", password.as_str()),
        ("url:", entry.url.as_str()),
        ("notes:", entry.notes.as_str()),
    ] {
        if !value.is_empty() {
            out.push_str(&format!("{label:>9} {value}\n"));
        }
    }
    out.push_str(&format!("{:>9} {}\n", "created:", entry.created_at.to_rfc3339()));
    if let Some(updated) = entry.updated_at {
        out.push_str(&format!("{:>9} {}\n", "updated:", updated.to_rfc3339()));
    }
    out
}
