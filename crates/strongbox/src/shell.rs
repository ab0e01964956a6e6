// SPDX-FileCopyrightText: 2026 Strongbox Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `strongbox shell` command implementation.
//!
//! Unlocks once, then accepts the same vault and sync commands as the CLI
//! with readline history. Pending changes are autosaved in the background
//! and flushed when the shell exits.

use std::time::Duration;

use clap::{Parser, Subcommand};
use colored::Colorize;
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;
use strongbox_core::StrongboxError;
use strongbox_vault::spawn_autosave;
use tracing::info;

use crate::app::App;
use crate::cloud::{SyncCommand, run_sync_command};
use crate::commands::{VaultCommand, run_vault_command};

#[derive(Parser, Debug)]
#[command(name = "strongbox-shell", no_binary_name = true, disable_version_flag = true)]
struct ShellLine {
    #[command(subcommand)]
    command: ShellCommand,
}

#[derive(Subcommand, Debug)]
enum ShellCommand {
    #[command(flatten)]
    Vault(VaultCommand),
    /// Cloud synchronization.
    #[command(subcommand)]
    Sync(SyncCommand),
    /// Save pending changes now.
    Save,
}

/// Runs the `strongbox shell` interactive REPL.
pub async fn run_shell(app: &App) -> Result<(), StrongboxError> {
    app.unlock().await?;
    let autosave = spawn_autosave(
        app.vault.clone(),
        Duration::from_secs(app.config.vault.autosave_interval_secs),
    );

    let mut rl = DefaultEditor::new()
        .map_err(|e| StrongboxError::Internal(format!("failed to initialize readline: {e}")))?;

    println!("{}", "strongbox shell".bold().green());
    println!("Type {} for commands, {} to exit.\n", "help".yellow(), "/quit".yellow());

    let prompt = format!("{}> ", "strongbox".green());
    loop {
        match rl.readline(&prompt) {
            Ok(line) => {
                let trimmed = line.trim();
                if matches!(trimmed, "/quit" | "/exit" | "quit" | "exit") {
                    break;
                }
                if trimmed.is_empty() {
                    continue;
                }
                let _ = rl.add_history_entry(&line);

                let words = match split_args(trimmed) {
                    Ok(words) => words,
                    Err(e) => {
                        eprintln!("{}: {e}", "error".red());
                        continue;
                    }
                };
                let parsed = match ShellLine::try_parse_from(words) {
                    Ok(parsed) => parsed,
                    Err(e) => {
                        let _ = e.print();
                        continue;
                    }
                };
                if let Err(e) = handle_shell_command(app, parsed.command).await {
                    eprintln!("{}: {e}", "error".red());
                }
            }
            Err(ReadlineError::Interrupted | ReadlineError::Eof) => break,
            Err(e) => {
                eprintln!("{}: {e}", "error".red());
                break;
            }
        }
    }

    autosave.stop().await;
    if app.vault.flush().await? {
        println!("{}", "pending changes saved".dimmed());
    }
    info!("shell closed");
    Ok(())
}

async fn handle_shell_command(app: &App, command: ShellCommand) -> Result<(), StrongboxError> {
    match command {
        ShellCommand::Vault(command) => run_vault_command(app, command).await,
        ShellCommand::Sync(command) => run_sync_command(app, command).await,
        ShellCommand::Save => {
            let count = app.vault.persist().await?;
            println!("saved {count} entries");
            Ok(())
        }
    }
}

/// Split a shell line into words, honoring single and double quotes.
fn split_args(line: &str) -> Result<Vec<String>, StrongboxError> {
    let mut words = Vec::new();
    let mut current = String::new();
    let mut in_word = false;
    let mut quote: Option<char> = None;

    for c in line.chars() {
        match quote {
            Some(q) if c == q => quote = None,
            Some(_) => current.push(c),
            None if c == '"' || c == '\'' => {
                quote = Some(c);
                in_word = true;
            }
            None if c.is_whitespace() => {
                if in_word {
                    words.push(std::mem::take(&mut current));
                    in_word = false;
                }
            }
            None => {
                current.push(c);
                in_word = true;
            }
        }
    }
    if quote.is_some() {
        return Err(StrongboxError::Internal("unterminated quote".to_string()));
    }
    if in_word {
        words.push(current);
    }
    Ok(words)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn split_plain_and_quoted_words() {
        assert_eq!(
            split_args(r#"add --title "My Bank" --url 'https://x.y'"#).unwrap(),
            ["add", "--title", "My Bank", "--url", "https://x.y"]
        );
        assert_eq!(split_args("  list   ").unwrap(), ["list"]);
        assert_eq!(split_args(r#"edit 1 --notes """#).unwrap(), ["edit", "1", "--notes", ""]);
    }

    #[test]
    fn unterminated_quote_is_rejected() {
        assert!(split_args(r#"add --title "oops"#).is_err());
    }

    #[test]
    fn shell_parses_vault_and_sync_commands() {
        let line = ShellLine::try_parse_from(["show", "abc", "--reveal"]).unwrap();
        assert!(matches!(
            line.command,
            ShellCommand::Vault(VaultCommand::Show { ref id, reveal: true }) if id == "abc"
        ));

        let line = ShellLine::try_parse_from(["sync", "pull"]).unwrap();
        assert!(matches!(line.command, ShellCommand::Sync(SyncCommand::Pull)));

        let line = ShellLine::try_parse_from(["save"]).unwrap();
        assert!(matches!(line.command, ShellCommand::Save));
    }

    #[test]
    fn shell_rejects_unknown_commands() {
        assert!(ShellLine::try_parse_from(["frobnicate"]).is_err());
    }
}
