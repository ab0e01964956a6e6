// SPDX-FileCopyrightText: 2026 Strongbox Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Strongbox - an envelope-encrypted password vault.
//!
//! This is the binary entry point for the `strongbox` CLI.

#[cfg(not(target_env = "msvc"))]
use tikv_jemallocator::Jemalloc;

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: Jemalloc = Jemalloc;

mod app;
mod clipboard;
mod cloud;
mod commands;
mod shell;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use colored::Colorize;
use strongbox_config::StrongboxConfig;
use strongbox_core::StrongboxError;

use crate::app::App;
use crate::cloud::SyncCommand;
use crate::commands::VaultCommand;

/// Strongbox - an envelope-encrypted password vault.
#[derive(Parser, Debug)]
#[command(name = "strongbox", version, about, long_about = None)]
struct Cli {
    /// Read configuration from this file instead of the XDG hierarchy.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Set the master password for a new vault.
    Init,
    #[command(flatten)]
    Vault(VaultCommand),
    /// Cloud synchronization.
    #[command(subcommand)]
    Sync(SyncCommand),
    /// Launch an interactive session with autosave.
    Shell,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let loaded = match cli.config.as_deref() {
        Some(path) => strongbox_config::load_and_validate_path(path),
        None => strongbox_config::load_and_validate(),
    };
    let config = match loaded {
        Ok(config) => config,
        Err(errors) => {
            strongbox_config::render_errors(&errors);
            std::process::exit(1);
        }
    };

    init_tracing(&config.general.log_level);

    let Some(command) = cli.command else {
        println!("strongbox: use --help for available commands");
        return;
    };

    if let Err(e) = run(config, command).await {
        eprintln!("{}: {e}", "error".red());
        std::process::exit(1);
    }
}

async fn run(config: StrongboxConfig, command: Commands) -> Result<(), StrongboxError> {
    let app = App::open(config).await?;
    let result = dispatch(&app, command).await;
    // Lock and checkpoint even when the command failed.
    let closed = app.close().await;
    result.and(closed)
}

async fn dispatch(app: &App, command: Commands) -> Result<(), StrongboxError> {
    match command {
        Commands::Init => commands::run_init(app).await,
        Commands::Vault(command) => {
            if commands::needs_unlock(&command) {
                app.unlock().await?;
            }
            commands::run_vault_command(app, command).await
        }
        Commands::Sync(command) => {
            if command.needs_unlock() {
                app.unlock_local().await?;
            }
            cloud::run_sync_command(app, command).await
        }
        Commands::Shell => shell::run_shell(app).await,
    }
}

/// Logs go to stderr so stdout stays scriptable.
fn init_tracing(log_level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("strongbox={log_level},warn")));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_thread_names(false)
        .init();
}
