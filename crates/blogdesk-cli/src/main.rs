//! blogdesk - command-line client for the blog management API.
//!
//! Restores the persisted session on startup, runs one subcommand against
//! it, then tears the session scope down.

mod args;
mod commands;

use std::io;
use std::sync::Arc;

use anyhow::{Context, Result};
use blogdesk_core::auth::{FileTokenStorage, TokenStorage};
use blogdesk_core::{ApiClient, Config, SessionScope};
use clap::Parser;
use tracing::{debug, info};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use args::{Cli, Commands};

/// Initialize the tracing subscriber for logging.
/// The returned guard flushes buffered log lines when dropped.
fn init_tracing() -> WorkerGuard {
    // Use RUST_LOG env var to control log level (e.g., RUST_LOG=debug)
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("warn"));
    let (writer, guard) = tracing_appender::non_blocking(io::stderr());

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(writer))
        .with(filter)
        .init();
    guard
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (silently ignore if not found)
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();
    let _guard = init_tracing();

    let config_path = match cli.config {
        Some(ref path) => path.clone(),
        None => Config::config_path()?,
    };
    let mut config = Config::load_from(&config_path)?;

    let base_url = cli
        .api_url
        .clone()
        .unwrap_or_else(|| config.api_base_url().to_string());
    let api = ApiClient::new(&base_url)
        .with_context(|| format!("Invalid API URL {}", base_url))?;

    let storage: Arc<dyn TokenStorage> = match cli.session_file {
        Some(ref path) => Arc::new(FileTokenStorage::new(path)),
        None => config.token_storage()?,
    };
    debug!(%base_url, storage = ?config.storage, "Starting session");

    let scope = SessionScope::new();
    scope.enter(api, storage).await;
    info!(authenticated = scope.snapshot()?.is_authenticated(), "Session restored");

    let result = match cli.command {
        Commands::Login { email } => commands::login(&scope, &mut config, &config_path, email).await,
        Commands::Logout => commands::logout(&scope).await,
        Commands::Status => commands::status(&scope),
        Commands::Categories => commands::categories(&scope).await,
    };

    scope.teardown();
    result
}
