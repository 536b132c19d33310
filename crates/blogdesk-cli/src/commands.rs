//! Handlers for each subcommand. They only see the session through the
//! scope handed to them.

use std::io::{self, BufRead, Write};
use std::path::Path;

use anyhow::{Context, Result};
use blogdesk_core::{Config, SessionScope, SessionSnapshot};
use serde_json::json;
use tracing::warn;

/// Password source checked before prompting
const PASSWORD_ENV: &str = "BLOGDESK_PASSWORD";

pub async fn login(
    scope: &SessionScope,
    config: &mut Config,
    config_path: &Path,
    email: Option<String>,
) -> Result<()> {
    let store = scope.store()?;

    let email = match email.or_else(|| config.last_email.clone()) {
        Some(email) => email,
        None => prompt_line("Email: ")?,
    };
    if email.is_empty() {
        anyhow::bail!("Email is required");
    }

    let password = match std::env::var(PASSWORD_ENV) {
        Ok(password) => password,
        Err(_) => rpassword::prompt_password("Password: ").context("Failed to read password")?,
    };

    store.login(&email, &password).await?;

    config.last_email = Some(email.clone());
    if let Err(e) = config.save_to(config_path) {
        warn!(error = %e, "Failed to save config");
    }

    println!("Logged in as {}", email);
    Ok(())
}

pub async fn logout(scope: &SessionScope) -> Result<()> {
    scope.store()?.logout().await;
    println!("Logged out");
    Ok(())
}

pub fn status(scope: &SessionScope) -> Result<()> {
    let snapshot = scope.snapshot()?;
    println!("{}", serde_json::to_string_pretty(&redacted(&snapshot))?);
    Ok(())
}

pub async fn categories(scope: &SessionScope) -> Result<()> {
    let store = scope.store()?;
    if !store.is_authenticated() {
        warn!("Not logged in, listing public categories only");
    }

    let categories = store
        .api()
        .fetch_categories()
        .await
        .context("Failed to fetch categories")?;

    if categories.is_empty() {
        println!("No categories");
    }
    for category in categories {
        println!("{}\t{}", category.name, category.display_post_count());
    }
    Ok(())
}

/// Status view with the token hidden
fn redacted(snapshot: &SessionSnapshot) -> serde_json::Value {
    json!({
        "isAuthenticated": snapshot.is_authenticated(),
        "ready": snapshot.is_ready(),
        "user": snapshot.user(),
        "token": snapshot.token().map(|_| "<redacted>"),
        "expiresAt": snapshot.expires_at(),
    })
}

fn prompt_line(prompt: &str) -> Result<String> {
    print!("{}", prompt);
    io::stdout().flush()?;
    let mut line = String::new();
    io::stdin().lock().read_line(&mut line)?;
    Ok(line.trim().to_string())
}
