//! Command-line surface for `blogdesk`.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "blogdesk", version, about = "Blog management client", long_about = None)]
pub struct Cli {
    /// API base URL, e.g. <http://localhost:8080>
    #[arg(long, env = "BLOGDESK_API_URL")]
    pub api_url: Option<String>,

    /// Config file (defaults to ~/.config/blogdesk/config.json)
    #[arg(long, env = "BLOGDESK_CONFIG")]
    pub config: Option<PathBuf>,

    /// Persist the session token in this file instead of the configured backend
    #[arg(long, env = "BLOGDESK_SESSION_FILE")]
    pub session_file: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Log in and persist the session token
    Login {
        /// Account email (defaults to the last one used)
        #[arg(long)]
        email: Option<String>,
    },
    /// Forget the session token
    Logout,
    /// Show the current session as JSON
    Status,
    /// List blog categories
    Categories,
}
