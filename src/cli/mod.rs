//! CLI entry point for copilot-auth.

pub mod auth;

use clap::{Parser, Subcommand};

/// GitHub Copilot authentication CLI
#[derive(Parser, Debug)]
#[command(name = "copilot-auth", version, about = "GitHub Copilot device-code login")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level CLI commands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Login with the GitHub device flow
    Login(LoginArgs),
    /// Delete the stored credential
    Logout,
    /// Show authentication status (no network access)
    Status,
    /// Print a currently valid Copilot token, refreshing it if needed
    Token,
}

/// Arguments for `copilot-auth login`.
#[derive(Parser, Debug)]
pub struct LoginArgs {
    /// GitHub Enterprise base URL (e.g. https://ghe.example.com)
    #[arg(long)]
    pub enterprise_url: Option<String>,
}
