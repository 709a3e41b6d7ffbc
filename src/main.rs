//! copilot-auth CLI binary entry point.

use clap::Parser;
use copilot_auth::cli::{auth, Cli, Commands};
use copilot_auth::config::CopilotSettings;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let settings = CopilotSettings::from_env();

    let result = match cli.command {
        Commands::Login(args) => auth::handle_login(settings, args.enterprise_url).await,
        Commands::Logout => auth::handle_logout(settings).await,
        Commands::Status => auth::handle_status(settings).await,
        Commands::Token => auth::handle_token(settings).await,
    };

    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
