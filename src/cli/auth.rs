//! CLI handlers for login, logout, status and token.

use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::auth::providers::github_copilot::GitHubCopilotAuth;
use crate::auth::{AuthService, FileCredentialStore};
use crate::config::{CopilotSettings, Endpoints};

fn auth_service(settings: &CopilotSettings) -> AuthService {
    let store = Arc::new(FileCredentialStore::new(settings.store_paths()));
    AuthService::new(store, GitHubCopilotAuth::new(settings.endpoints()))
        .with_enterprise_url(settings.enterprise_url.clone())
}

/// Handle `copilot-auth login`.
pub async fn handle_login(
    mut settings: CopilotSettings,
    enterprise_url: Option<String>,
) -> Result<(), Box<dyn std::error::Error>> {
    if enterprise_url.is_some() {
        settings.enterprise_url = enterprise_url;
    }
    let svc = auth_service(&settings);

    println!("Starting GitHub Copilot authentication...\n");
    svc.login(|session| {
        println!("Please visit: {}", session.verification_uri);
        println!("And enter code: {}", session.user_code);
        println!("\nWaiting for authorization...");
    })
    .await
    .map_err(|e| e.user_message())?;

    println!("\nSuccessfully authenticated with GitHub Copilot!");
    Ok(())
}

/// Handle `copilot-auth logout`.
pub async fn handle_logout(settings: CopilotSettings) -> Result<(), Box<dyn std::error::Error>> {
    auth_service(&settings).logout()?;
    println!("Logged out from GitHub Copilot.");
    Ok(())
}

/// Handle `copilot-auth status`.
pub async fn handle_status(settings: CopilotSettings) -> Result<(), Box<dyn std::error::Error>> {
    let svc = auth_service(&settings);
    if !svc.is_authenticated() {
        println!("GitHub Copilot: not logged in");
        return Ok(());
    }
    println!("GitHub Copilot: logged in");
    if let Some(stored) = svc.stored()? {
        if let Some(url) = stored.enterprise_url {
            println!("  Enterprise: {url}");
        }
        match stored
            .copilot_token_expires_at
            .and_then(|secs| DateTime::<Utc>::from_timestamp(secs, 0))
        {
            Some(expires) if expires > Utc::now() => {
                println!("  Copilot token expires {}", expires.format("%Y-%m-%d %H:%M"))
            }
            Some(_) => println!("  Copilot token expired (refreshed on next use)"),
            None => println!("  No cached Copilot token"),
        }
    }
    Ok(())
}

/// Handle `copilot-auth token`.
pub async fn handle_token(mut settings: CopilotSettings) -> Result<(), Box<dyn std::error::Error>> {
    if settings.enterprise_url.is_none() && settings.endpoints.is_none() {
        let stored = auth_service(&settings).stored()?;
        if let Some(url) = stored.and_then(|s| s.enterprise_url) {
            settings.endpoints = Some(Endpoints::resolve(Some(&url)));
            settings.enterprise_url = Some(url);
        }
    }
    let token = auth_service(&settings)
        .valid_token()
        .await
        .map_err(|e| e.user_message())?;
    println!("{}", token.token);
    Ok(())
}
