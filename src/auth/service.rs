use std::sync::Arc;

use super::device_code::DeviceCodeSession;
use super::error::AuthError;
use super::manager::{TokenManager, TokenSource};
use super::providers::github_copilot::GitHubCopilotAuth;
use super::store::{CredentialStore, StoredAuth};
use super::token::AccessToken;

/// Login, logout and status operations over one credential store.
///
/// All I/O decisions (printing, prompting, exit codes) belong to the caller.
///
/// # Example
/// ```no_run
/// use std::sync::Arc;
/// use copilot_auth::auth::providers::github_copilot::GitHubCopilotAuth;
/// use copilot_auth::auth::service::AuthService;
/// use copilot_auth::auth::FileCredentialStore;
/// use copilot_auth::config::Endpoints;
///
/// # async fn run() -> Result<(), copilot_auth::auth::AuthError> {
/// let svc = AuthService::new(
///     Arc::new(FileCredentialStore::new_default()),
///     GitHubCopilotAuth::new(Endpoints::github()),
/// );
/// svc.login(|session| {
///     println!("Please visit: {}", session.verification_uri);
///     println!("And enter code: {}", session.user_code);
/// })
/// .await?;
/// # Ok(())
/// # }
/// ```
pub struct AuthService {
    store: Arc<dyn CredentialStore>,
    auth: GitHubCopilotAuth,
    enterprise_url: Option<String>,
}

impl AuthService {
    pub fn new(store: Arc<dyn CredentialStore>, auth: GitHubCopilotAuth) -> Self {
        Self {
            store,
            auth,
            enterprise_url: None,
        }
    }

    /// Recorded in the stored credential after a successful login.
    pub fn with_enterprise_url(mut self, url: Option<String>) -> Self {
        self.enterprise_url = url;
        self
    }

    pub async fn start_login(&self) -> Result<DeviceCodeSession, AuthError> {
        self.auth.request_device_code().await
    }

    /// Waits for approval of `session`, mints the first Copilot token and
    /// persists both.
    pub async fn complete_login(&self, session: &DeviceCodeSession) -> Result<StoredAuth, AuthError> {
        let github_token = self
            .auth
            .poll_for_credential(&session.device_code, session.interval, session.expires_in)
            .await?;
        let copilot = self.auth.exchange_copilot_token(&github_token).await?;
        let stored = StoredAuth {
            github_token,
            copilot_token: Some(copilot.token),
            copilot_token_expires_at: Some(copilot.expires_at),
            enterprise_url: self.enterprise_url.clone(),
        };
        self.store.save(&stored)?;
        tracing::info!("github copilot login stored");
        Ok(stored)
    }

    /// Runs the whole device flow; `prompt` shows the code to the user.
    pub async fn login<F>(&self, prompt: F) -> Result<StoredAuth, AuthError>
    where
        F: FnOnce(&DeviceCodeSession),
    {
        let session = self.start_login().await?;
        prompt(&session);
        self.complete_login(&session).await
    }

    pub fn logout(&self) -> Result<(), AuthError> {
        self.store.clear()
    }

    /// Local check only; no network traffic.
    pub fn is_authenticated(&self) -> bool {
        match self.store.load() {
            Ok(Some(stored)) => !stored.github_token.is_empty(),
            Ok(None) => false,
            Err(err) => {
                tracing::warn!(error = %err, "failed to read credential store");
                false
            }
        }
    }

    pub fn stored(&self) -> Result<Option<StoredAuth>, AuthError> {
        self.store.load()
    }

    /// A store-backed manager sharing this service's store and client.
    pub fn token_manager(&self) -> TokenManager {
        TokenManager::new(self.auth.clone(), TokenSource::Store(self.store.clone()))
    }

    /// Current valid Copilot token, refreshed and written back when needed.
    pub async fn valid_token(&self) -> Result<AccessToken, AuthError> {
        self.token_manager().current_token().await
    }
}
