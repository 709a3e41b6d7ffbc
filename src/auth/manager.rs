//! Short-lived token cache with refresh-before-use.

use std::fmt;
use std::sync::{Arc, Mutex};

use futures::future::BoxFuture;

use super::error::AuthError;
use super::providers::github_copilot::GitHubCopilotAuth;
use super::store::CredentialStore;
use super::token::{now_epoch_secs, AccessToken, CopilotTokens};

/// Caller-supplied credential source.
pub type GetTokensFn =
    Arc<dyn Fn() -> BoxFuture<'static, Result<CopilotTokens, AuthError>> + Send + Sync>;

/// Hook receiving every freshly exchanged token, typically to persist it.
pub type TokenRefreshFn =
    Arc<dyn Fn(CopilotTokens) -> BoxFuture<'static, Result<(), AuthError>> + Send + Sync>;

/// Where the manager gets the long-lived credential from.
#[derive(Clone)]
pub enum TokenSource {
    Store(Arc<dyn CredentialStore>),
    Callback(GetTokensFn),
}

impl fmt::Debug for TokenSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Store(_) => f.write_str("TokenSource::Store"),
            Self::Callback(_) => f.write_str("TokenSource::Callback"),
        }
    }
}

impl TokenSource {
    pub async fn snapshot(&self) -> Result<CopilotTokens, AuthError> {
        match self {
            Self::Callback(get_tokens) => get_tokens().await,
            Self::Store(store) => {
                let stored = store
                    .load()?
                    .filter(|auth| !auth.github_token.is_empty())
                    .ok_or(AuthError::Unauthenticated)?;
                Ok(CopilotTokens {
                    github_token: stored.github_token,
                    access_token: stored.copilot_token,
                    expires_at: stored.copilot_token_expires_at,
                })
            }
        }
    }
}

/// Produces a currently valid Copilot token, exchanging only when needed.
///
/// Holds one cache cell. Concurrent callers racing on an expired cell may each
/// exchange; the last write wins.
///
/// # Example
/// ```no_run
/// use std::sync::Arc;
/// use copilot_auth::auth::manager::{TokenManager, TokenSource};
/// use copilot_auth::auth::providers::github_copilot::GitHubCopilotAuth;
/// use copilot_auth::auth::FileCredentialStore;
/// use copilot_auth::config::Endpoints;
///
/// # async fn run() -> Result<(), copilot_auth::auth::AuthError> {
/// let store = Arc::new(FileCredentialStore::new_default());
/// let manager = TokenManager::new(
///     GitHubCopilotAuth::new(Endpoints::github()),
///     TokenSource::Store(store),
/// );
/// let token = manager.current_token().await?;
/// println!("{}", token.expires_at);
/// # Ok(())
/// # }
/// ```
pub struct TokenManager {
    auth: GitHubCopilotAuth,
    source: TokenSource,
    on_refresh: Option<TokenRefreshFn>,
    write_back: Option<Arc<dyn CredentialStore>>,
    cached: Mutex<Option<AccessToken>>,
}

impl TokenManager {
    /// A store-backed source gets write-back iff its own file exists right now.
    pub fn new(auth: GitHubCopilotAuth, source: TokenSource) -> Self {
        let write_back = match &source {
            TokenSource::Store(store) if store.primary_exists() => Some(store.clone()),
            _ => None,
        };
        Self {
            auth,
            source,
            on_refresh: None,
            write_back,
            cached: Mutex::new(None),
        }
    }

    pub fn with_refresh_hook(mut self, hook: TokenRefreshFn) -> Self {
        self.on_refresh = Some(hook);
        self
    }

    /// Disables mirroring refreshed tokens into the credential store.
    pub fn without_write_back(mut self) -> Self {
        self.write_back = None;
        self
    }

    pub fn writes_back(&self) -> bool {
        self.write_back.is_some()
    }

    pub fn cached(&self) -> Option<AccessToken> {
        self.cached.lock().ok().and_then(|guard| guard.clone())
    }

    pub fn invalidate(&self) {
        self.store_cached(None);
    }

    /// Returns the cached token while it is outside the safety margin,
    /// otherwise refreshes it from the source or with one exchange call.
    pub async fn current_token(&self) -> Result<AccessToken, AuthError> {
        let now = now_epoch_secs();
        if let Some(cached) = self.cached().filter(|token| token.is_valid_at(now)) {
            tracing::trace!("copilot token cache hit");
            return Ok(cached);
        }

        let tokens = self.source.snapshot().await?;
        if let Some(bundled) = tokens.valid_access_token(now) {
            tracing::debug!(expires_at = bundled.expires_at, "adopting copilot token from source");
            self.store_cached(Some(bundled.clone()));
            return Ok(bundled);
        }

        let fresh = self.auth.exchange_copilot_token(&tokens.github_token).await?;
        self.store_cached(Some(fresh.clone()));
        tracing::debug!(expires_at = fresh.expires_at, "copilot token refreshed");

        if let Some(hook) = &self.on_refresh {
            hook(CopilotTokens::github(tokens.github_token.clone()).with_access_token(&fresh))
                .await?;
        }
        if let Some(store) = &self.write_back {
            self.persist(store.as_ref(), &tokens.github_token, &fresh)?;
        }
        Ok(fresh)
    }

    fn persist(
        &self,
        store: &dyn CredentialStore,
        github_token: &str,
        fresh: &AccessToken,
    ) -> Result<(), AuthError> {
        let Some(mut stored) = store.load_primary()? else {
            tracing::debug!("primary credential gone, skipping write-back");
            return Ok(());
        };
        if stored.github_token != github_token {
            tracing::warn!("credential store changed during refresh, skipping write-back");
            return Ok(());
        }
        stored.copilot_token = Some(fresh.token.clone());
        stored.copilot_token_expires_at = Some(fresh.expires_at);
        store.save(&stored)
    }

    fn store_cached(&self, token: Option<AccessToken>) {
        if let Ok(mut guard) = self.cached.lock() {
            *guard = token;
        }
    }
}

impl fmt::Debug for TokenManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenManager")
            .field("source", &self.source)
            .field("on_refresh", &self.on_refresh.as_ref().map(|_| ".."))
            .field("write_back", &self.write_back.is_some())
            .finish()
    }
}
