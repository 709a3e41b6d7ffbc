//! GitHub Copilot provider: endpoint selection plus the authenticated fetch.

use std::sync::Arc;

use serde::Serialize;

use crate::auth::providers::github_copilot::GitHubCopilotAuth;
use crate::auth::{AuthError, FileCredentialStore, TokenManager, TokenSource};
use crate::config::CopilotSettings;
use crate::models::CopilotModelId;

use super::http::CopilotFetch;

/// Factory for Copilot language models sharing one token manager.
///
/// # Example
/// ```no_run
/// use copilot_auth::config::CopilotSettings;
/// use copilot_auth::provider::create_copilot;
///
/// # async fn run() -> Result<(), copilot_auth::auth::AuthError> {
/// let copilot = create_copilot(CopilotSettings::default())?;
/// let model = copilot.chat("gpt-4.1");
/// let resp = model
///     .post_json("/chat/completions", &serde_json::json!({
///         "model": model.model_id().as_str(),
///         "messages": [{"role": "user", "content": "Hello"}]
///     }))
///     .await?;
/// println!("{}", resp.status());
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct CopilotProvider {
    base_url: String,
    fetch: Arc<CopilotFetch>,
}

/// Builds a provider from `settings`.
pub fn create_copilot(settings: CopilotSettings) -> Result<CopilotProvider, AuthError> {
    CopilotProvider::new(settings)
}

impl CopilotProvider {
    pub fn new(settings: CopilotSettings) -> Result<Self, AuthError> {
        let endpoints = settings.endpoints();
        let client = reqwest::Client::new();
        let auth = GitHubCopilotAuth::new(endpoints.clone()).with_client(client.clone());
        let source = match &settings.token_source {
            Some(get_tokens) => TokenSource::Callback(get_tokens.clone()),
            None => TokenSource::Store(Arc::new(FileCredentialStore::new(
                settings.store_paths(),
            ))),
        };
        let mut manager = TokenManager::new(auth, source);
        if let Some(hook) = &settings.on_token_refresh {
            manager = manager.with_refresh_hook(hook.clone());
        }
        let fetch = CopilotFetch::new(client, Arc::new(manager), &settings.headers)?;
        Ok(Self {
            base_url: endpoints.api_base_url.trim_end_matches('/').to_string(),
            fetch: Arc::new(fetch),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn token_manager(&self) -> &TokenManager {
        self.fetch.token_manager()
    }

    pub fn language_model(&self, model_id: impl Into<CopilotModelId>) -> CopilotModel {
        CopilotModel {
            model_id: model_id.into(),
            base_url: self.base_url.clone(),
            fetch: self.fetch.clone(),
        }
    }

    pub fn chat(&self, model_id: impl Into<CopilotModelId>) -> CopilotModel {
        self.language_model(model_id)
    }
}

/// A Copilot-hosted model bound to the provider's authenticated fetch.
#[derive(Clone)]
pub struct CopilotModel {
    model_id: CopilotModelId,
    base_url: String,
    fetch: Arc<CopilotFetch>,
}

impl CopilotModel {
    pub fn model_id(&self) -> &CopilotModelId {
        &self.model_id
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    /// Sends an arbitrary request through the interceptor.
    pub async fn send(&self, request: reqwest::Request) -> Result<reqwest::Response, AuthError> {
        self.fetch.execute(request).await
    }

    /// POSTs `body` as JSON to `path` under the API base URL.
    pub async fn post_json<T: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &T,
    ) -> Result<reqwest::Response, AuthError> {
        let request = self.fetch.client().post(self.url(path)).json(body).build()?;
        self.send(request).await
    }
}
