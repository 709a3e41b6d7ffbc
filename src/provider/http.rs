//! Outbound request interceptor stamping Copilot credentials onto requests.

use std::collections::BTreeMap;
use std::sync::Arc;

use reqwest::header::{HeaderMap, HeaderName, HeaderValue, AUTHORIZATION};

use crate::auth::{AccessToken, AuthError, TokenManager};
use crate::config::{CLIENT_HEADERS, OUTBOUND_HEADERS};

/// Parses caller headers once, dropping any `Authorization` entry.
pub fn parse_extra_headers(headers: &BTreeMap<String, String>) -> Result<HeaderMap, AuthError> {
    let mut parsed = HeaderMap::new();
    for (name, value) in headers {
        let name = HeaderName::from_bytes(name.trim().as_bytes())?;
        if name == AUTHORIZATION {
            tracing::debug!("ignoring caller-supplied Authorization header");
            continue;
        }
        parsed.insert(name, HeaderValue::from_str(value)?);
    }
    Ok(parsed)
}

/// Rewrites `headers` for a Copilot API call.
///
/// Fixed client headers are set first, caller `extra` headers override them,
/// and exactly one `Authorization: Bearer <token>` is written last.
pub fn apply_headers(
    headers: &mut HeaderMap,
    token: &AccessToken,
    extra: &HeaderMap,
) -> Result<(), AuthError> {
    headers.remove(AUTHORIZATION);
    for &(name, value) in CLIENT_HEADERS.iter().chain(OUTBOUND_HEADERS.iter()) {
        headers.insert(
            HeaderName::from_bytes(name.as_bytes())?,
            HeaderValue::from_static(value),
        );
    }
    for (name, value) in extra {
        if name == AUTHORIZATION {
            continue;
        }
        headers.insert(name.clone(), value.clone());
    }
    let mut bearer = HeaderValue::from_str(&format!("Bearer {}", token.token))?;
    bearer.set_sensitive(true);
    headers.insert(AUTHORIZATION, bearer);
    Ok(())
}

/// HTTP client that resolves a valid Copilot token before every request.
#[derive(Clone)]
pub struct CopilotFetch {
    client: reqwest::Client,
    manager: Arc<TokenManager>,
    extra_headers: HeaderMap,
}

impl CopilotFetch {
    pub fn new(
        client: reqwest::Client,
        manager: Arc<TokenManager>,
        extra_headers: &BTreeMap<String, String>,
    ) -> Result<Self, AuthError> {
        Ok(Self {
            client,
            manager,
            extra_headers: parse_extra_headers(extra_headers)?,
        })
    }

    pub fn client(&self) -> &reqwest::Client {
        &self.client
    }

    pub fn token_manager(&self) -> &Arc<TokenManager> {
        &self.manager
    }

    /// Stamps `request` with the current token and sends it.
    ///
    /// May block on a token exchange when the cached token is near expiry.
    pub async fn execute(&self, mut request: reqwest::Request) -> Result<reqwest::Response, AuthError> {
        let token = self.manager.current_token().await?;
        apply_headers(request.headers_mut(), &token, &self.extra_headers)?;
        tracing::trace!(method = %request.method(), url = %request.url(), "copilot request");
        Ok(self.client.execute(request).await?)
    }
}
