use std::sync::Arc;
use std::time::Duration;

use reqwest::header::{ACCEPT, AUTHORIZATION};
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use tokio::time::Instant;

use crate::auth::device_code::{
    DeviceCodePoll, DeviceCodeSession, PollDelay, TokioDelay, SLOW_DOWN_STEP_SECS,
};
use crate::auth::error::AuthError;
use crate::auth::token::AccessToken;
use crate::config::{Endpoints, CLIENT_HEADERS, CLIENT_ID, DEVICE_CODE_GRANT_TYPE, DEVICE_SCOPE};

/// Device-code login and Copilot token exchange against GitHub.
///
/// # Example
/// ```no_run
/// use copilot_auth::auth::providers::github_copilot::GitHubCopilotAuth;
/// use copilot_auth::config::Endpoints;
///
/// # async fn run() -> Result<(), copilot_auth::auth::AuthError> {
/// let auth = GitHubCopilotAuth::new(Endpoints::github());
/// let session = auth.request_device_code().await?;
/// println!("Visit {} and enter {}", session.verification_uri, session.user_code);
/// let github_token = auth
///     .poll_for_credential(&session.device_code, session.interval, session.expires_in)
///     .await?;
/// let copilot = auth.exchange_copilot_token(&github_token).await?;
/// println!("token valid until {}", copilot.expires_at);
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct GitHubCopilotAuth {
    client: reqwest::Client,
    endpoints: Endpoints,
    delay: Arc<dyn PollDelay>,
}

impl GitHubCopilotAuth {
    pub fn new(endpoints: Endpoints) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoints,
            delay: Arc::new(TokioDelay),
        }
    }

    pub fn with_client(mut self, client: reqwest::Client) -> Self {
        self.client = client;
        self
    }

    pub fn with_delay(mut self, delay: Arc<dyn PollDelay>) -> Self {
        self.delay = delay;
        self
    }

    pub fn endpoints(&self) -> &Endpoints {
        &self.endpoints
    }

    /// Starts a device authorization session.
    pub async fn request_device_code(&self) -> Result<DeviceCodeSession, AuthError> {
        let resp = self
            .client
            .post(&self.endpoints.device_code_url)
            .header(ACCEPT, "application/json")
            .json(&DeviceCodeRequest {
                client_id: CLIENT_ID,
                scope: DEVICE_SCOPE,
            })
            .send()
            .await?;
        if !resp.status().is_success() {
            return Err(AuthError::from_status(resp.status()));
        }
        let session: DeviceCodeSession = resp.json().await?;
        tracing::debug!(
            verification_uri = %session.verification_uri,
            interval = session.interval,
            expires_in = session.expires_in,
            "device code issued"
        );
        Ok(session)
    }

    /// Issues one access-token request for `device_code`.
    pub async fn poll_device_code(&self, device_code: &str) -> Result<DeviceCodePoll, AuthError> {
        let resp = self
            .client
            .post(&self.endpoints.access_token_url)
            .header(ACCEPT, "application/json")
            .json(&DeviceTokenRequest {
                client_id: CLIENT_ID,
                device_code,
                grant_type: DEVICE_CODE_GRANT_TYPE,
            })
            .send()
            .await?;
        let status = resp.status();
        if !status.is_success() {
            return Err(AuthError::from_status(status));
        }
        let payload: DeviceTokenResponse = resp.json().await?;
        if let Some(access_token) = payload.access_token.filter(|t| !t.is_empty()) {
            return Ok(DeviceCodePoll::Authorized { access_token });
        }
        match payload.error.as_deref() {
            Some("authorization_pending") => Ok(DeviceCodePoll::Pending),
            Some("slow_down") => Ok(DeviceCodePoll::SlowDown),
            Some("expired_token") => Ok(DeviceCodePoll::Expired),
            Some("access_denied") => Ok(DeviceCodePoll::Denied),
            Some(other) => Err(AuthError::AuthServer {
                status: status.as_u16(),
                message: payload
                    .error_description
                    .unwrap_or_else(|| other.to_string()),
            }),
            None => Err(AuthError::InvalidResponse(
                "device token response missing token and error".to_string(),
            )),
        }
    }

    /// Polls until the user approves, denies, or the device code expires.
    ///
    /// Each iteration waits `interval` seconds and then issues exactly one
    /// request. `slow_down` permanently adds five seconds to the interval.
    pub async fn poll_for_credential(
        &self,
        device_code: &str,
        interval: u64,
        expires_in: u64,
    ) -> Result<String, AuthError> {
        // Lifetimes past the clock's range never expire locally.
        let deadline = Instant::now().checked_add(Duration::from_secs(expires_in));
        let mut interval_secs = interval;
        let mut attempts = 0u32;

        while deadline.map_or(true, |deadline| Instant::now() < deadline) {
            self.delay.wait(Duration::from_secs(interval_secs)).await;
            attempts += 1;
            match self.poll_device_code(device_code).await? {
                DeviceCodePoll::Authorized { access_token } => {
                    tracing::info!(attempts, "device authorization approved");
                    return Ok(access_token);
                }
                DeviceCodePoll::Pending => {
                    tracing::debug!(attempts, "authorization pending");
                }
                DeviceCodePoll::SlowDown => {
                    interval_secs += SLOW_DOWN_STEP_SECS;
                    tracing::debug!(attempts, interval_secs, "server asked to slow down");
                }
                DeviceCodePoll::Expired => return Err(AuthError::DeviceCodeExpired),
                DeviceCodePoll::Denied => return Err(AuthError::AccessDenied),
            }
        }

        tracing::warn!(attempts, "device code deadline reached");
        Err(AuthError::DeviceCodeExpired)
    }

    /// Exchanges the long-lived GitHub token for a short-lived Copilot token.
    ///
    /// No retries: a 401 means the GitHub token itself is no longer accepted.
    pub async fn exchange_copilot_token(&self, github_token: &str) -> Result<AccessToken, AuthError> {
        let mut request = self
            .client
            .get(&self.endpoints.token_exchange_url)
            .header(ACCEPT, "application/json")
            .header(AUTHORIZATION, format!("Bearer {github_token}"));
        for (name, value) in CLIENT_HEADERS {
            request = request.header(name, value);
        }
        let resp = request.send().await?;
        if resp.status() == StatusCode::UNAUTHORIZED {
            return Err(AuthError::InvalidCredential);
        }
        if !resp.status().is_success() {
            return Err(AuthError::from_status(resp.status()));
        }
        let payload: CopilotTokenResponse = resp.json().await?;
        let expires_at = parse_expires_at(&payload.expires_at)?;
        tracing::debug!(expires_at, "copilot token exchanged");
        Ok(AccessToken::new(payload.token, expires_at))
    }
}

#[derive(Debug, Serialize)]
struct DeviceCodeRequest<'a> {
    client_id: &'a str,
    scope: &'a str,
}

#[derive(Debug, Serialize)]
struct DeviceTokenRequest<'a> {
    client_id: &'a str,
    device_code: &'a str,
    grant_type: &'a str,
}

#[derive(Debug, Deserialize)]
struct DeviceTokenResponse {
    access_token: Option<String>,
    error: Option<String>,
    error_description: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CopilotTokenResponse {
    token: String,
    expires_at: serde_json::Value,
}

/// Epoch seconds from a number or numeric string; millisecond values are scaled down.
fn parse_expires_at(value: &serde_json::Value) -> Result<i64, AuthError> {
    let raw = match value {
        serde_json::Value::Number(num) => {
            num.as_i64().or_else(|| num.as_f64().map(|secs| secs as i64))
        }
        serde_json::Value::String(text) => Some(text.trim().parse::<i64>().map_err(|_| {
            AuthError::InvalidResponse("copilot token expires_at invalid".to_string())
        })?),
        _ => None,
    }
    .ok_or_else(|| AuthError::InvalidResponse("copilot token expires_at missing".to_string()))?;
    Ok(if raw > 10_000_000_000 { raw / 1000 } else { raw })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn expires_at_accepts_seconds_strings_and_millis() {
        assert_eq!(parse_expires_at(&json!(1_900_000_000)).unwrap(), 1_900_000_000);
        assert_eq!(parse_expires_at(&json!("1900000000")).unwrap(), 1_900_000_000);
        assert_eq!(
            parse_expires_at(&json!(1_900_000_000_500i64)).unwrap(),
            1_900_000_000
        );
    }

    #[test]
    fn expires_at_accepts_float_seconds() {
        assert_eq!(parse_expires_at(&json!(1.9e9)).unwrap(), 1_900_000_000);
        assert_eq!(parse_expires_at(&json!(1_900_000_000.75)).unwrap(), 1_900_000_000);
    }

    #[test]
    fn expires_at_rejects_other_shapes() {
        assert!(matches!(
            parse_expires_at(&json!({"bad": "shape"})),
            Err(AuthError::InvalidResponse(msg)) if msg.contains("missing")
        ));
        assert!(matches!(
            parse_expires_at(&json!("soon")),
            Err(AuthError::InvalidResponse(msg)) if msg.contains("invalid")
        ));
    }
}
