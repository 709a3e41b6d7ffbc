use chrono::Utc;
use serde::{Deserialize, Serialize};

/// Lead time before expiry at which a Copilot token stops being handed out.
pub const SAFETY_MARGIN_SECS: i64 = 60;

/// Current wall-clock time in epoch seconds.
pub fn now_epoch_secs() -> i64 {
    Utc::now().timestamp()
}

/// Short-lived Copilot access token with its absolute expiry.
///
/// # Example
/// ```
/// use copilot_auth::auth::AccessToken;
///
/// let token = AccessToken::new("tid=abc;exp=123", 1_000);
/// assert!(token.is_valid_at(939));
/// assert!(!token.is_valid_at(940));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessToken {
    pub token: String,
    /// Epoch seconds.
    pub expires_at: i64,
}

impl AccessToken {
    pub fn new(token: impl Into<String>, expires_at: i64) -> Self {
        Self {
            token: token.into(),
            expires_at,
        }
    }

    /// True iff `now < expires_at - SAFETY_MARGIN_SECS`.
    pub fn is_valid_at(&self, now: i64) -> bool {
        now < self.expires_at - SAFETY_MARGIN_SECS
    }

    pub fn is_valid(&self) -> bool {
        self.is_valid_at(now_epoch_secs())
    }
}

/// Credential snapshot yielded by a token source and passed to refresh hooks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CopilotTokens {
    pub github_token: String,
    pub access_token: Option<String>,
    pub expires_at: Option<i64>,
}

impl CopilotTokens {
    /// Snapshot carrying only the long-lived GitHub token.
    pub fn github(github_token: impl Into<String>) -> Self {
        Self {
            github_token: github_token.into(),
            access_token: None,
            expires_at: None,
        }
    }

    pub fn with_access_token(mut self, token: &AccessToken) -> Self {
        self.access_token = Some(token.token.clone());
        self.expires_at = Some(token.expires_at);
        self
    }

    /// The bundled Copilot token, if present and still usable at `now`.
    pub fn valid_access_token(&self, now: i64) -> Option<AccessToken> {
        let token = self.access_token.as_deref().filter(|t| !t.is_empty())?;
        let expires_at = self.expires_at?;
        let candidate = AccessToken::new(token, expires_at);
        candidate.is_valid_at(now).then_some(candidate)
    }
}
