use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;

/// Seconds added to the polling interval each time the server answers `slow_down`.
pub const SLOW_DOWN_STEP_SECS: u64 = 5;

/// Device-code session returned by the authorization server.
///
/// Lives for one login attempt and is never persisted.
///
/// # Example
/// ```
/// use copilot_auth::auth::DeviceCodeSession;
///
/// let session = DeviceCodeSession {
///     device_code: "3584d83530557fdd1f46af8289938c8ef79f9dc5".to_string(),
///     user_code: "WDJB-MJHT".to_string(),
///     verification_uri: "https://github.com/login/device".to_string(),
///     expires_in: 900,
///     interval: 5,
/// };
/// assert_eq!(session.user_code, "WDJB-MJHT");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct DeviceCodeSession {
    pub device_code: String,
    pub user_code: String,
    pub verification_uri: String,
    /// Seconds until `device_code` stops being accepted.
    pub expires_in: u64,
    /// Minimum seconds between polls.
    pub interval: u64,
}

/// Outcome of a single poll against the access-token endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeviceCodePoll {
    Pending,
    SlowDown,
    Authorized { access_token: String },
    Denied,
    Expired,
}

/// Timed wait between two polls.
#[async_trait]
pub trait PollDelay: Send + Sync {
    async fn wait(&self, interval: Duration);
}

/// [`PollDelay`] backed by `tokio::time::sleep`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioDelay;

#[async_trait]
impl PollDelay for TokioDelay {
    async fn wait(&self, interval: Duration) {
        tokio::time::sleep(interval).await;
    }
}
