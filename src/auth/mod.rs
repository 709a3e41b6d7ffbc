//! OAuth device-code login, credential storage and Copilot token lifecycle.

pub mod device_code;
pub mod error;
pub mod manager;
pub mod providers;
pub mod service;
pub mod store;
pub mod token;

pub use device_code::{DeviceCodePoll, DeviceCodeSession, PollDelay, TokioDelay};
pub use error::AuthError;
pub use manager::{GetTokensFn, TokenManager, TokenRefreshFn, TokenSource};
pub use service::AuthService;
pub use store::{CredentialStore, FileCredentialStore, StoredAuth};
pub use token::{AccessToken, CopilotTokens, SAFETY_MARGIN_SECS};
