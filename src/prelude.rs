//! Convenience re-exports for common use.

pub use crate::auth::{
    AccessToken, AuthError, AuthService, CopilotTokens, CredentialStore, FileCredentialStore,
    StoredAuth, TokenManager, TokenSource,
};
pub use crate::config::{CopilotSettings, Endpoints, StorePaths};
pub use crate::models::CopilotModelId;
pub use crate::provider::{create_copilot, CopilotModel, CopilotProvider};
