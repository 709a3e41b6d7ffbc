//! Provider-specific OAuth clients.

pub mod github_copilot;
