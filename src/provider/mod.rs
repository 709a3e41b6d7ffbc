//! Copilot model provider and its authenticated HTTP layer.

pub mod github_copilot;
pub mod http;

pub use github_copilot::{create_copilot, CopilotModel, CopilotProvider};
pub use http::{apply_headers, CopilotFetch};
