//! GitHub Copilot authentication.
//!
//! Logs in with the OAuth device-code flow, keeps the long-lived GitHub token
//! in a credential store, and exchanges it for short-lived Copilot tokens that
//! are cached and refreshed before every outbound request.
//!
//! # Quick Start
//!
//! ```no_run
//! use copilot_auth::prelude::*;
//!
//! # async fn example() -> Result<(), AuthError> {
//! let copilot = create_copilot(CopilotSettings::default())?;
//! let model = copilot.chat("gpt-4o");
//! let resp = model
//!     .post_json("/chat/completions", &serde_json::json!({
//!         "model": "gpt-4o",
//!         "messages": [{"role": "user", "content": "Hello!"}]
//!     }))
//!     .await?;
//! println!("{}", resp.status());
//! # Ok(())
//! # }
//! ```

pub mod auth;
pub mod config;
pub mod models;
pub mod prelude;
pub mod provider;

#[cfg(feature = "cli")]
pub mod cli;
