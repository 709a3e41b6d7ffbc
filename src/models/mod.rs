//! Model identifiers served through Copilot.

pub mod anthropic;
pub mod google;
pub mod openai;

use std::fmt;

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

pub use anthropic::AnthropicModel;
pub use google::GoogleModel;
pub use openai::OpenAiModel;

/// Vendor family of a Copilot-hosted model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString)]
#[strum(serialize_all = "lowercase")]
pub enum ModelFamily {
    OpenAi,
    Anthropic,
    Google,
}

/// Model id as sent to the Copilot API. Unknown ids are passed through.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CopilotModelId(String);

impl CopilotModelId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Family of a catalogued model, `None` for ids outside the catalogue.
    pub fn family(&self) -> Option<ModelFamily> {
        let id = self.as_str();
        if id.parse::<OpenAiModel>().is_ok_and(|m| !m.is_custom()) {
            Some(ModelFamily::OpenAi)
        } else if id.parse::<AnthropicModel>().is_ok_and(|m| !m.is_custom()) {
            Some(ModelFamily::Anthropic)
        } else if id.parse::<GoogleModel>().is_ok_and(|m| !m.is_custom()) {
            Some(ModelFamily::Google)
        } else {
            None
        }
    }

    pub fn is_known(&self) -> bool {
        self.family().is_some()
    }
}

impl fmt::Display for CopilotModelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for CopilotModelId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for CopilotModelId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl From<OpenAiModel> for CopilotModelId {
    fn from(model: OpenAiModel) -> Self {
        Self::new(model.as_str())
    }
}

impl From<AnthropicModel> for CopilotModelId {
    fn from(model: AnthropicModel) -> Self {
        Self::new(model.as_str())
    }
}

impl From<GoogleModel> for CopilotModelId {
    fn from(model: GoogleModel) -> Self {
        Self::new(model.as_str())
    }
}
