//! Anthropic models served through Copilot.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash, Display, EnumString)]
pub enum AnthropicModel {
    #[strum(serialize = "claude-3-5-haiku-latest")]
    Claude35HaikuLatest,
    #[strum(serialize = "claude-3-7-sonnet-latest")]
    Claude37SonnetLatest,
    #[strum(serialize = "claude-haiku-4-5")]
    ClaudeHaiku45,
    #[strum(serialize = "claude-sonnet-4-0")]
    ClaudeSonnet40,
    #[strum(serialize = "claude-sonnet-4-20250514")]
    ClaudeSonnet4Snapshot20250514,
    #[strum(serialize = "claude-sonnet-4-5")]
    ClaudeSonnet45,
    #[strum(serialize = "claude-opus-4-0")]
    ClaudeOpus40,
    #[strum(serialize = "claude-opus-4-1")]
    ClaudeOpus41,
    #[strum(serialize = "claude-opus-4-5")]
    ClaudeOpus45,
    #[strum(default)]
    Custom(String),
}

impl AnthropicModel {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Claude35HaikuLatest => "claude-3-5-haiku-latest",
            Self::Claude37SonnetLatest => "claude-3-7-sonnet-latest",
            Self::ClaudeHaiku45 => "claude-haiku-4-5",
            Self::ClaudeSonnet40 => "claude-sonnet-4-0",
            Self::ClaudeSonnet4Snapshot20250514 => "claude-sonnet-4-20250514",
            Self::ClaudeSonnet45 => "claude-sonnet-4-5",
            Self::ClaudeOpus40 => "claude-opus-4-0",
            Self::ClaudeOpus41 => "claude-opus-4-1",
            Self::ClaudeOpus45 => "claude-opus-4-5",
            Self::Custom(s) => s,
        }
    }

    pub fn is_custom(&self) -> bool {
        matches!(self, Self::Custom(_))
    }
}
