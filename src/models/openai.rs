//! OpenAI models served through Copilot.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// OpenAI models.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash, Display, EnumString)]
pub enum OpenAiModel {
    #[strum(serialize = "o1")]
    O1,
    #[strum(serialize = "o1-2024-12-17")]
    O1Snapshot20241217,
    #[strum(serialize = "o3")]
    O3,
    #[strum(serialize = "o3-2025-04-16")]
    O3Snapshot20250416,
    #[strum(serialize = "o3-mini")]
    O3Mini,
    #[strum(serialize = "o3-mini-2025-01-31")]
    O3Mini20250131,
    #[strum(serialize = "gpt-4o")]
    Gpt4o,
    #[strum(serialize = "gpt-4o-2024-11-20")]
    Gpt4o20241120,
    #[strum(serialize = "gpt-4o-mini")]
    Gpt4oMini,
    #[strum(serialize = "gpt-4o-mini-2024-07-18")]
    Gpt4oMini20240718,
    #[strum(serialize = "gpt-4-turbo")]
    Gpt4Turbo,
    #[strum(serialize = "gpt-4.1")]
    Gpt41,
    #[strum(serialize = "gpt-4.1-mini")]
    Gpt41Mini,
    #[strum(serialize = "gpt-4.1-nano")]
    Gpt41Nano,
    #[strum(serialize = "gpt-4.5-preview")]
    Gpt45Preview,
    #[strum(serialize = "gpt-5")]
    Gpt5,
    #[strum(serialize = "gpt-5-mini")]
    Gpt5Mini,
    #[strum(serialize = "gpt-5-nano")]
    Gpt5Nano,
    #[strum(serialize = "gpt-5.1")]
    Gpt51,
    #[strum(serialize = "gpt-5.2")]
    Gpt52,
    #[strum(serialize = "gpt-5.2-pro")]
    Gpt52Pro,
    #[strum(serialize = "chatgpt-4o-latest")]
    ChatGpt4oLatest,
    /// Uncatalogued OpenAI model by ID.
    #[strum(default)]
    Custom(String),
}

impl OpenAiModel {
    /// Get the API model identifier.
    pub fn as_str(&self) -> &str {
        match self {
            Self::O1 => "o1",
            Self::O1Snapshot20241217 => "o1-2024-12-17",
            Self::O3 => "o3",
            Self::O3Snapshot20250416 => "o3-2025-04-16",
            Self::O3Mini => "o3-mini",
            Self::O3Mini20250131 => "o3-mini-2025-01-31",
            Self::Gpt4o => "gpt-4o",
            Self::Gpt4o20241120 => "gpt-4o-2024-11-20",
            Self::Gpt4oMini => "gpt-4o-mini",
            Self::Gpt4oMini20240718 => "gpt-4o-mini-2024-07-18",
            Self::Gpt4Turbo => "gpt-4-turbo",
            Self::Gpt41 => "gpt-4.1",
            Self::Gpt41Mini => "gpt-4.1-mini",
            Self::Gpt41Nano => "gpt-4.1-nano",
            Self::Gpt45Preview => "gpt-4.5-preview",
            Self::Gpt5 => "gpt-5",
            Self::Gpt5Mini => "gpt-5-mini",
            Self::Gpt5Nano => "gpt-5-nano",
            Self::Gpt51 => "gpt-5.1",
            Self::Gpt52 => "gpt-5.2",
            Self::Gpt52Pro => "gpt-5.2-pro",
            Self::ChatGpt4oLatest => "chatgpt-4o-latest",
            Self::Custom(s) => s,
        }
    }

    pub fn is_custom(&self) -> bool {
        matches!(self, Self::Custom(_))
    }
}
