//! Endpoints, fixed client identity and provider settings.

use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};

use bon::Builder;

use crate::auth::manager::{GetTokensFn, TokenRefreshFn};

pub const CLIENT_ID: &str = "Iv1.b507a08c87ecfe98";
pub const DEVICE_SCOPE: &str = "read:user";
pub const DEVICE_CODE_GRANT_TYPE: &str = "urn:ietf:params:oauth:grant-type:device_code";

const DEFAULT_DEVICE_CODE_URL: &str = "https://github.com/login/device/code";
const DEFAULT_ACCESS_TOKEN_URL: &str = "https://github.com/login/oauth/access_token";
const DEFAULT_TOKEN_EXCHANGE_URL: &str = "https://api.github.com/copilot_internal/v2/token";
const DEFAULT_API_BASE_URL: &str = "https://api.githubcopilot.com";

// The authorization server allow-lists these exact values.
pub const COPILOT_USER_AGENT: &str = "GitHubCopilotChat/0.32.4";
pub const COPILOT_EDITOR_VERSION: &str = "vscode/1.105.1";
pub const COPILOT_EDITOR_PLUGIN_VERSION: &str = "copilot-chat/0.32.4";
pub const COPILOT_INTEGRATION_ID: &str = "vscode-chat";
pub const COPILOT_OPENAI_INTENT: &str = "conversation-edits";

/// Headers identifying the client on token exchange calls.
pub const CLIENT_HEADERS: [(&str, &str); 3] = [
    ("User-Agent", COPILOT_USER_AGENT),
    ("Editor-Version", COPILOT_EDITOR_VERSION),
    ("Editor-Plugin-Version", COPILOT_EDITOR_PLUGIN_VERSION),
];

/// Headers added on top of [`CLIENT_HEADERS`] for outbound model requests.
pub const OUTBOUND_HEADERS: [(&str, &str); 2] = [
    ("Copilot-Integration-Id", COPILOT_INTEGRATION_ID),
    ("Openai-Intent", COPILOT_OPENAI_INTENT),
];

/// URLs of the authorization server and the Copilot API.
///
/// # Example
/// ```
/// use copilot_auth::config::Endpoints;
///
/// let endpoints = Endpoints::resolve(Some("https://ghe.example.com/"));
/// assert_eq!(endpoints.device_code_url, "https://ghe.example.com/login/device/code");
/// assert_eq!(endpoints.api_base_url, "https://ghe.example.com/api/copilot");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoints {
    pub device_code_url: String,
    pub access_token_url: String,
    pub token_exchange_url: String,
    pub api_base_url: String,
}

impl Default for Endpoints {
    fn default() -> Self {
        Self::github()
    }
}

impl Endpoints {
    /// Public github.com endpoints.
    pub fn github() -> Self {
        Self {
            device_code_url: DEFAULT_DEVICE_CODE_URL.to_string(),
            access_token_url: DEFAULT_ACCESS_TOKEN_URL.to_string(),
            token_exchange_url: DEFAULT_TOKEN_EXCHANGE_URL.to_string(),
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
        }
    }

    /// Endpoints of a GitHub Enterprise installation rooted at `base_url`.
    pub fn enterprise(base_url: &str) -> Self {
        let base = base_url.trim_end_matches('/');
        Self {
            device_code_url: format!("{base}/login/device/code"),
            access_token_url: format!("{base}/login/oauth/access_token"),
            token_exchange_url: format!("{base}/api/v3/copilot_internal/v2/token"),
            api_base_url: format!("{base}/api/copilot"),
        }
    }

    pub fn resolve(enterprise_url: Option<&str>) -> Self {
        match enterprise_url.map(str::trim).filter(|url| !url.is_empty()) {
            Some(base) => Self::enterprise(base),
            None => Self::github(),
        }
    }

    pub fn with_device_code_url(mut self, url: impl Into<String>) -> Self {
        self.device_code_url = url.into();
        self
    }

    pub fn with_access_token_url(mut self, url: impl Into<String>) -> Self {
        self.access_token_url = url.into();
        self
    }

    pub fn with_token_exchange_url(mut self, url: impl Into<String>) -> Self {
        self.token_exchange_url = url.into();
        self
    }

    pub fn with_api_base_url(mut self, url: impl Into<String>) -> Self {
        self.api_base_url = url.into();
        self
    }
}

/// Resolved locations of the credential files.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorePaths {
    /// File owned and written by this crate.
    pub auth_file: PathBuf,
    /// Companion-tool files imported read-only, first existing one wins.
    pub companion_files: Vec<PathBuf>,
}

impl StorePaths {
    /// `base_dir/auth.json` with no companion import.
    pub fn in_dir(base_dir: impl AsRef<Path>) -> Self {
        Self {
            auth_file: base_dir.as_ref().join("auth.json"),
            companion_files: Vec::new(),
        }
    }

    pub fn with_companion(mut self, path: impl Into<PathBuf>) -> Self {
        self.companion_files.push(path.into());
        self
    }

    /// Locations under the user's home directory.
    pub fn discover() -> Self {
        let home = user_home_dir();
        let data_home = std::env::var_os("XDG_DATA_HOME")
            .filter(|value| !value.is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(|| home.join(".local").join("share"));
        Self {
            auth_file: home.join(".ai-sdk-copilot").join("auth.json"),
            companion_files: vec![
                data_home.join("opencode").join("auth.json"),
                home.join(".opencode").join("auth.json"),
            ],
        }
    }
}

fn user_home_dir() -> PathBuf {
    directories::UserDirs::new()
        .map(|dirs| dirs.home_dir().to_path_buf())
        .unwrap_or_else(|| PathBuf::from("."))
}

/// Settings for a Copilot provider instance.
///
/// `CopilotSettings::default()` describes the implicit default provider:
/// github.com endpoints, credentials from the discovered store.
///
/// # Example
/// ```
/// use copilot_auth::config::CopilotSettings;
///
/// let settings = CopilotSettings::builder()
///     .enterprise_url("https://ghe.example.com")
///     .build();
/// assert_eq!(settings.endpoints().api_base_url, "https://ghe.example.com/api/copilot");
/// ```
#[derive(Clone, Default, Builder)]
pub struct CopilotSettings {
    #[builder(into)]
    pub enterprise_url: Option<String>,
    /// Extra headers for outbound requests. `Authorization` is ignored.
    #[builder(default)]
    pub headers: BTreeMap<String, String>,
    /// Caller-supplied credential source; the credential store is used when unset.
    pub token_source: Option<GetTokensFn>,
    /// Invoked with every freshly exchanged Copilot token.
    pub on_token_refresh: Option<TokenRefreshFn>,
    pub store_paths: Option<StorePaths>,
    /// Overrides the endpoints derived from `enterprise_url`.
    pub endpoints: Option<Endpoints>,
}

impl fmt::Debug for CopilotSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CopilotSettings")
            .field("enterprise_url", &self.enterprise_url)
            .field("headers", &self.headers.keys().collect::<Vec<_>>())
            .field("token_source", &self.token_source.as_ref().map(|_| ".."))
            .field(
                "on_token_refresh",
                &self.on_token_refresh.as_ref().map(|_| ".."),
            )
            .field("store_paths", &self.store_paths)
            .field("endpoints", &self.endpoints)
            .finish()
    }
}

impl CopilotSettings {
    /// Settings from `COPILOT_ENTERPRISE_URL` and `COPILOT_AUTH_DIR` (a `.env` file is honored).
    pub fn from_env() -> Self {
        let _ = dotenvy::dotenv();
        let mut settings = Self::default();
        if let Ok(url) = std::env::var("COPILOT_ENTERPRISE_URL") {
            if !url.trim().is_empty() {
                settings.enterprise_url = Some(url);
            }
        }
        if let Some(dir) = std::env::var_os("COPILOT_AUTH_DIR").filter(|v| !v.is_empty()) {
            settings.store_paths = Some(StorePaths::in_dir(PathBuf::from(dir)));
        }
        settings
    }

    pub fn endpoints(&self) -> Endpoints {
        self.endpoints
            .clone()
            .unwrap_or_else(|| Endpoints::resolve(self.enterprise_url.as_deref()))
    }

    pub fn store_paths(&self) -> StorePaths {
        self.store_paths.clone().unwrap_or_else(StorePaths::discover)
    }
}
