use std::fs;
use std::io::Write;
#[cfg(unix)]
use std::os::unix::fs::{DirBuilderExt, OpenOptionsExt, PermissionsExt};
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};

use super::error::AuthError;
use crate::config::StorePaths;

/// Persisted credential record.
///
/// Serialized as `{ "githubToken", "copilotToken"?, "copilotTokenExpiresAt"?, "enterpriseUrl"? }`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredAuth {
    pub github_token: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub copilot_token: Option<String>,
    /// Epoch seconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub copilot_token_expires_at: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enterprise_url: Option<String>,
}

impl StoredAuth {
    pub fn new(github_token: impl Into<String>) -> Self {
        Self {
            github_token: github_token.into(),
            copilot_token: None,
            copilot_token_expires_at: None,
            enterprise_url: None,
        }
    }
}

/// Storage for the long-lived GitHub credential and the cached Copilot token.
pub trait CredentialStore: Send + Sync {
    /// The stored record, `None` when not authenticated.
    fn load(&self) -> Result<Option<StoredAuth>, AuthError>;
    /// The record owned by this store, ignoring any imported fallback.
    fn load_primary(&self) -> Result<Option<StoredAuth>, AuthError>;
    fn save(&self, auth: &StoredAuth) -> Result<(), AuthError>;
    /// Deletes the owned record. Missing records are not an error.
    fn clear(&self) -> Result<(), AuthError>;
    /// Whether the record owned by this store (not an imported one) exists.
    fn primary_exists(&self) -> bool;
}

/// JSON file store with a read-only fallback to companion-tool files.
///
/// # Example
/// ```no_run
/// use copilot_auth::auth::{CredentialStore, FileCredentialStore, StoredAuth};
/// use copilot_auth::config::StorePaths;
///
/// let store = FileCredentialStore::new(StorePaths::in_dir("/tmp/copilot-auth"));
/// store.save(&StoredAuth::new("ghu_example"))?;
/// assert!(store.primary_exists());
/// # Ok::<(), copilot_auth::auth::AuthError>(())
/// ```
#[derive(Debug, Clone)]
pub struct FileCredentialStore {
    paths: StorePaths,
}

impl FileCredentialStore {
    pub fn new(paths: StorePaths) -> Self {
        Self { paths }
    }

    pub fn new_default() -> Self {
        Self::new(StorePaths::discover())
    }

    pub fn auth_file(&self) -> &Path {
        &self.paths.auth_file
    }

    fn load_companion(&self) -> Result<Option<StoredAuth>, AuthError> {
        let Some(path) = self.paths.companion_files.iter().find(|p| p.exists()) else {
            return Ok(None);
        };
        let auth = import_companion_file(path)?;
        if auth.is_some() {
            tracing::debug!(path = %path.display(), "imported companion credentials");
        }
        Ok(auth)
    }
}

impl CredentialStore for FileCredentialStore {
    fn load(&self) -> Result<Option<StoredAuth>, AuthError> {
        match self.load_primary()? {
            Some(auth) => Ok(Some(auth)),
            None => self.load_companion(),
        }
    }

    fn load_primary(&self) -> Result<Option<StoredAuth>, AuthError> {
        let raw = match fs::read_to_string(&self.paths.auth_file) {
            Ok(data) => data,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(err) => return Err(AuthError::Io(err.to_string())),
        };
        Ok(Some(serde_json::from_str(&raw)?))
    }

    fn save(&self, auth: &StoredAuth) -> Result<(), AuthError> {
        let serialized = serde_json::to_vec_pretty(auth)?;
        atomic_write(&self.paths.auth_file, &serialized)
    }

    fn clear(&self) -> Result<(), AuthError> {
        match fs::remove_file(&self.paths.auth_file) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(AuthError::Io(err.to_string())),
        }
    }

    fn primary_exists(&self) -> bool {
        self.paths.auth_file.exists()
    }
}

#[derive(Debug, Deserialize)]
struct CompanionFile {
    #[serde(rename = "github-copilot")]
    github_copilot: Option<CompanionEntry>,
}

#[derive(Debug, Deserialize)]
struct CompanionEntry {
    #[serde(rename = "type")]
    kind: String,
    refresh: String,
    #[serde(default)]
    access: Option<String>,
    /// Epoch milliseconds.
    #[serde(default)]
    expires: Option<i64>,
}

/// Maps a companion-tool `auth.json` onto [`StoredAuth`]. Never writes.
pub fn import_companion_file(path: &Path) -> Result<Option<StoredAuth>, AuthError> {
    let raw = match fs::read_to_string(path) {
        Ok(data) => data,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(err) => return Err(AuthError::Io(err.to_string())),
    };
    let file: CompanionFile = serde_json::from_str(&raw)?;
    let entry = match file.github_copilot {
        Some(entry) if entry.kind == "oauth" => entry,
        _ => return Ok(None),
    };
    Ok(Some(StoredAuth {
        github_token: entry.refresh,
        copilot_token: entry.access.filter(|a| !a.is_empty()),
        copilot_token_expires_at: entry.expires.map(|ms| ms / 1000),
        enterprise_url: None,
    }))
}

fn atomic_write(path: &Path, data: &[u8]) -> Result<(), AuthError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            create_private_dir(parent)?;
        }
    }

    let file_name = path.file_name().ok_or_else(|| {
        AuthError::Io(format!("credential path {} has no file name", path.display()))
    })?;
    let nonce = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_nanos();
    let temp_path: PathBuf = path.with_file_name(format!(
        ".{}.tmp-{}-{nonce}",
        file_name.to_string_lossy(),
        std::process::id()
    ));

    let mut options = fs::OpenOptions::new();
    options.write(true).create_new(true);
    #[cfg(unix)]
    options.mode(0o600);

    let write_result = (|| -> std::io::Result<()> {
        let mut temp_file = options.open(&temp_path)?;
        temp_file.write_all(data)?;
        temp_file.sync_all()?;
        Ok(())
    })();
    if let Err(err) = write_result {
        let _ = fs::remove_file(&temp_path);
        return Err(err.into());
    }
    if let Err(err) = fs::rename(&temp_path, path) {
        let _ = fs::remove_file(&temp_path);
        return Err(err.into());
    }

    #[cfg(unix)]
    fs::set_permissions(path, fs::Permissions::from_mode(0o600))?;
    Ok(())
}

fn create_private_dir(dir: &Path) -> Result<(), AuthError> {
    if dir.exists() {
        return Ok(());
    }
    let mut builder = fs::DirBuilder::new();
    builder.recursive(true);
    #[cfg(unix)]
    builder.mode(0o700);
    builder.create(dir)?;
    Ok(())
}
