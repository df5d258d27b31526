//! Small persisted state between runs: the last-entered access token and the
//! display theme. Nothing else is kept on disk.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

const STORE_DIR: &str = "gh-version-compare";
const STORE_FILE: &str = "state.toml";

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Could not determine the user config directory")]
    NoConfigDir,

    #[error("Failed to access local store: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse local store: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Failed to serialize local store: {0}")]
    Serialize(#[from] toml::ser::Error),
}

/// Terminal palette preference.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Dark,
    Light,
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct StoredState {
    #[serde(skip_serializing_if = "Option::is_none")]
    github_token: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    theme: Option<Theme>,
}

pub struct LocalStore {
    path: PathBuf,
}

impl LocalStore {
    /// Store under the platform config directory.
    pub fn open_default() -> Result<Self, StoreError> {
        let dir = dirs::config_dir().ok_or(StoreError::NoConfigDir)?;
        Ok(Self::at(dir.join(STORE_DIR).join(STORE_FILE)))
    }

    pub fn at(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn token(&self) -> Result<Option<String>, StoreError> {
        Ok(self.read()?.github_token)
    }

    /// Save a token. An empty token removes the stored one.
    pub fn set_token(&self, token: &str) -> Result<(), StoreError> {
        let mut state = self.read()?;
        state.github_token = Some(token.to_string()).filter(|t| !t.is_empty());
        self.write(&state)
    }

    pub fn clear_token(&self) -> Result<(), StoreError> {
        self.set_token("")
    }

    pub fn theme(&self) -> Result<Theme, StoreError> {
        Ok(self.read()?.theme.unwrap_or_default())
    }

    pub fn set_theme(&self, theme: Theme) -> Result<(), StoreError> {
        let mut state = self.read()?;
        state.theme = Some(theme);
        self.write(&state)
    }

    fn read(&self) -> Result<StoredState, StoreError> {
        if !self.path.exists() {
            return Ok(StoredState::default());
        }
        let contents = fs::read_to_string(&self.path)?;
        Ok(toml::from_str(&contents)?)
    }

    fn write(&self, state: &StoredState) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&self.path, toml::to_string(state)?)?;
        restrict_permissions(&self.path)?;
        debug!(path = %self.path.display(), "wrote local store");
        Ok(())
    }
}

#[cfg(unix)]
fn restrict_permissions(path: &Path) -> std::io::Result<()> {
    use std::os::unix::fs::PermissionsExt;
    fs::set_permissions(path, fs::Permissions::from_mode(0o600))
}

#[cfg(not(unix))]
fn restrict_permissions(_path: &Path) -> std::io::Result<()> {
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_store() -> (tempfile::TempDir, LocalStore) {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalStore::at(dir.path().join("nested").join(STORE_FILE));
        (dir, store)
    }

    #[test]
    fn test_missing_store_is_empty() {
        let (_dir, store) = temp_store();
        assert!(store.token().unwrap().is_none());
        assert_eq!(store.theme().unwrap(), Theme::Dark);
        assert!(!store.path().exists());
    }

    #[test]
    fn test_token_lifecycle() {
        let (_dir, store) = temp_store();
        store.set_token("ghp_first").unwrap();
        assert_eq!(store.token().unwrap().as_deref(), Some("ghp_first"));

        store.set_token("ghp_second").unwrap();
        assert_eq!(store.token().unwrap().as_deref(), Some("ghp_second"));

        store.clear_token().unwrap();
        assert!(store.token().unwrap().is_none());
    }

    #[test]
    fn test_empty_token_removes_entry() {
        let (_dir, store) = temp_store();
        store.set_token("ghp_abc").unwrap();
        store.set_token("").unwrap();
        assert!(store.token().unwrap().is_none());
    }

    #[test]
    fn test_theme_does_not_touch_token() {
        let (_dir, store) = temp_store();
        store.set_token("ghp_abc").unwrap();
        store.set_theme(Theme::Light).unwrap();
        assert_eq!(store.theme().unwrap(), Theme::Light);
        assert_eq!(store.token().unwrap().as_deref(), Some("ghp_abc"));
    }

    #[cfg(unix)]
    #[test]
    fn test_store_file_is_private() {
        use std::os::unix::fs::PermissionsExt;
        let (_dir, store) = temp_store();
        store.set_token("ghp_abc").unwrap();
        let mode = fs::metadata(store.path()).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
    }

    #[test]
    fn test_corrupt_store_reports_parse_error() {
        let (_dir, store) = temp_store();
        fs::create_dir_all(store.path().parent().unwrap()).unwrap();
        fs::write(store.path(), "github_token = [").unwrap();
        assert!(matches!(store.token(), Err(StoreError::Parse(_))));
    }
}
