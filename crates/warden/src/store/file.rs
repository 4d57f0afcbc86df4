//! JSON file-backed attempt state
//!
//! Keeps the device-lock attempt counter across app restarts so killing the
//! process does not reset the lockout window. Writes go to a temp file first
//! and are renamed into place for atomicity.

use std::path::PathBuf;

use async_trait::async_trait;

use warden_core::AttemptState;

use crate::error::Result;
use crate::store::AttemptStore;

/// Attempt state persisted as a small JSON file
pub struct FileAttemptStore {
    path: PathBuf,
}

impl FileAttemptStore {
    /// Create a store at the given path; parent directories are created
    pub fn new(path: PathBuf) -> Result<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(warden_core::Error::Io)?;
        }
        Ok(Self { path })
    }

    fn write_atomic(&self, contents: &str) -> std::result::Result<(), warden_core::Error> {
        let temp_path = self.path.with_extension("json.tmp");
        std::fs::write(&temp_path, contents)?;
        std::fs::rename(&temp_path, &self.path)?;

        // Restrict to the owning user (Unix only)
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            std::fs::set_permissions(&self.path, std::fs::Permissions::from_mode(0o600))?;
        }

        Ok(())
    }
}

#[async_trait]
impl AttemptStore for FileAttemptStore {
    async fn load(&self) -> Result<AttemptState> {
        if !self.path.exists() {
            return Ok(AttemptState::default());
        }
        let contents = std::fs::read_to_string(&self.path).map_err(warden_core::Error::Io)?;
        let state = serde_json::from_str(&contents).map_err(warden_core::Error::Json)?;
        Ok(state)
    }

    async fn save(&self, state: &AttemptState) -> Result<()> {
        let contents = serde_json::to_string_pretty(state).map_err(warden_core::Error::Json)?;
        self.write_atomic(&contents)?;
        Ok(())
    }

    async fn clear(&self) -> Result<()> {
        if self.path.exists() {
            std::fs::remove_file(&self.path).map_err(warden_core::Error::Io)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[tokio::test]
    async fn test_load_defaults_when_missing() {
        let dir = tempdir().unwrap();
        let store = FileAttemptStore::new(dir.path().join("attempts.json")).unwrap();
        assert_eq!(store.load().await.unwrap(), AttemptState::default());
    }

    #[tokio::test]
    async fn test_save_and_reload() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("attempts.json");
        let store = FileAttemptStore::new(path.clone()).unwrap();

        let state = AttemptState {
            failed_attempts: 2,
            lockout_until: Some(1_700_000_000),
        };
        store.save(&state).await.unwrap();

        // A fresh store over the same path sees the persisted state
        let reopened = FileAttemptStore::new(path).unwrap();
        assert_eq!(reopened.load().await.unwrap(), state);
    }

    #[tokio::test]
    async fn test_clear_removes_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("attempts.json");
        let store = FileAttemptStore::new(path.clone()).unwrap();

        store.save(&AttemptState::default()).await.unwrap();
        assert!(path.exists());

        store.clear().await.unwrap();
        assert!(!path.exists());
        assert_eq!(store.load().await.unwrap(), AttemptState::default());
    }
}
