//! Durable state on the local filesystem: the session token, the settings
//! document, and exported files. In-memory variants back tests and offline mode.

use async_trait::async_trait;
use std::collections::HashMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::RwLock;
use tracing::{debug, info};

use crate::domain::{DomainError, SiteSettings};
use crate::ports::{CredentialStore, FileSink, SettingsRepository};

fn storage_error(path: &Path, e: impl std::fmt::Display) -> DomainError {
    DomainError::Storage(format!("{}: {}", path.display(), e))
}

/// Session token kept in a single file.
pub struct FileCredentialStore {
    path: PathBuf,
}

impl FileCredentialStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl CredentialStore for FileCredentialStore {
    fn load(&self) -> Result<Option<String>, DomainError> {
        match std::fs::read_to_string(&self.path) {
            Ok(contents) => {
                let token = contents.trim();
                Ok((!token.is_empty()).then(|| token.to_string()))
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(storage_error(&self.path, e)),
        }
    }

    fn save(&self, token: &str) -> Result<(), DomainError> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| storage_error(parent, e))?;
        }
        std::fs::write(&self.path, token).map_err(|e| storage_error(&self.path, e))?;
        debug!(path = %self.path.display(), "Token saved");
        Ok(())
    }

    fn clear(&self) -> Result<(), DomainError> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(storage_error(&self.path, e)),
        }
    }
}

#[derive(Default)]
pub struct MemoryCredentialStore {
    token: RwLock<Option<String>>,
}

impl CredentialStore for MemoryCredentialStore {
    fn load(&self) -> Result<Option<String>, DomainError> {
        Ok(self.token.read().unwrap_or_else(|e| e.into_inner()).clone())
    }

    fn save(&self, token: &str) -> Result<(), DomainError> {
        *self.token.write().unwrap_or_else(|e| e.into_inner()) = Some(token.to_string());
        Ok(())
    }

    fn clear(&self) -> Result<(), DomainError> {
        *self.token.write().unwrap_or_else(|e| e.into_inner()) = None;
        Ok(())
    }
}

/// Settings document stored as pretty-printed JSON.
pub struct JsonSettingsRepository {
    path: PathBuf,
}

impl JsonSettingsRepository {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }
}

#[async_trait]
impl SettingsRepository for JsonSettingsRepository {
    async fn load(&self) -> Result<Option<SiteSettings>, DomainError> {
        let bytes = match tokio::fs::read(&self.path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(storage_error(&self.path, e)),
        };
        serde_json::from_slice(&bytes)
            .map(Some)
            .map_err(|e| DomainError::Decode(format!("{}: {}", self.path.display(), e)))
    }

    async fn save(&self, settings: &SiteSettings) -> Result<(), DomainError> {
        let body = serde_json::to_vec_pretty(settings)
            .map_err(|e| DomainError::Storage(e.to_string()))?;
        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| storage_error(parent, e))?;
        }
        tokio::fs::write(&self.path, body)
            .await
            .map_err(|e| storage_error(&self.path, e))?;
        debug!(path = %self.path.display(), "Settings saved");
        Ok(())
    }
}

#[derive(Default)]
pub struct MemorySettingsRepository {
    saved: RwLock<Option<SiteSettings>>,
}

#[async_trait]
impl SettingsRepository for MemorySettingsRepository {
    async fn load(&self) -> Result<Option<SiteSettings>, DomainError> {
        Ok(self.saved.read().unwrap_or_else(|e| e.into_inner()).clone())
    }

    async fn save(&self, settings: &SiteSettings) -> Result<(), DomainError> {
        *self.saved.write().unwrap_or_else(|e| e.into_inner()) = Some(settings.clone());
        Ok(())
    }
}

/// Writes exports into one directory.
pub struct DirectorySink {
    root: PathBuf,
}

impl DirectorySink {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

#[async_trait]
impl FileSink for DirectorySink {
    async fn save(&self, file_name: &str, bytes: &[u8]) -> Result<PathBuf, DomainError> {
        let name = Path::new(file_name)
            .file_name()
            .ok_or_else(|| DomainError::Export(format!("invalid file name: {}", file_name)))?;
        let path = self.root.join(name);

        tokio::fs::create_dir_all(&self.root)
            .await
            .map_err(|e| storage_error(&self.root, e))?;
        tokio::fs::write(&path, bytes)
            .await
            .map_err(|e| storage_error(&path, e))?;
        info!(path = %path.display(), bytes = bytes.len(), "Export written");
        Ok(path)
    }
}

/// Keeps exported files in memory, keyed by name.
#[derive(Default)]
pub struct MemorySink {
    files: RwLock<HashMap<String, Vec<u8>>>,
}

impl MemorySink {
    pub fn file(&self, name: &str) -> Option<Vec<u8>> {
        self.files
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .get(name)
            .cloned()
    }
}

#[async_trait]
impl FileSink for MemorySink {
    async fn save(&self, file_name: &str, bytes: &[u8]) -> Result<PathBuf, DomainError> {
        self.files
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .insert(file_name.to_string(), bytes.to_vec());
        Ok(PathBuf::from(file_name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_credentials_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileCredentialStore::new(dir.path().join("nested").join("token"));

        assert_eq!(store.load().unwrap(), None);
        store.save("abc123").unwrap();
        assert_eq!(store.load().unwrap(), Some("abc123".to_string()));
        store.clear().unwrap();
        assert_eq!(store.load().unwrap(), None);
        store.clear().unwrap();
    }

    #[tokio::test]
    async fn test_settings_missing_file_is_none() {
        let dir = tempfile::tempdir().unwrap();
        let repo = JsonSettingsRepository::new(dir.path().join("settings.json"));
        assert_eq!(repo.load().await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_directory_sink_strips_directories() {
        let dir = tempfile::tempdir().unwrap();
        let sink = DirectorySink::new(dir.path().join("exports"));

        let path = sink.save("../locations.csv", b"Name\n").await.unwrap();
        assert_eq!(path, dir.path().join("exports").join("locations.csv"));
        assert_eq!(std::fs::read(&path).unwrap(), b"Name\n");
    }
}
