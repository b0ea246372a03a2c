//! Persistence for the Google Docs credential record

use super::credentials::CredentialRecord;
use crate::error::{FiredocsError, Result};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::sync::Mutex;

/// Storage for a single credential record
#[async_trait]
pub trait CredentialStore: Send + Sync {
    /// Load the stored record; `None` means nothing was ever stored
    async fn load(&self) -> Result<Option<CredentialRecord>>;

    /// Replace the stored record
    async fn save(&self, record: &CredentialRecord) -> Result<()>;
}

/// JSON file in a fixed per-user location
#[derive(Debug, Clone)]
pub struct FileCredentialStore {
    path: PathBuf,
}

impl FileCredentialStore {
    /// Create a store backed by `path`
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    /// Location of the record file
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

#[async_trait]
impl CredentialStore for FileCredentialStore {
    async fn load(&self) -> Result<Option<CredentialRecord>> {
        let content = match tokio::fs::read_to_string(&self.path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        serde_json::from_str(&content).map(Some).map_err(|e| {
            FiredocsError::Credential(format!(
                "stored credential at {} is unreadable: {e}",
                self.path.display()
            ))
        })
    }

    async fn save(&self, record: &CredentialRecord) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }

        // Write a sibling file and rename it so readers never see a partial record
        let temp_path = self.temp_path();
        let content = serde_json::to_vec_pretty(record)?;
        tokio::fs::write(&temp_path, content).await?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            tokio::fs::set_permissions(&temp_path, std::fs::Permissions::from_mode(0o600))
                .await?;
        }

        tokio::fs::rename(&temp_path, &self.path).await?;
        tracing::debug!("Saved credential record to {}", self.path.display());
        Ok(())
    }
}

/// In-memory store that counts writes
#[derive(Debug, Default)]
pub struct MemoryCredentialStore {
    record: Mutex<Option<CredentialRecord>>,
    saves: AtomicUsize,
}

impl MemoryCredentialStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store that already holds `record`
    pub fn with_record(record: CredentialRecord) -> Self {
        Self {
            record: Mutex::new(Some(record)),
            saves: AtomicUsize::new(0),
        }
    }

    /// Number of `save` calls so far
    pub fn save_count(&self) -> usize {
        self.saves.load(Ordering::SeqCst)
    }

    /// Current stored record
    pub async fn current(&self) -> Option<CredentialRecord> {
        self.record.lock().await.clone()
    }
}

#[async_trait]
impl CredentialStore for MemoryCredentialStore {
    async fn load(&self) -> Result<Option<CredentialRecord>> {
        Ok(self.record.lock().await.clone())
    }

    async fn save(&self, record: &CredentialRecord) -> Result<()> {
        *self.record.lock().await = Some(record.clone());
        self.saves.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}
