use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::domain::{DomainError, IdentityKey};
use crate::ports::HistoryPersistence;

/// On-disk layout: one array of keys per slot.
#[derive(Debug, Default, Serialize, Deserialize)]
struct HistoryDocument {
    #[serde(default)]
    slots: BTreeMap<String, Vec<IdentityKey>>,
}

/// History persistence backed by a single TOML file.
///
/// All slots share the file; writes go through a temp file and an atomic
/// rename, serialized by an internal lock so concurrent slot saves do not
/// clobber each other.
pub struct TomlHistoryFile {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl TomlHistoryFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    /// `history.toml` inside the given data directory.
    pub fn in_dir(data_dir: &Path) -> Self {
        Self::new(data_dir.join("history.toml"))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn read_document(&self) -> Result<HistoryDocument, DomainError> {
        match tokio::fs::read_to_string(&self.path).await {
            Ok(content) => Ok(toml::from_str(&content)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = ?self.path, "History file not found, starting empty");
                Ok(HistoryDocument::default())
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn write_document(&self, document: &HistoryDocument) -> Result<(), DomainError> {
        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        let content = toml::to_string_pretty(document)?;
        let temp_path = self.path.with_extension("toml.tmp");
        tokio::fs::write(&temp_path, content).await?;

        if let Err(e) = tokio::fs::rename(&temp_path, &self.path).await {
            let _ = tokio::fs::remove_file(&temp_path).await;
            return Err(e.into());
        }
        Ok(())
    }
}

#[async_trait]
impl HistoryPersistence for TomlHistoryFile {
    async fn load(&self, slot: &str) -> Result<Vec<IdentityKey>, DomainError> {
        let mut document = self.read_document().await?;
        let keys = document.slots.remove(slot).unwrap_or_default();
        debug!(slot, count = keys.len(), "History slot loaded");
        Ok(keys)
    }

    async fn save(&self, slot: &str, keys: &[IdentityKey]) -> Result<(), DomainError> {
        let _guard = self.write_lock.lock().await;

        // A corrupt file is replaced rather than blocking every later save.
        let mut document = match self.read_document().await {
            Ok(document) => document,
            Err(e) => {
                warn!(path = ?self.path, error = %e, "Unreadable history file, rewriting");
                HistoryDocument::default()
            }
        };
        document.slots.insert(slot.to_string(), keys.to_vec());

        self.write_document(&document)
            .await
            .map_err(|e| DomainError::persistence(slot, e))?;

        info!(slot, count = keys.len(), "History slot saved");
        Ok(())
    }
}
