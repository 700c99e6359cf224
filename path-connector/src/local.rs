use std::path::{Path, PathBuf};

use path_protocol::MY_PATH_IDS_KEY;
use tracing::warn;

use crate::error::ConnectorError;

/// Ids of the paths uploaded from this device, kept as a JSON array.
#[derive(Debug, Clone)]
pub struct LocalIds {
    path: PathBuf,
}

impl LocalIds {
    pub fn in_dir(dir: &Path) -> Self {
        Self {
            path: dir.join(format!("{MY_PATH_IDS_KEY}.json")),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// A missing or unreadable list reads as empty.
    pub fn load(&self) -> Vec<String> {
        let text = match std::fs::read_to_string(&self.path) {
            Ok(text) => text,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Vec::new(),
            Err(err) => {
                warn!(path = %self.path.display(), error = %err, "failed to read local path ids");
                return Vec::new();
            }
        };
        serde_json::from_str(&text).unwrap_or_else(|err| {
            warn!(path = %self.path.display(), error = %err, "discarding corrupt local path ids");
            Vec::new()
        })
    }

    pub fn contains(&self, id: &str) -> bool {
        self.load().iter().any(|known| known == id)
    }

    /// Append `id` unless already recorded; returns the updated list.
    pub fn record(&self, id: &str) -> Result<Vec<String>, ConnectorError> {
        let mut ids = self.load();
        if ids.iter().any(|known| known == id) {
            return Ok(ids);
        }
        ids.push(id.to_string());
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&self.path, serde_json::to_string(&ids)?)?;
        Ok(ids)
    }
}
