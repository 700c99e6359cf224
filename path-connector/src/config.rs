use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::ConnectorError;
use crate::store::RetryPolicy;

pub const DEFAULT_GEOCODE_URL: &str = "https://dapi.kakao.com/v2/local/search/address.json";

/// Where the path store lives and how to talk to it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConnectorConfig {
    /// Lists the stored paths.
    pub index_url: String,
    /// Hands out signed upload URLs.
    pub upload_url: String,
    /// Public base URL of the blob bucket.
    pub blob_base_url: String,
    pub geocode_url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub geocode_key: Option<String>,
    /// Directory holding the local id list. Defaults to the user's data dir.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data_dir: Option<PathBuf>,
    pub retry_attempts: u32,
    pub retry_delay_ms: u64,
}

impl Default for ConnectorConfig {
    fn default() -> Self {
        Self {
            index_url: "http://127.0.0.1:8787/paths".to_string(),
            upload_url: "http://127.0.0.1:8787/upload-url".to_string(),
            blob_base_url: "http://127.0.0.1:8787/blobs".to_string(),
            geocode_url: DEFAULT_GEOCODE_URL.to_string(),
            geocode_key: None,
            data_dir: None,
            retry_attempts: 3,
            retry_delay_ms: 500,
        }
    }
}

impl ConnectorConfig {
    /// Load `path`, or the default location when none is given. A missing
    /// default file means defaults; a missing explicit file is an error.
    pub fn load(path: Option<&Path>) -> Result<Self, ConnectorError> {
        let (path, explicit) = match path {
            Some(path) => (path.to_path_buf(), true),
            None => (config_path()?, false),
        };
        if !explicit && !path.exists() {
            debug!(path = %path.display(), "no connector config, using defaults");
            return Ok(Self::default());
        }
        let text = std::fs::read_to_string(&path)?;
        Ok(toml::from_str(&text)?)
    }

    pub fn save(&self, path: Option<&Path>) -> Result<PathBuf, ConnectorError> {
        let path = match path {
            Some(path) => path.to_path_buf(),
            None => config_path()?,
        };
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&path, toml::to_string_pretty(self)?)?;
        Ok(path)
    }

    /// Apply `PATHDRAW_*` overrides found through `lookup`.
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(url) = lookup("PATHDRAW_INDEX_URL") {
            self.index_url = url;
        }
        if let Some(url) = lookup("PATHDRAW_UPLOAD_URL") {
            self.upload_url = url;
        }
        if let Some(url) = lookup("PATHDRAW_BLOB_BASE_URL") {
            self.blob_base_url = url;
        }
        if let Some(url) = lookup("PATHDRAW_GEOCODE_URL") {
            self.geocode_url = url;
        }
        if let Some(key) = lookup("PATHDRAW_GEOCODE_KEY") {
            self.geocode_key = Some(key).filter(|k| !k.trim().is_empty());
        }
        if let Some(dir) = lookup("PATHDRAW_DATA_DIR") {
            self.data_dir = Some(dir.into());
        }
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::new(
            self.retry_attempts,
            Duration::from_millis(self.retry_delay_ms),
        )
    }

    pub fn data_dir(&self) -> Result<PathBuf, ConnectorError> {
        match &self.data_dir {
            Some(dir) => Ok(dir.clone()),
            None => Ok(dirs::data_local_dir()
                .ok_or(ConnectorError::NoDir("data"))?
                .join("pathdraw")),
        }
    }
}

pub fn config_path() -> Result<PathBuf, ConnectorError> {
    let base = dirs::config_dir().ok_or(ConnectorError::NoDir("config"))?;
    Ok(base.join("pathdraw").join("connector.toml"))
}
