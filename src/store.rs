use std::fs;
use std::io::Write;

use camino::{Utf8Path, Utf8PathBuf};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tempfile::Builder;

use crate::domain::CacheKey;
use crate::error::PokedexError;

/// JSON blobs keyed by logical dataset name, one file per key under `root`.
#[derive(Debug, Clone)]
pub struct CacheStore {
    root: Utf8PathBuf,
}

impl CacheStore {
    pub fn new(root: Utf8PathBuf) -> Self {
        Self { root }
    }

    pub fn root(&self) -> &Utf8Path {
        &self.root
    }

    pub fn path(&self, key: CacheKey) -> Utf8PathBuf {
        self.root.join(key.file_name())
    }

    pub fn metadata_path(&self, key: CacheKey) -> Utf8PathBuf {
        self.root.join(format!("{}.meta.json", key.file_name()))
    }

    pub fn ensure_root(&self) -> Result<(), PokedexError> {
        fs::create_dir_all(self.root.as_std_path())
            .map_err(|err| PokedexError::Filesystem(err.to_string()))
    }

    pub fn exists(&self, key: CacheKey) -> bool {
        fs::metadata(self.path(key).as_std_path())
            .map(|meta| meta.is_file() && meta.len() > 0)
            .unwrap_or(false)
    }

    /// Undecodable blobs are reported as misses, same as absent ones.
    pub fn read(&self, key: CacheKey) -> Result<Value, PokedexError> {
        let path = self.path(key);
        let content = fs::read_to_string(path.as_std_path())
            .map_err(|_| PokedexError::CacheMiss(key.to_string()))?;
        serde_json::from_str(&content).map_err(|err| {
            tracing::warn!("cache entry {key} at {path} is not valid JSON: {err}");
            PokedexError::CacheMiss(key.to_string())
        })
    }

    pub fn write(&self, key: CacheKey, value: &Value, source: &str) -> Result<(), PokedexError> {
        let content = serde_json::to_vec_pretty(value)
            .map_err(|err| PokedexError::Filesystem(err.to_string()))?;
        write_bytes_atomic(&self.path(key), &content)?;

        let metadata = CacheMetadata {
            key,
            source: source.to_string(),
            fetched_at: chrono::Utc::now().to_rfc3339(),
            entries: entry_count(value),
            tool: format!("pokedex-reports/{}", env!("CARGO_PKG_VERSION")),
        };
        let content = serde_json::to_vec_pretty(&metadata)
            .map_err(|err| PokedexError::Filesystem(err.to_string()))?;
        write_bytes_atomic(&self.metadata_path(key), &content)
    }

    pub fn metadata(&self, key: CacheKey) -> Option<CacheMetadata> {
        let content = fs::read_to_string(self.metadata_path(key).as_std_path()).ok()?;
        serde_json::from_str(&content).ok()
    }

    pub fn clear(&self) -> Result<bool, PokedexError> {
        if !self.root.as_std_path().exists() {
            return Ok(false);
        }
        fs::remove_dir_all(self.root.as_std_path())
            .map_err(|err| PokedexError::Filesystem(err.to_string()))?;
        Ok(true)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheMetadata {
    pub key: CacheKey,
    pub source: String,
    pub fetched_at: String,
    pub entries: Option<usize>,
    pub tool: String,
}

fn entry_count(value: &Value) -> Option<usize> {
    match value {
        Value::Array(items) => Some(items.len()),
        Value::Object(map) => map
            .get("results")
            .and_then(|results| results.as_array())
            .map(|results| results.len()),
        _ => None,
    }
}

/// Writes into a sibling temp file and renames it over `path`, so readers never see a
/// half-written file.
pub fn write_bytes_atomic(path: &Utf8Path, content: &[u8]) -> Result<(), PokedexError> {
    let parent = path
        .parent()
        .filter(|parent| !parent.as_str().is_empty())
        .unwrap_or(Utf8Path::new("."));
    fs::create_dir_all(parent.as_std_path())
        .map_err(|err| PokedexError::Filesystem(err.to_string()))?;
    let mut temp = Builder::new()
        .prefix(".pokedex-reports")
        .tempfile_in(parent.as_std_path())
        .map_err(|err| PokedexError::Filesystem(err.to_string()))?;
    temp.write_all(content)
        .map_err(|err| PokedexError::Filesystem(err.to_string()))?;
    temp.persist(path.as_std_path())
        .map_err(|err| PokedexError::Filesystem(err.to_string()))?;
    Ok(())
}
