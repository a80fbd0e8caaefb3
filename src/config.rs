use std::fs;
use std::path::PathBuf;

use camino::Utf8PathBuf;
use serde::{Deserialize, Serialize};

use crate::domain::DetailFailurePolicy;
use crate::error::PokedexError;

pub const DEFAULT_CONFIG_FILE: &str = "pokedex-reports.json";
pub const DEFAULT_BASE_URL: &str = "https://pokeapi.co/api/v2";
pub const DEFAULT_CATALOG_LIMIT: u32 = 1154;
pub const DEFAULT_CACHE_DIR: &str = "pokemon_data_folder";
pub const DEFAULT_OUTPUT_DIR: &str = "pokemon_data_delivery_folder";

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub base_url: Option<String>,
    #[serde(default)]
    pub catalog_limit: Option<u32>,
    #[serde(default)]
    pub cache_dir: Option<String>,
    #[serde(default)]
    pub output_dir: Option<String>,
    #[serde(default)]
    pub chosen_versions: Option<Vec<String>>,
    #[serde(default)]
    pub on_detail_error: Option<String>,
    #[serde(default)]
    pub request_timeout_secs: Option<u64>,
}

#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    pub base_url: String,
    pub catalog_limit: u32,
    pub cache_dir: Utf8PathBuf,
    pub output_dir: Utf8PathBuf,
    pub chosen_versions: Vec<String>,
    pub on_detail_error: DetailFailurePolicy,
    pub request_timeout_secs: Option<u64>,
}

impl ResolvedConfig {
    pub fn catalog_url(&self) -> String {
        format!(
            "{}/pokemon/?limit={}",
            self.base_url.trim_end_matches('/'),
            self.catalog_limit
        )
    }
}

impl Default for ResolvedConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            catalog_limit: DEFAULT_CATALOG_LIMIT,
            cache_dir: Utf8PathBuf::from(DEFAULT_CACHE_DIR),
            output_dir: Utf8PathBuf::from(DEFAULT_OUTPUT_DIR),
            chosen_versions: default_chosen_versions(),
            on_detail_error: DetailFailurePolicy::FailFast,
            request_timeout_secs: None,
        }
    }
}

pub struct ConfigLoader;

impl ConfigLoader {
    /// An explicit path must exist; the default file is optional and falls back to defaults.
    pub fn resolve(path: Option<&str>) -> Result<ResolvedConfig, PokedexError> {
        let config_path = match path {
            Some(path) => PathBuf::from(path),
            None => PathBuf::from(DEFAULT_CONFIG_FILE),
        };

        if path.is_none() && !config_path.exists() {
            return Ok(ResolvedConfig::default());
        }

        let content = fs::read_to_string(&config_path)
            .map_err(|_| PokedexError::ConfigRead(config_path.clone()))?;
        let config: Config = serde_json::from_str(&content)
            .map_err(|err| PokedexError::ConfigParse(err.to_string()))?;

        Self::resolve_config(config)
    }

    pub fn resolve_config(config: Config) -> Result<ResolvedConfig, PokedexError> {
        let defaults = ResolvedConfig::default();

        let on_detail_error = config
            .on_detail_error
            .as_deref()
            .map(str::parse)
            .transpose()?
            .unwrap_or(defaults.on_detail_error);

        let chosen_versions = match config.chosen_versions {
            Some(versions) if versions.is_empty() => {
                return Err(PokedexError::ConfigParse(
                    "chosen_versions must not be empty".to_string(),
                ));
            }
            Some(versions) => versions,
            None => defaults.chosen_versions,
        };

        Ok(ResolvedConfig {
            base_url: config.base_url.unwrap_or(defaults.base_url),
            catalog_limit: config.catalog_limit.unwrap_or(defaults.catalog_limit),
            cache_dir: config
                .cache_dir
                .map(Utf8PathBuf::from)
                .unwrap_or(defaults.cache_dir),
            output_dir: config
                .output_dir
                .map(Utf8PathBuf::from)
                .unwrap_or(defaults.output_dir),
            chosen_versions,
            on_detail_error,
            request_timeout_secs: config.request_timeout_secs,
        })
    }
}

pub fn default_chosen_versions() -> Vec<String> {
    vec![
        "red".to_string(),
        "blue".to_string(),
        "leafgreen".to_string(),
        "white".to_string(),
    ]
}
