use std::path::PathBuf;

use miette::Diagnostic;
use thiserror::Error;

#[derive(Debug, Error, Diagnostic)]
pub enum PokedexError {
    #[error("cache entry not available: {0}")]
    CacheMiss(String),

    #[error("PokeAPI request failed: {0}")]
    PokeApiHttp(String),

    #[error("PokeAPI returned status {status}: {message}")]
    PokeApiStatus { status: u16, message: String },

    #[error("PokeAPI response from {url} is not valid JSON: {message}")]
    PokeApiDecode { url: String, message: String },

    #[error("catalog response has no results list")]
    InvalidCatalog,

    #[error("cached details are not a list of records")]
    InvalidDetails,

    #[error("record #{0} is not a JSON object")]
    InvalidRecord(usize),

    #[error("failed to read config file at {0}")]
    ConfigRead(PathBuf),

    #[error("failed to parse JSON config: {0}")]
    ConfigParse(String),

    #[error("filesystem error: {0}")]
    Filesystem(String),

    #[error("failed to write report {file}: {message}")]
    ReportWrite { file: String, message: String },
}

impl PokedexError {
    pub fn is_network(&self) -> bool {
        matches!(
            self,
            PokedexError::PokeApiHttp(_)
                | PokedexError::PokeApiStatus { .. }
                | PokedexError::PokeApiDecode { .. }
        )
    }
}
