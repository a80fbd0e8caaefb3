use std::fmt;
use std::str::FromStr;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::PokedexError;

/// One entry of the bulk enumeration: the entity name and where its detail record lives.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityReference {
    pub name: String,
    #[serde(rename = "url")]
    pub detail_url: String,
}

impl EntityReference {
    /// Extracts references from a catalog body shaped like `{"results": [{"name", "url"}, ...]}`.
    pub fn from_catalog(catalog: &Value) -> Result<Vec<Self>, PokedexError> {
        let results = catalog
            .get("results")
            .and_then(|value| value.as_array())
            .ok_or(PokedexError::InvalidCatalog)?;
        results
            .iter()
            .map(|entry| {
                serde_json::from_value(entry.clone()).map_err(|_| PokedexError::InvalidCatalog)
            })
            .collect()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CacheKey {
    Catalog,
    Details,
}

impl CacheKey {
    pub const ALL: [CacheKey; 2] = [CacheKey::Catalog, CacheKey::Details];

    pub fn file_name(self) -> &'static str {
        match self {
            CacheKey::Catalog => "pokemon_endpoints_data.json",
            CacheKey::Details => "pokemon_details.json",
        }
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CacheKey::Catalog => write!(f, "catalog"),
            CacheKey::Details => write!(f, "details"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum ReportKind {
    Membership,
    TypeSlots,
    Bmi,
    Capitalized,
    Sprites,
}

impl ReportKind {
    pub const ALL: [ReportKind; 5] = [
        ReportKind::Membership,
        ReportKind::TypeSlots,
        ReportKind::Bmi,
        ReportKind::Capitalized,
        ReportKind::Sprites,
    ];

    pub fn file_name(self) -> &'static str {
        match self {
            ReportKind::Membership => "pokemon_in_req_games.csv",
            ReportKind::TypeSlots => "pokemon_slot_names.csv",
            ReportKind::Bmi => "pokemon_bmi.csv",
            ReportKind::Capitalized => "capitalized.csv",
            ReportKind::Sprites => "front_default_sprite_url.csv",
        }
    }
}

impl fmt::Display for ReportKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReportKind::Membership => write!(f, "membership"),
            ReportKind::TypeSlots => write!(f, "type-slots"),
            ReportKind::Bmi => write!(f, "bmi"),
            ReportKind::Capitalized => write!(f, "capitalized"),
            ReportKind::Sprites => write!(f, "sprites"),
        }
    }
}

/// What the detail aggregation does when a single entity cannot be fetched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum DetailFailurePolicy {
    #[default]
    FailFast,
    Skip,
}

impl FromStr for DetailFailurePolicy {
    type Err = PokedexError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "fail-fast" | "fail_fast" | "failfast" => Ok(Self::FailFast),
            "skip" => Ok(Self::Skip),
            _ => Err(PokedexError::ConfigParse(format!(
                "unknown detail failure policy: {value}"
            ))),
        }
    }
}

/// Mirrors the truthiness check applied to cached payloads: empty containers and null
/// count as "never populated". A catalog whose `results` list is empty is also treated
/// as unpopulated, which is stricter than a plain truthiness check on the object.
pub fn is_empty_payload(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(flag) => !flag,
        Value::String(text) => text.is_empty(),
        Value::Array(items) => items.is_empty(),
        Value::Object(map) => {
            map.is_empty()
                || map
                    .get("results")
                    .and_then(|results| results.as_array())
                    .is_some_and(|results| results.is_empty())
        }
        Value::Number(_) => false,
    }
}
