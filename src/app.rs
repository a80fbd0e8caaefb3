use serde::Serialize;
use serde_json::Value;

use crate::config::ResolvedConfig;
use crate::domain::{CacheKey, DetailFailurePolicy, EntityReference, ReportKind, is_empty_payload};
use crate::error::PokedexError;
use crate::flatten::{FlatTable, build_table};
use crate::pokeapi::PokeApiClient;
use crate::report::{ReportSettings, ReportWriter, project};
use crate::store::{CacheMetadata, CacheStore};

#[derive(Debug, Clone)]
pub struct RunOptions {
    pub reports: Vec<ReportKind>,
    pub force_refresh: bool,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            reports: ReportKind::ALL.to_vec(),
            force_refresh: false,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct RunResult {
    pub records: usize,
    pub skipped: Vec<SkippedEntity>,
    pub reports: Vec<ReportResult>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ReportResult {
    pub kind: ReportKind,
    pub path: String,
    pub rows: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct StatusResult {
    pub cache_dir: String,
    pub output_dir: String,
    pub entries: Vec<CacheStatus>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CacheStatus {
    pub key: CacheKey,
    pub present: bool,
    pub path: String,
    pub metadata: Option<CacheMetadata>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ClearResult {
    pub cleared: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SkippedEntity {
    pub name: String,
    pub url: String,
    pub error: String,
}

/// Detail records in catalog order, plus whatever the skip policy left out.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DetailAggregate {
    pub records: Vec<Value>,
    pub skipped: Vec<SkippedEntity>,
}

impl DetailAggregate {
    pub fn is_complete(&self) -> bool {
        self.skipped.is_empty()
    }
}

pub struct App<C: PokeApiClient> {
    store: CacheStore,
    client: C,
    config: ResolvedConfig,
}

impl<C: PokeApiClient> App<C> {
    pub fn new(config: ResolvedConfig, client: C) -> Self {
        Self {
            store: CacheStore::new(config.cache_dir.clone()),
            client,
            config,
        }
    }

    pub fn store(&self) -> &CacheStore {
        &self.store
    }

    pub fn config(&self) -> &ResolvedConfig {
        &self.config
    }

    /// Cache-first enumeration. A cached catalog that is empty counts as never populated.
    pub fn get_catalog(&self, force_refresh: bool) -> Result<Vec<EntityReference>, PokedexError> {
        if !force_refresh && self.store.exists(CacheKey::Catalog) {
            match self.store.read(CacheKey::Catalog) {
                Ok(cached) if !is_empty_payload(&cached) => {
                    tracing::info!("catalog fetched from local cache");
                    return EntityReference::from_catalog(&cached);
                }
                Ok(_) => tracing::info!("cached catalog is empty; refetching"),
                Err(PokedexError::CacheMiss(_)) => {
                    tracing::info!("cached catalog unreadable; refetching")
                }
                Err(err) => return Err(err),
            }
        }

        let url = self.config.catalog_url();
        tracing::info!("requesting catalog from {url}");
        let catalog = self.client.fetch(&url)?;
        let references = EntityReference::from_catalog(&catalog)?;
        self.store.write(CacheKey::Catalog, &catalog, &url)?;
        tracing::info!("catalog cached with {} entries", references.len());
        Ok(references)
    }

    pub fn get_details(&self) -> Result<DetailAggregate, PokedexError> {
        self.get_details_with(false)
    }

    /// One cache entry covers the whole collection. It is written only when every
    /// entity was fetched.
    pub fn get_details_with(&self, force_refresh: bool) -> Result<DetailAggregate, PokedexError> {
        if !force_refresh && self.store.exists(CacheKey::Details) {
            match self.store.read(CacheKey::Details) {
                Ok(Value::Array(records)) => {
                    tracing::info!("read {} records from local cache", records.len());
                    return Ok(DetailAggregate {
                        records,
                        skipped: Vec::new(),
                    });
                }
                Ok(_) => return Err(PokedexError::InvalidDetails),
                Err(PokedexError::CacheMiss(_)) => {}
                Err(err) => return Err(err),
            }
        }

        let references = self.get_catalog(force_refresh)?;
        tracing::info!("requesting details for {} entities", references.len());
        let aggregate = aggregate_details(&self.client, &references, self.config.on_detail_error)?;

        if aggregate.is_complete() {
            let value = Value::Array(aggregate.records.clone());
            self.store
                .write(CacheKey::Details, &value, &self.config.catalog_url())?;
            tracing::info!("details cached for {} entities", aggregate.records.len());
        } else {
            tracing::warn!(
                "{} entities skipped; details cache not written",
                aggregate.skipped.len()
            );
        }
        Ok(aggregate)
    }

    pub fn build_table(
        &self,
        force_refresh: bool,
    ) -> Result<(FlatTable, Vec<SkippedEntity>), PokedexError> {
        let aggregate = self.get_details_with(force_refresh)?;
        tracing::info!("normalizing {} records", aggregate.records.len());
        let table = build_table(&aggregate.records)?;
        Ok((table, aggregate.skipped))
    }

    /// Builds the table once and writes each requested report in order. A failing report
    /// leaves the ones already written in place.
    pub fn run(&self, options: RunOptions) -> Result<RunResult, PokedexError> {
        let (table, skipped) = self.build_table(options.force_refresh)?;
        let writer = ReportWriter::new(self.config.output_dir.clone());
        let settings = ReportSettings {
            chosen_versions: self.config.chosen_versions.clone(),
        };

        let mut reports = Vec::with_capacity(options.reports.len());
        for kind in options.reports {
            let rows = project(kind, &table, &settings);
            let path = writer.write(&rows)?;
            tracing::info!("{kind} report: {} rows written to {path}", rows.rows.len());
            reports.push(ReportResult {
                kind,
                path: path.to_string(),
                rows: rows.rows.len(),
            });
        }

        Ok(RunResult {
            records: table.len(),
            skipped,
            reports,
        })
    }

    pub fn status(&self) -> StatusResult {
        let entries = CacheKey::ALL
            .into_iter()
            .map(|key| CacheStatus {
                key,
                present: self.store.exists(key),
                path: self.store.path(key).to_string(),
                metadata: self.store.metadata(key),
            })
            .collect();
        StatusResult {
            cache_dir: self.store.root().to_string(),
            output_dir: self.config.output_dir.to_string(),
            entries,
        }
    }

    pub fn clear(&self) -> Result<ClearResult, PokedexError> {
        tracing::info!("clearing cache at {}", self.store.root());
        let cleared = self.store.clear()?;
        Ok(ClearResult { cleared })
    }
}

/// Fetches every reference in order. Under `FailFast` the first failure is returned;
/// under `Skip` it is recorded and the rest still run.
pub fn aggregate_details<C: PokeApiClient + ?Sized>(
    client: &C,
    references: &[EntityReference],
    policy: DetailFailurePolicy,
) -> Result<DetailAggregate, PokedexError> {
    let mut aggregate = DetailAggregate {
        records: Vec::with_capacity(references.len()),
        skipped: Vec::new(),
    };
    for reference in references {
        tracing::debug!("fetching details for {}", reference.name);
        match client.fetch(&reference.detail_url) {
            Ok(record) => aggregate.records.push(record),
            Err(err) if policy == DetailFailurePolicy::Skip => {
                tracing::warn!("skipping {}: {err}", reference.name);
                aggregate.skipped.push(SkippedEntity {
                    name: reference.name.clone(),
                    url: reference.detail_url.clone(),
                    error: err.to_string(),
                });
            }
            Err(err) => return Err(err),
        }
    }
    Ok(aggregate)
}
