//! Core configuration: cache pool bounds with environment overrides.
//!
//! Defaults come first, environment variables override them. No file or
//! CLI layer is owned here; those belong to the hosting service.

use crate::cache::CachePoolConfig;
use anyhow::{Context, Result};
use serde::Deserialize;
use std::env;

const SCORE_ENTRIES_VAR: &str = "BOM_ONTOLOGY_SCORE_CACHE_ENTRIES";
const SCORE_TTL_VAR: &str = "BOM_ONTOLOGY_SCORE_CACHE_TTL_SECS";
const RESULT_ENTRIES_VAR: &str = "BOM_ONTOLOGY_RESULT_CACHE_ENTRIES";
const RESULT_TTL_VAR: &str = "BOM_ONTOLOGY_RESULT_CACHE_TTL_SECS";

/// Tunables for the core library.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct CoreConfig {
    pub score_cache: CachePoolConfig,
    pub result_cache: CachePoolConfig,
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            score_cache: CachePoolConfig::score_defaults(),
            result_cache: CachePoolConfig::result_defaults(),
        }
    }
}

impl CoreConfig {
    /// Defaults overlaid with any environment overrides.
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();
        if let Some(entries) = env_parse::<usize>(SCORE_ENTRIES_VAR)? {
            config.score_cache.max_entries = entries;
        }
        if let Some(ttl) = env_parse::<i64>(SCORE_TTL_VAR)? {
            config.score_cache.ttl_secs = ttl;
        }
        if let Some(entries) = env_parse::<usize>(RESULT_ENTRIES_VAR)? {
            config.result_cache.max_entries = entries;
        }
        if let Some(ttl) = env_parse::<i64>(RESULT_TTL_VAR)? {
            config.result_cache.ttl_secs = ttl;
        }
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        anyhow::ensure!(
            self.score_cache.max_entries > 0,
            "score cache capacity must be positive"
        );
        anyhow::ensure!(
            self.result_cache.max_entries > 0,
            "result cache capacity must be positive"
        );
        anyhow::ensure!(
            self.score_cache.ttl_secs >= 0 && self.result_cache.ttl_secs >= 0,
            "cache TTLs must not be negative"
        );
        Ok(())
    }
}

fn env_parse<T: std::str::FromStr>(name: &str) -> Result<Option<T>>
where
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match env::var(name) {
        Ok(raw) => {
            let value = raw
                .trim()
                .parse::<T>()
                .with_context(|| format!("invalid value for {name}: {raw:?}"))?;
            Ok(Some(value))
        }
        Err(env::VarError::NotPresent) => Ok(None),
        Err(error) => Err(error).with_context(|| format!("cannot read {name}")),
    }
}
