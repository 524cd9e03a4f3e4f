// src/config.rs
//
// Application configuration.
//
// Sources, later ones win:
// 1. Built-in defaults
// 2. `Kuhaku.toml` in the working directory (optional), or an explicit file
// 3. `KUHAKU_*` environment variables, `__` between section and key
//    (e.g. `KUHAKU_TMDB__API_KEY`, `KUHAKU_HARVEST__RESOLVER_CONCURRENCY`)

use std::path::{Path, PathBuf};
use std::time::Duration;

use config::{Config, ConfigError, Environment, File as ConfigFile};
use serde::{Deserialize, Serialize};

use crate::db::get_database_path;
use crate::error::{AppError, AppResult};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub database: DatabaseConfig,
    pub listing: ListingConfig,
    pub tmdb: TmdbConfig,
    pub harvest: HarvestConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// Defaults to `<data dir>/kuhaku/kuhaku.db`
    pub path: Option<PathBuf>,
    pub max_connections: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListingConfig {
    /// Page URL with a `{page}` placeholder
    pub url_template: String,
    pub max_pages: u32,
    /// Source name stamped on harvested records
    pub source: String,
    pub user_agent: String,
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TmdbConfig {
    #[serde(skip_serializing)]
    pub api_key: String,
    pub base_url: String,
    pub language: Option<String>,
    pub min_interval_ms: u64,
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HarvestConfig {
    /// Provenance stamped on harvested records
    pub provenance: String,
    pub resolver_concurrency: usize,
}

impl AppConfig {
    /// Load defaults, the optional config file, and the environment.
    pub fn load(file: Option<&Path>) -> AppResult<Self> {
        let builder = Self::defaults()?;

        let builder = match file {
            Some(path) => builder.add_source(ConfigFile::from(path).required(true)),
            None => builder.add_source(ConfigFile::with_name("Kuhaku").required(false)),
        };

        let config: AppConfig = builder
            .add_source(
                Environment::with_prefix("KUHAKU")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()?;

        config.validate()?;
        Ok(config)
    }

    fn defaults() -> Result<config::builder::ConfigBuilder<config::builder::DefaultState>, ConfigError> {
        Config::builder()
            .set_default("database.max_connections", 8)?
            .set_default(
                "listing.url_template",
                "https://cuevana.biz/peliculas/page/{page}",
            )?
            .set_default("listing.max_pages", 5)?
            .set_default("listing.source", "cuevana")?
            .set_default(
                "listing.user_agent",
                concat!("kuhaku/", env!("CARGO_PKG_VERSION")),
            )?
            .set_default("listing.timeout_secs", 30)?
            .set_default("tmdb.api_key", "")?
            .set_default("tmdb.base_url", crate::integrations::DEFAULT_BASE_URL)?
            .set_default("tmdb.min_interval_ms", 250)?
            .set_default("tmdb.timeout_secs", 15)?
            .set_default("harvest.provenance", "Kuhaku Scrapping")?
            .set_default("harvest.resolver_concurrency", 4)
    }

    pub fn validate(&self) -> AppResult<()> {
        if !self.listing.url_template.contains("{page}") {
            return Err(AppError::Config(
                "listing.url_template must contain {page}".to_string(),
            ));
        }
        if self.listing.max_pages == 0 {
            return Err(AppError::Config("listing.max_pages must be at least 1".to_string()));
        }
        if self.harvest.resolver_concurrency == 0 {
            return Err(AppError::Config(
                "harvest.resolver_concurrency must be at least 1".to_string(),
            ));
        }
        if self.harvest.provenance.trim().is_empty() {
            return Err(AppError::Config("harvest.provenance must not be empty".to_string()));
        }
        if self.listing.source.trim().is_empty() {
            return Err(AppError::Config("listing.source must not be empty".to_string()));
        }
        if self.database.max_connections == 0 {
            return Err(AppError::Config(
                "database.max_connections must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    pub fn database_path(&self) -> AppResult<PathBuf> {
        match &self.database.path {
            Some(path) => Ok(path.clone()),
            None => get_database_path(),
        }
    }
}

impl ListingConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl TmdbConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn min_interval(&self) -> Duration {
        Duration::from_millis(self.min_interval_ms)
    }
}
