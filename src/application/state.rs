// src/application/state.rs
//
// Application state shared by commands.
// Built once at startup; all fields are Arc-wrapped.
//
// The harvest and re-resolution services need network collaborators (and a
// TMDB key), so they are assembled on demand. Commands that only read the
// database work without any TMDB configuration.

use std::path::PathBuf;
use std::sync::Arc;

use crate::config::AppConfig;
use crate::db::{create_connection_pool, initialize_database, ConnectionPool};
use crate::error::{AppError, AppResult};
use crate::events::EventBus;
use crate::integrations::{
    base_url_of, CuevanaParser, HttpListingFetcher, ListingFetcher, MetadataResolver, TmdbClient,
};
use crate::repositories::{
    CatalogRepository, MovieListRepository, SqliteCatalogRepository, SqliteMovieListRepository,
};
use crate::services::{HarvestService, HarvestSettings, MovieQueryService, ReResolutionService};

pub struct AppState {
    pub config: AppConfig,
    pub database_path: PathBuf,
    pub pool: Arc<ConnectionPool>,
    pub event_bus: Arc<EventBus>,
    pub catalog_repo: Arc<dyn CatalogRepository>,
    pub movie_list_repo: Arc<dyn MovieListRepository>,
    pub movie_query_service: Arc<MovieQueryService>,
}

impl AppState {
    /// Open (and migrate) the database and wire repositories.
    pub fn initialize(config: AppConfig) -> AppResult<Self> {
        let database_path = config.database_path()?;
        let pool = Arc::new(create_connection_pool(
            &database_path,
            config.database.max_connections,
        )?);

        {
            let conn = pool.get()?;
            initialize_database(&conn)?;
        }
        log::debug!("Database ready at {}", database_path.display());

        let catalog_repo: Arc<dyn CatalogRepository> =
            Arc::new(SqliteCatalogRepository::new(Arc::clone(&pool)));
        let movie_list_repo: Arc<dyn MovieListRepository> =
            Arc::new(SqliteMovieListRepository::new(Arc::clone(&pool)));
        let movie_query_service = Arc::new(MovieQueryService::new(Arc::clone(&movie_list_repo)));

        Ok(Self {
            config,
            database_path,
            pool,
            event_bus: Arc::new(EventBus::new()),
            catalog_repo,
            movie_list_repo,
            movie_query_service,
        })
    }

    pub fn listing_fetcher(&self) -> AppResult<Arc<dyn ListingFetcher>> {
        let listing = &self.config.listing;
        let parser = CuevanaParser::new(base_url_of(&listing.url_template)?)
            .map_err(|e| AppError::Config(e.to_string()))?;

        let fetcher = HttpListingFetcher::new(
            listing.url_template.clone(),
            listing.max_pages,
            &listing.user_agent,
            listing.timeout(),
            Arc::new(parser),
        )?;
        Ok(Arc::new(fetcher))
    }

    pub fn metadata_resolver(&self) -> AppResult<Arc<dyn MetadataResolver>> {
        let tmdb = &self.config.tmdb;
        let client = TmdbClient::new(
            &tmdb.api_key,
            tmdb.base_url.clone(),
            tmdb.language.clone(),
            tmdb.min_interval(),
            tmdb.timeout(),
        )?;
        Ok(Arc::new(client))
    }

    pub fn harvest_service(&self) -> AppResult<HarvestService> {
        Ok(HarvestService::new(
            self.listing_fetcher()?,
            self.metadata_resolver()?,
            Arc::clone(&self.catalog_repo),
            Arc::clone(&self.event_bus),
            HarvestSettings {
                source: self.config.listing.source.clone(),
                created_by: self.config.harvest.provenance.clone(),
                resolver_concurrency: self.config.harvest.resolver_concurrency,
            },
        ))
    }

    pub fn reresolution_service(&self) -> AppResult<ReResolutionService> {
        Ok(ReResolutionService::new(
            self.metadata_resolver()?,
            Arc::clone(&self.catalog_repo),
            Arc::clone(&self.event_bus),
        ))
    }
}
