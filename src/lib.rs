// src/lib.rs
// Kuhaku - movie catalog ingestion
//
// Architecture:
// - Domain-centric: listing entries, catalog records and resolution outcomes
// - Integrations behind traits: the listing site and TMDB are swappable
// - Event-driven: services report progress through the event bus
// - Explicit: no implicit behavior, no magic
// - Application Layer: CLI boundary (commands return DTOs or ErrorResponse)

// ============================================================================
// FOUNDATION
// ============================================================================

pub mod config;
pub mod db;
pub mod domain;
pub mod error;
pub mod events;
pub mod logging;
pub mod repositories;
pub mod services;

// ============================================================================
// APPLICATION LAYER
// ============================================================================

pub mod application;
pub mod integrations;

#[cfg(test)]
mod testing;

// ============================================================================
// PUBLIC API - Domain
// ============================================================================

pub use domain::{
    canonical_link,
    canonical_title,
    validate_catalog_record,
    validate_movie_list_entry,
    // Catalog
    CatalogRecord,
    DomainError,
    // Movie lists
    MovieListEntry,
    // Listing
    NaturalKey,
    RawListingEntry,
    // Resolution
    ResolutionOutcome,
    ResolutionResult,
    ResolutionStatus,
    TmdbId,
};

// ============================================================================
// PUBLIC API - Errors & Configuration
// ============================================================================

pub use config::AppConfig;
pub use error::{AppError, AppResult};

// ============================================================================
// PUBLIC API - Events
// ============================================================================

pub use events::{
    create_event_bus, DomainEvent, EventBus, HarvestCompleted, HarvestFailed,
    HarvestStarted, RecordsReResolved, ResolutionDegraded,
};

// ============================================================================
// PUBLIC API - Database & Repositories
// ============================================================================

pub use db::{create_connection_pool, initialize_database, ConnectionPool};

pub use repositories::{
    BulkInsertOutcome, CatalogRepository, MovieListRepository, SqliteCatalogRepository,
    SqliteMovieListRepository,
};

// ============================================================================
// PUBLIC API - Integrations
// ============================================================================

pub use integrations::{
    FetchError, FetchedListing, HttpListingFetcher, ListingFetcher, MetadataResolver,
    ResolverUnavailable, TmdbClient,
};

// ============================================================================
// PUBLIC API - Services
// ============================================================================

pub use services::{
    ExistenceFilter, FilterOutcome, HarvestError, HarvestReport, HarvestService,
    HarvestSettings, HarvestStage, MovieQueryService, ReResolutionReport, ReResolutionService,
};

// ============================================================================
// PUBLIC API - Application Layer
// ============================================================================

pub use application::{AppState, ErrorResponse, ErrorType};
