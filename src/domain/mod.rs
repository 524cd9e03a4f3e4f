// src/domain/mod.rs
//
// Domain Root - The Single Source of Truth for Domain API
//
// All other modules import from `crate::domain::*`

// ============================================================================
// MODULE DECLARATIONS
// ============================================================================

pub mod catalog;
pub mod listing;
pub mod movie;
pub mod resolution;

// ============================================================================
// PUBLIC API RE-EXPORTS
// ============================================================================

// Listing Domain (transient scraped data)
pub use listing::{canonical_link, canonical_title, NaturalKey, RawListingEntry};

// Catalog Domain
pub use catalog::{validate_catalog_record, CatalogRecord};

// Resolution
pub use resolution::{ResolutionOutcome, ResolutionResult, ResolutionStatus, TmdbId};

// Movie lists
pub use movie::{validate_movie_list_entry, MovieListEntry};

// ============================================================================
// DOMAIN ERROR TYPES
// ============================================================================

use thiserror::Error;

/// Domain-level errors
/// These represent violations of business rules and invariants
#[derive(Debug, Error)]
pub enum DomainError {
    #[error("Invariant violation: {0}")]
    InvariantViolation(String),

    #[error("Entity not found: {0}")]
    NotFound(String),
}

/// Domain result type
pub type DomainResult<T> = Result<T, DomainError>;
