use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::listing::{NaturalKey, RawListingEntry};
use crate::domain::resolution::{ResolutionOutcome, ResolutionStatus, TmdbId};

/// A harvested movie as stored in the catalog
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogRecord {
    /// Internal immutable identifier
    pub id: Uuid,

    /// Title as scraped (not canonicalized)
    pub title: String,

    /// Link as scraped (not canonicalized)
    pub link: String,

    pub poster: Option<String>,
    pub overview: Option<String>,

    /// TMDB identifier. `None` when unmatched or still pending.
    pub tmdb_id: Option<TmdbId>,

    pub resolution_status: ResolutionStatus,

    /// Listing source the record came from (e.g. "cuevana")
    pub source: String,

    /// Provenance: identity that ingested the record
    pub created_by: String,

    /// Creation timestamp
    pub created_at: DateTime<Utc>,
}

impl CatalogRecord {
    /// Build a record from a scraped entry and its resolution outcome.
    /// This is the only place where provenance and timestamp are stamped.
    pub fn from_listing(
        entry: RawListingEntry,
        outcome: &ResolutionOutcome,
        source: &str,
        created_by: &str,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            title: entry.title,
            link: entry.link,
            poster: entry.poster,
            overview: entry.overview,
            tmdb_id: outcome.tmdb_id(),
            resolution_status: outcome.status(),
            source: source.to_string(),
            created_by: created_by.to_string(),
            created_at,
        }
    }

    pub fn natural_key(&self) -> NaturalKey {
        NaturalKey::new(&self.title, &self.link)
    }
}

impl std::fmt::Display for CatalogRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} : {}", self.title, self.link)
    }
}
