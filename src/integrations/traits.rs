// src/integrations/traits.rs
//
// Seams between the harvest pipeline and the outside world.
// The pipeline receives these as constructed collaborators; tests swap in mocks.

use async_trait::async_trait;
use serde::Serialize;

use super::error::{FetchError, ResolverUnavailable};
use crate::domain::{RawListingEntry, ResolutionResult};

/// The full listing as read in one fetch
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FetchedListing {
    /// Entries in listing order, deduplicated by natural key
    pub entries: Vec<RawListingEntry>,
    pub pages_fetched: u32,
    /// Pages that failed after the first one and were skipped
    pub pages_failed: u32,
}

impl FetchedListing {
    pub fn from_entries(entries: Vec<RawListingEntry>) -> Self {
        Self {
            entries,
            pages_fetched: 1,
            pages_failed: 0,
        }
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ListingFetcher: Send + Sync {
    /// Fetch every available listing page.
    async fn fetch(&self) -> Result<FetchedListing, FetchError>;
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MetadataResolver: Send + Sync {
    /// Look up the catalog identifier for a title.
    async fn resolve(&self, title: &str) -> Result<ResolutionResult, ResolverUnavailable>;
}
