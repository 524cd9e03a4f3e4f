// src/services/existence_filter.rs
//
// Existence Filter
//
// Answers "is this listing entry already in the catalog?" by natural key.
// This only saves resolver calls: two runs can both see "absent" for the same
// entry, and the storage constraint decides which insert wins.

use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use crate::domain::RawListingEntry;
use crate::error::AppResult;
use crate::repositories::CatalogRepository;

/// Entries split into those still unknown to the catalog and those skipped
#[derive(Debug, Default)]
pub struct FilterOutcome {
    pub fresh: Vec<(usize, RawListingEntry)>,
    pub skipped_existing: usize,
    /// Cancellation was observed before every entry was checked
    pub interrupted: bool,
}

pub struct ExistenceFilter {
    catalog_repo: Arc<dyn CatalogRepository>,
}

impl ExistenceFilter {
    pub fn new(catalog_repo: Arc<dyn CatalogRepository>) -> Self {
        Self { catalog_repo }
    }

    pub fn exists(&self, candidate: &RawListingEntry) -> AppResult<bool> {
        self.catalog_repo
            .exists_by_natural_key(&candidate.natural_key())
    }

    /// Keep the entries not yet stored, tagged with their listing position.
    /// Stops early (with `interrupted`) once `cancel` fires.
    pub fn retain_new(
        &self,
        entries: Vec<RawListingEntry>,
        cancel: &CancellationToken,
    ) -> AppResult<FilterOutcome> {
        let mut outcome = FilterOutcome::default();

        for (index, entry) in entries.into_iter().enumerate() {
            if cancel.is_cancelled() {
                outcome.interrupted = true;
                break;
            }

            if self.exists(&entry)? {
                log::debug!("Already in catalog: {}", entry);
                outcome.skipped_existing += 1;
            } else {
                outcome.fresh.push((index, entry));
            }
        }

        Ok(outcome)
    }
}
