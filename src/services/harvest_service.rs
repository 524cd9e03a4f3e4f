// src/services/harvest_service.rs
//
// Harvest Service - the reconciliation pipeline
//
// Fetching -> Filtering -> Resolving -> Persisting -> Done
//
// CRITICAL RULES:
// - Entries already in the catalog never reach the resolver
// - A resolver failure degrades one item to `pending`; it never aborts the run
// - Everything new is written in ONE bulk transaction, in listing order
// - Nothing is written when the run fails or is cancelled before persisting
// - Duplicate-key conflicts at write time are counted, not raised
//
// Re-running against an unchanged listing persists nothing: every entry is
// filtered as existing, or absorbed by the uniqueness constraint.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use futures::stream::{self, StreamExt};
use serde::Serialize;
use thiserror::Error;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use super::existence_filter::ExistenceFilter;
use crate::domain::{CatalogRecord, RawListingEntry, ResolutionOutcome};
use crate::error::AppError;
use crate::events::{
    EventBus, HarvestCompleted, HarvestFailed, HarvestStarted, ResolutionDegraded,
};
use crate::integrations::{FetchError, ListingFetcher, MetadataResolver};
use crate::repositories::CatalogRepository;

// ============================================================================
// REPORT & STAGES
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum HarvestStage {
    Fetching,
    Filtering,
    Resolving,
    Persisting,
    Done,
    Failed,
    Cancelled,
}

impl std::fmt::Display for HarvestStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            HarvestStage::Fetching => "fetching",
            HarvestStage::Filtering => "filtering",
            HarvestStage::Resolving => "resolving",
            HarvestStage::Persisting => "persisting",
            HarvestStage::Done => "done",
            HarvestStage::Failed => "failed",
            HarvestStage::Cancelled => "cancelled",
        };
        write!(f, "{}", name)
    }
}

/// Audit counts of one harvest run
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HarvestReport {
    pub run_id: Uuid,
    pub stage: HarvestStage,
    pub fetched: usize,
    pub pages_failed: u32,
    pub skipped_existing: usize,
    pub resolved: usize,
    /// `unmatched + pending`
    pub unresolved: usize,
    pub unmatched: usize,
    pub pending: usize,
    pub persisted: usize,
    pub duplicates_ignored: usize,
    pub started_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
}

impl HarvestReport {
    fn start(run_id: Uuid) -> Self {
        Self {
            run_id,
            stage: HarvestStage::Fetching,
            fetched: 0,
            pages_failed: 0,
            skipped_existing: 0,
            resolved: 0,
            unresolved: 0,
            unmatched: 0,
            pending: 0,
            persisted: 0,
            duplicates_ignored: 0,
            started_at: Utc::now(),
            finished_at: None,
        }
    }

    fn count_outcome(&mut self, outcome: &ResolutionOutcome) {
        match outcome {
            ResolutionOutcome::Resolved(_) => self.resolved += 1,
            ResolutionOutcome::NoMatch => {
                self.unmatched += 1;
                self.unresolved += 1;
            }
            ResolutionOutcome::Unavailable { .. } => {
                self.pending += 1;
                self.unresolved += 1;
            }
        }
    }

    fn finish(mut self, stage: HarvestStage) -> Self {
        self.stage = stage;
        self.finished_at = Some(Utc::now());
        self
    }
}

// ============================================================================
// ERRORS
// ============================================================================

/// A run that did not reach `Done`. Every variant carries the counts
/// accumulated up to the failure; none of the run's records were committed.
#[derive(Debug, Error)]
pub enum HarvestError {
    #[error("Harvest aborted while fetching the listing: {source}")]
    Fetch {
        source: FetchError,
        report: Box<HarvestReport>,
    },

    #[error("Harvest aborted while checking existing records: {source}")]
    Filter {
        source: AppError,
        report: Box<HarvestReport>,
    },

    #[error("Harvest aborted while persisting: {source}")]
    Persistence {
        source: AppError,
        report: Box<HarvestReport>,
    },

    #[error("Harvest cancelled during {stage}")]
    Cancelled {
        stage: HarvestStage,
        report: Box<HarvestReport>,
    },
}

impl HarvestError {
    pub fn report(&self) -> &HarvestReport {
        match self {
            HarvestError::Fetch { report, .. }
            | HarvestError::Filter { report, .. }
            | HarvestError::Persistence { report, .. }
            | HarvestError::Cancelled { report, .. } => report,
        }
    }

    /// Stage the run was in when it stopped
    pub fn stage(&self) -> HarvestStage {
        match self {
            HarvestError::Fetch { .. } => HarvestStage::Fetching,
            HarvestError::Filter { .. } => HarvestStage::Filtering,
            HarvestError::Persistence { .. } => HarvestStage::Persisting,
            HarvestError::Cancelled { stage, .. } => *stage,
        }
    }
}

// ============================================================================
// SERVICE
// ============================================================================

#[derive(Debug, Clone)]
pub struct HarvestSettings {
    /// Listing source name stamped on records
    pub source: String,
    /// Provenance stamped on records
    pub created_by: String,
    /// Maximum concurrent resolver calls
    pub resolver_concurrency: usize,
}

impl Default for HarvestSettings {
    fn default() -> Self {
        Self {
            source: "cuevana".to_string(),
            created_by: "Kuhaku Scrapping".to_string(),
            resolver_concurrency: 4,
        }
    }
}

pub struct HarvestService {
    fetcher: Arc<dyn ListingFetcher>,
    resolver: Arc<dyn MetadataResolver>,
    catalog_repo: Arc<dyn CatalogRepository>,
    existence_filter: Arc<ExistenceFilter>,
    event_bus: Arc<EventBus>,
    settings: HarvestSettings,
}

impl HarvestService {
    pub fn new(
        fetcher: Arc<dyn ListingFetcher>,
        resolver: Arc<dyn MetadataResolver>,
        catalog_repo: Arc<dyn CatalogRepository>,
        event_bus: Arc<EventBus>,
        settings: HarvestSettings,
    ) -> Self {
        let existence_filter = Arc::new(ExistenceFilter::new(Arc::clone(&catalog_repo)));
        Self {
            fetcher,
            resolver,
            catalog_repo,
            existence_filter,
            event_bus,
            settings,
        }
    }

    /// Run one harvest to completion, failure, or cancellation.
    pub async fn run(&self, cancel: &CancellationToken) -> Result<HarvestReport, HarvestError> {
        let run_id = Uuid::new_v4();
        self.event_bus
            .emit(HarvestStarted::new(run_id, self.settings.source.clone()));
        log::info!("Harvest {} started (source: {})", run_id, self.settings.source);

        let result = self.run_stages(run_id, cancel).await;

        match &result {
            Ok(report) => {
                log::info!(
                    "Harvest {} done: fetched={} skipped={} resolved={} unmatched={} pending={} persisted={} duplicates={}",
                    run_id,
                    report.fetched,
                    report.skipped_existing,
                    report.resolved,
                    report.unmatched,
                    report.pending,
                    report.persisted,
                    report.duplicates_ignored
                );
                self.event_bus.emit(HarvestCompleted::new(
                    run_id,
                    report.fetched,
                    report.persisted,
                    report.duplicates_ignored,
                    report.pending,
                ));
            }
            Err(e) => {
                log::error!("Harvest {} failed: {}", run_id, e);
                self.event_bus
                    .emit(HarvestFailed::new(run_id, e.stage().to_string(), e.to_string()));
            }
        }

        result
    }

    async fn run_stages(
        &self,
        run_id: Uuid,
        cancel: &CancellationToken,
    ) -> Result<HarvestReport, HarvestError> {
        let mut report = HarvestReport::start(run_id);

        // Fetching
        let listing = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(cancelled(report, HarvestStage::Fetching)),
            fetched = self.fetcher.fetch() => fetched,
        };
        let listing = match listing {
            Ok(listing) => listing,
            Err(source) => {
                return Err(HarvestError::Fetch {
                    source,
                    report: Box::new(report.finish(HarvestStage::Failed)),
                })
            }
        };
        report.fetched = listing.entries.len();
        report.pages_failed = listing.pages_failed;

        // Filtering
        report.stage = HarvestStage::Filtering;
        let filter = Arc::clone(&self.existence_filter);
        let filter_cancel = cancel.clone();
        let filtered = tokio::task::spawn_blocking(move || {
            filter.retain_new(listing.entries, &filter_cancel)
        })
        .await
        .map_err(|e| AppError::Other(format!("Existence check task failed: {}", e)))
        .and_then(|result| result);

        let filtered = match filtered {
            Ok(filtered) => filtered,
            Err(source) => {
                return Err(HarvestError::Filter {
                    source,
                    report: Box::new(report.finish(HarvestStage::Failed)),
                })
            }
        };
        report.skipped_existing = filtered.skipped_existing;
        if filtered.interrupted {
            return Err(cancelled(report, HarvestStage::Filtering));
        }
        log::info!(
            "Harvest {}: {} new entries, {} already in catalog",
            run_id,
            filtered.fresh.len(),
            filtered.skipped_existing
        );

        // Resolving
        report.stage = HarvestStage::Resolving;
        let mut resolved = self.resolve_all(filtered.fresh, cancel).await;
        resolved.sort_by_key(|(index, _, _)| *index);

        let mut outcomes = Vec::with_capacity(resolved.len());
        let mut interrupted = false;
        for (_, entry, outcome) in resolved {
            match outcome {
                Some(outcome) => {
                    report.count_outcome(&outcome);
                    if let ResolutionOutcome::Unavailable { reason } = &outcome {
                        log::warn!("Resolver unavailable for '{}': {}", entry.title, reason);
                        self.event_bus.emit(ResolutionDegraded::new(
                            run_id,
                            entry.title.clone(),
                            reason.clone(),
                        ));
                    }
                    outcomes.push((entry, outcome));
                }
                None => interrupted = true,
            }
        }
        if interrupted || cancel.is_cancelled() {
            return Err(cancelled(report, HarvestStage::Resolving));
        }

        // Persisting
        report.stage = HarvestStage::Persisting;
        let created_at = Utc::now();
        let records: Vec<CatalogRecord> = outcomes
            .into_iter()
            .map(|(entry, outcome)| {
                CatalogRecord::from_listing(
                    entry,
                    &outcome,
                    &self.settings.source,
                    &self.settings.created_by,
                    created_at,
                )
            })
            .collect();

        if !records.is_empty() {
            let repo = Arc::clone(&self.catalog_repo);
            let written = tokio::task::spawn_blocking(move || repo.bulk_insert(&records))
                .await
                .map_err(|e| AppError::Other(format!("Bulk insert task failed: {}", e)))
                .and_then(|result| result);

            match written {
                Ok(outcome) => {
                    report.persisted = outcome.inserted;
                    report.duplicates_ignored = outcome.duplicates;
                }
                Err(source) => {
                    return Err(HarvestError::Persistence {
                        source,
                        report: Box::new(report.finish(HarvestStage::Failed)),
                    })
                }
            }
        }

        Ok(report.finish(HarvestStage::Done))
    }

    /// Resolve entries on a bounded pool. Output order is completion order;
    /// `None` marks entries skipped because of cancellation.
    async fn resolve_all(
        &self,
        entries: Vec<(usize, RawListingEntry)>,
        cancel: &CancellationToken,
    ) -> Vec<(usize, RawListingEntry, Option<ResolutionOutcome>)> {
        let width = self.settings.resolver_concurrency.max(1);

        stream::iter(entries)
            .map(|(index, entry)| {
                let resolver = Arc::clone(&self.resolver);
                let cancel = cancel.clone();
                async move {
                    if cancel.is_cancelled() {
                        return (index, entry, None);
                    }
                    let answer = tokio::select! {
                        biased;
                        _ = cancel.cancelled() => None,
                        answer = resolver.resolve(&entry.title) => Some(answer),
                    };
                    let outcome = answer.map(|answer| match answer {
                        Ok(result) => ResolutionOutcome::from(result),
                        Err(e) => ResolutionOutcome::Unavailable {
                            reason: e.to_string(),
                        },
                    });
                    (index, entry, outcome)
                }
            })
            .buffer_unordered(width)
            .collect()
            .await
    }
}

fn cancelled(report: HarvestReport, stage: HarvestStage) -> HarvestError {
    log::warn!("Harvest {} cancelled during {}", report.run_id, stage);
    HarvestError::Cancelled {
        stage,
        report: Box::new(report.finish(HarvestStage::Cancelled)),
    }
}
