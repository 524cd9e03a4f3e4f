// src/services/reresolution_service.rs
//
// Re-resolution of pending catalog records.
//
// A record is `pending` when the resolver was unavailable during its harvest.
// This pass asks again, one title at a time, and settles the records that
// now get an answer. Only `tmdb_id` and `resolution_status` are written.

use std::sync::Arc;

use serde::Serialize;
use tokio_util::sync::CancellationToken;

use crate::domain::ResolutionOutcome;
use crate::error::AppResult;
use crate::events::{EventBus, RecordsReResolved};
use crate::integrations::MetadataResolver;
use crate::repositories::CatalogRepository;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ReResolutionReport {
    pub examined: usize,
    pub resolved: usize,
    pub unmatched: usize,
    pub still_pending: usize,
}

pub struct ReResolutionService {
    resolver: Arc<dyn MetadataResolver>,
    catalog_repo: Arc<dyn CatalogRepository>,
    event_bus: Arc<EventBus>,
}

impl ReResolutionService {
    pub fn new(
        resolver: Arc<dyn MetadataResolver>,
        catalog_repo: Arc<dyn CatalogRepository>,
        event_bus: Arc<EventBus>,
    ) -> Self {
        Self {
            resolver,
            catalog_repo,
            event_bus,
        }
    }

    /// Retry up to `limit` pending records, oldest first.
    /// Stops between records once `cancel` fires; settled records stay settled.
    pub async fn reresolve_pending(
        &self,
        limit: usize,
        cancel: &CancellationToken,
    ) -> AppResult<ReResolutionReport> {
        let pending = self.catalog_repo.list_pending(limit)?;
        let mut report = ReResolutionReport::default();

        log::info!("Re-resolving {} pending records", pending.len());

        for record in pending {
            if cancel.is_cancelled() {
                log::warn!("Re-resolution cancelled after {} records", report.examined);
                break;
            }
            report.examined += 1;

            let outcome = match self.resolver.resolve(&record.title).await {
                Ok(result) => ResolutionOutcome::from(result),
                Err(e) => {
                    log::debug!("Still unavailable for '{}': {}", record.title, e);
                    report.still_pending += 1;
                    continue;
                }
            };

            if !self.catalog_repo.update_resolution(record.id, &outcome)? {
                // Settled concurrently by another pass
                continue;
            }

            match outcome {
                ResolutionOutcome::Resolved(id) => {
                    log::debug!("Resolved '{}' to TMDB {}", record.title, id);
                    report.resolved += 1;
                }
                ResolutionOutcome::NoMatch => report.unmatched += 1,
                ResolutionOutcome::Unavailable { .. } => report.still_pending += 1,
            }
        }

        log::info!(
            "Re-resolution: examined={} resolved={} unmatched={} still_pending={}",
            report.examined,
            report.resolved,
            report.unmatched,
            report.still_pending
        );
        self.event_bus.emit(RecordsReResolved::new(
            report.examined,
            report.resolved,
            report.unmatched,
            report.still_pending,
        ));

        Ok(report)
    }
}
