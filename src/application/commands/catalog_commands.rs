// src/application/commands/catalog_commands.rs
//
// Catalog Command Handlers

use std::str::FromStr;

use crate::application::dto::{CatalogRecordDto, DatabaseStatsDto};
use crate::application::error_handling::ErrorResponse;
use crate::application::state::AppState;
use crate::db::{get_database_stats, verify_database_integrity};
use crate::domain::ResolutionStatus;
use crate::error::AppError;

/// Verify the database and report its contents.
/// The schema itself is applied when the state is initialized.
pub fn database_stats(state: &AppState) -> Result<DatabaseStatsDto, ErrorResponse> {
    let conn = state.pool.get().map_err(AppError::from)?;
    verify_database_integrity(&conn)?;
    let stats = get_database_stats(&conn)?;

    Ok(DatabaseStatsDto::new(
        state.database_path.display().to_string(),
        stats,
    ))
}

/// List catalog records, optionally only those with `status`
/// ("resolved", "unmatched" or "pending").
pub fn list_catalog(
    state: &AppState,
    status: Option<&str>,
) -> Result<Vec<CatalogRecordDto>, ErrorResponse> {
    let status = status
        .map(ResolutionStatus::from_str)
        .transpose()
        .map_err(|e| ErrorResponse::validation(e.to_string()))?;

    let records = state.catalog_repo.list_by_status(status)?;
    Ok(records.into_iter().map(CatalogRecordDto::from).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::error_handling::ErrorType;
    use crate::domain::{CatalogRecord, ResolutionOutcome, TmdbId};
    use crate::testing::{entry, test_config};

    #[test]
    fn test_list_catalog_by_status() {
        let dir = tempfile::tempdir().unwrap();
        let state = AppState::initialize(test_config(&dir.path().join("kuhaku.db"))).unwrap();

        let now = chrono::Utc::now();
        state
            .catalog_repo
            .bulk_insert(&[
                CatalogRecord::from_listing(
                    entry("Up", "/u"),
                    &ResolutionOutcome::Resolved(TmdbId::new(14160).unwrap()),
                    "cuevana",
                    "Kuhaku Scrapping",
                    now,
                ),
                CatalogRecord::from_listing(
                    entry("Inception", "/i"),
                    &ResolutionOutcome::Unavailable {
                        reason: "timeout".to_string(),
                    },
                    "cuevana",
                    "Kuhaku Scrapping",
                    now,
                ),
            ])
            .unwrap();

        assert_eq!(list_catalog(&state, None).unwrap().len(), 2);

        let pending = list_catalog(&state, Some("pending")).unwrap();
        assert_eq!(pending.len(), 1);
        assert_eq!(pending[0].title, "Inception");
        assert_eq!(pending[0].tmdb_id, None);

        let resolved = list_catalog(&state, Some("resolved")).unwrap();
        assert_eq!(resolved[0].tmdb_id, Some(14160));

        let err = list_catalog(&state, Some("done")).unwrap_err();
        assert_eq!(err.error_type, ErrorType::Validation);

        let stats = database_stats(&state).unwrap();
        assert_eq!(stats.catalog_records, 2);
        assert_eq!(stats.pending_records, 1);
    }
}
