// src/application/commands/harvest_commands.rs
//
// Harvest Command Handlers
//
// RULES:
// - Call services
// - Return DTOs
// - Never contain business logic

use tokio_util::sync::CancellationToken;

use crate::application::dto::{HarvestReportDto, ReResolutionReportDto};
use crate::application::error_handling::ErrorResponse;
use crate::application::state::AppState;

/// Run one harvest: fetch the listing, reconcile, persist the delta.
pub async fn run_harvest(
    state: &AppState,
    cancel: CancellationToken,
) -> Result<HarvestReportDto, ErrorResponse> {
    let service = state.harvest_service()?;
    let report = service.run(&cancel).await?;
    Ok(HarvestReportDto::from(&report))
}

/// Retry TMDB resolution for up to `limit` pending records.
pub async fn reresolve_pending(
    state: &AppState,
    limit: usize,
    cancel: CancellationToken,
) -> Result<ReResolutionReportDto, ErrorResponse> {
    if limit == 0 {
        return Err(ErrorResponse::validation("limit must be at least 1".to_string()));
    }

    let service = state.reresolution_service()?;
    let report = service.reresolve_pending(limit, &cancel).await?;
    Ok(ReResolutionReportDto::from(report))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::error_handling::ErrorType;
    use crate::testing::test_config;

    #[tokio::test]
    async fn test_harvest_requires_tmdb_key() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = test_config(&dir.path().join("kuhaku.db"));
        config.tmdb.api_key = String::new();
        let state = AppState::initialize(config).unwrap();

        let err = run_harvest(&state, CancellationToken::new()).await.unwrap_err();
        assert_eq!(err.error_type, ErrorType::Configuration);
        assert!(err.report.is_none());
    }

    #[tokio::test]
    async fn test_cancelled_harvest_reports_partial_counts() {
        let dir = tempfile::tempdir().unwrap();
        let state = AppState::initialize(test_config(&dir.path().join("kuhaku.db"))).unwrap();

        let cancel = CancellationToken::new();
        cancel.cancel();

        let err = run_harvest(&state, cancel).await.unwrap_err();
        assert_eq!(err.error_type, ErrorType::Cancelled);
        let report = err.report.unwrap();
        assert_eq!(report.stage, "cancelled");
        assert_eq!(report.persisted, 0);
    }

    #[tokio::test]
    async fn test_reresolve_with_nothing_pending() {
        let dir = tempfile::tempdir().unwrap();
        let state = AppState::initialize(test_config(&dir.path().join("kuhaku.db"))).unwrap();

        let report = reresolve_pending(&state, 10, CancellationToken::new())
            .await
            .unwrap();
        assert_eq!(report.examined, 0);

        let err = reresolve_pending(&state, 0, CancellationToken::new())
            .await
            .unwrap_err();
        assert_eq!(err.error_type, ErrorType::Validation);
    }
}
