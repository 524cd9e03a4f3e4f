use super::entity::CatalogRecord;
use crate::domain::resolution::ResolutionStatus;
use crate::domain::{DomainError, DomainResult};

/// Validates all CatalogRecord invariants
pub fn validate_catalog_record(record: &CatalogRecord) -> DomainResult<()> {
    if record.title.trim().is_empty() {
        return Err(DomainError::InvariantViolation(
            "Catalog record title cannot be empty".to_string(),
        ));
    }

    if record.link.trim().is_empty() {
        return Err(DomainError::InvariantViolation(
            "Catalog record link cannot be empty".to_string(),
        ));
    }

    if record.created_by.trim().is_empty() {
        return Err(DomainError::InvariantViolation(
            "Catalog record provenance cannot be empty".to_string(),
        ));
    }

    validate_resolution(record)
}

/// Identifier presence must agree with the resolution status
fn validate_resolution(record: &CatalogRecord) -> DomainResult<()> {
    match (record.resolution_status, record.tmdb_id) {
        (ResolutionStatus::Resolved, None) => Err(DomainError::InvariantViolation(format!(
            "Record '{}' is marked resolved without a TMDB id",
            record.title
        ))),
        (ResolutionStatus::Unmatched | ResolutionStatus::Pending, Some(id)) => {
            Err(DomainError::InvariantViolation(format!(
                "Record '{}' carries TMDB id {} but is {}",
                record.title, id, record.resolution_status
            )))
        }
        _ => Ok(()),
    }
}

/// Invariants that must hold true for CatalogRecord:
///
/// 1. Title and link are never empty
/// 2. (canonical title, canonical link) is unique in storage
/// 3. A TMDB id is present if and only if the status is `resolved`
/// 4. Provenance is always stamped
/// 5. Created timestamp never changes

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::listing::RawListingEntry;
    use crate::domain::resolution::{ResolutionOutcome, TmdbId};
    use chrono::Utc;

    fn record(outcome: ResolutionOutcome) -> CatalogRecord {
        CatalogRecord::from_listing(
            RawListingEntry::new("Inception", "/i"),
            &outcome,
            "cuevana",
            "Kuhaku Scrapping",
            Utc::now(),
        )
    }

    #[test]
    fn test_valid_records() {
        let id = TmdbId::new(27205).unwrap();
        assert!(validate_catalog_record(&record(ResolutionOutcome::Resolved(id))).is_ok());
        assert!(validate_catalog_record(&record(ResolutionOutcome::NoMatch)).is_ok());
        assert!(validate_catalog_record(&record(ResolutionOutcome::Unavailable {
            reason: "offline".to_string()
        }))
        .is_ok());
    }

    #[test]
    fn test_empty_title_fails() {
        let mut r = record(ResolutionOutcome::NoMatch);
        r.title = "  ".to_string();
        assert!(validate_catalog_record(&r).is_err());
    }

    #[test]
    fn test_status_and_id_must_agree() {
        let mut r = record(ResolutionOutcome::NoMatch);
        r.tmdb_id = Some(TmdbId::new(5).unwrap());
        assert!(validate_catalog_record(&r).is_err());

        let mut r = record(ResolutionOutcome::Resolved(TmdbId::new(5).unwrap()));
        r.tmdb_id = None;
        assert!(validate_catalog_record(&r).is_err());
    }
}
