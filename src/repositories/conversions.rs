// src/repositories/conversions.rs
//
// Column conversions shared by the SQLite repositories.
// SQLite integers are i64; TMDB ids are positive u64. Neither direction casts.

use rusqlite::types::FromSqlError;

use crate::domain::TmdbId;
use crate::error::{AppError, AppResult};

pub(crate) fn tmdb_to_sql(id: Option<TmdbId>) -> AppResult<Option<i64>> {
    id.map(|id| {
        i64::try_from(id.get())
            .map_err(|_| AppError::Other(format!("TMDB id {} does not fit in storage", id)))
    })
    .transpose()
}

/// Read a stored TMDB id; negative or zero values are a conversion failure.
pub(crate) fn tmdb_from_sql(raw: Option<i64>) -> Result<Option<TmdbId>, rusqlite::Error> {
    raw.map(|raw| {
        let value = u64::try_from(raw).map_err(|_| FromSqlError::OutOfRange(raw))?;
        TmdbId::new(value).map_err(|e| FromSqlError::Other(Box::new(e)))
    })
    .transpose()
    .map_err(|e| rusqlite::Error::FromSqlConversionFailure(0, rusqlite::types::Type::Integer, Box::new(e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tmdb_id_columns() {
        let id = TmdbId::new(27205).unwrap();
        assert_eq!(tmdb_to_sql(Some(id)).unwrap(), Some(27205));
        assert_eq!(tmdb_to_sql(None).unwrap(), None);

        assert_eq!(tmdb_from_sql(Some(27205)).unwrap(), Some(id));
        assert_eq!(tmdb_from_sql(None).unwrap(), None);
        assert!(tmdb_from_sql(Some(0)).is_err());
        assert!(tmdb_from_sql(Some(-4)).is_err());
    }

    #[test]
    fn test_oversized_id_is_not_stored() {
        let huge = TmdbId::new(u64::MAX).unwrap();
        assert!(tmdb_to_sql(Some(huge)).is_err());
    }
}
