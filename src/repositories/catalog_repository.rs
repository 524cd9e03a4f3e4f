// src/repositories/catalog_repository.rs
//
// Catalog persistence
//
// The UNIQUE(title_key, link_key) constraint is the authority on duplicates.
// `exists_by_natural_key` is a cheap pre-check; `bulk_insert` absorbs
// constraint conflicts instead of failing, and reports them.

use std::sync::Arc;
use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::{params, Row};
use serde::Serialize;
use uuid::Uuid;

use super::conversions::{tmdb_from_sql, tmdb_to_sql};
use crate::db::ConnectionPool;
use crate::domain::{
    validate_catalog_record, CatalogRecord, NaturalKey, ResolutionOutcome, ResolutionStatus,
};
use crate::error::AppResult;

/// Result of a bulk insert that committed
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct BulkInsertOutcome {
    /// Rows written
    pub inserted: usize,
    /// Rows rejected by the natural-key constraint (inserted by someone else first)
    pub duplicates: usize,
}

#[cfg_attr(test, mockall::automock)]
pub trait CatalogRepository: Send + Sync {
    fn exists_by_natural_key(&self, key: &NaturalKey) -> AppResult<bool>;

    /// Insert all records in one transaction. Either every non-duplicate
    /// record is committed or none is.
    fn bulk_insert(&self, records: &[CatalogRecord]) -> AppResult<BulkInsertOutcome>;

    fn list_by_status(&self, status: Option<ResolutionStatus>) -> AppResult<Vec<CatalogRecord>>;
    fn list_pending(&self, limit: usize) -> AppResult<Vec<CatalogRecord>>;

    /// Attach a resolution to a `pending` record.
    /// Returns false when the record is no longer pending.
    fn update_resolution(&self, id: Uuid, outcome: &ResolutionOutcome) -> AppResult<bool>;

    fn count(&self) -> AppResult<usize>;
}

pub struct SqliteCatalogRepository {
    pool: Arc<ConnectionPool>,
}

const SELECT_COLUMNS: &str = "SELECT id, title, link, poster, overview, tmdb_id,
        resolution_status, source, created_by, created_at
    FROM catalog_records";

impl SqliteCatalogRepository {
    pub fn new(pool: Arc<ConnectionPool>) -> Self {
        Self { pool }
    }

    /// Map database row to CatalogRecord - returns rusqlite::Error for query_map compatibility
    fn row_to_record(row: &Row) -> Result<CatalogRecord, rusqlite::Error> {
        let id = Uuid::parse_str(&row.get::<_, String>("id")?)
            .map_err(|e| rusqlite::Error::ToSqlConversionFailure(Box::new(e)))?;

        let tmdb_id = tmdb_from_sql(row.get("tmdb_id")?)?;

        let resolution_status = row
            .get::<_, String>("resolution_status")?
            .parse::<ResolutionStatus>()
            .map_err(|e| rusqlite::Error::ToSqlConversionFailure(Box::new(e)))?;

        let created_at = DateTime::parse_from_rfc3339(&row.get::<_, String>("created_at")?)
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(|e| rusqlite::Error::ToSqlConversionFailure(Box::new(e)))?;

        Ok(CatalogRecord {
            id,
            title: row.get("title")?,
            link: row.get("link")?,
            poster: row.get("poster")?,
            overview: row.get("overview")?,
            tmdb_id,
            resolution_status,
            source: row.get("source")?,
            created_by: row.get("created_by")?,
            created_at,
        })
    }
}

impl CatalogRepository for SqliteCatalogRepository {
    fn exists_by_natural_key(&self, key: &NaturalKey) -> AppResult<bool> {
        let conn = self.pool.get()?;

        let exists: bool = conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM catalog_records WHERE title_key = ?1 AND link_key = ?2)",
            params![key.title_key, key.link_key],
            |row| row.get(0),
        )?;

        Ok(exists)
    }

    fn bulk_insert(&self, records: &[CatalogRecord]) -> AppResult<BulkInsertOutcome> {
        for record in records {
            validate_catalog_record(record)?;
        }

        let mut conn = self.pool.get()?;
        let tx = conn.transaction()?;
        let mut outcome = BulkInsertOutcome::default();

        {
            let mut stmt = tx.prepare(
                "INSERT INTO catalog_records (
                    id, title, link, title_key, link_key, poster, overview, tmdb_id,
                    resolution_status, source, created_by, created_at
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)
                ON CONFLICT (title_key, link_key) DO NOTHING",
            )?;

            for record in records {
                let key = record.natural_key();
                let written = stmt.execute(params![
                    record.id.to_string(),
                    record.title,
                    record.link,
                    key.title_key,
                    key.link_key,
                    record.poster,
                    record.overview,
                    tmdb_to_sql(record.tmdb_id)?,
                    record.resolution_status.to_string(),
                    record.source,
                    record.created_by,
                    record.created_at.to_rfc3339_opts(SecondsFormat::Micros, true),
                ])?;

                if written == 0 {
                    log::debug!("Natural key {} already stored, not inserted", key);
                    outcome.duplicates += 1;
                } else {
                    outcome.inserted += 1;
                }
            }
        }

        tx.commit()?;

        Ok(outcome)
    }

    fn list_by_status(&self, status: Option<ResolutionStatus>) -> AppResult<Vec<CatalogRecord>> {
        let conn = self.pool.get()?;

        let records = match status {
            Some(status) => {
                let mut stmt = conn.prepare(&format!(
                    "{} WHERE resolution_status = ?1 ORDER BY rowid",
                    SELECT_COLUMNS
                ))?;
                let rows = stmt
                    .query_map(params![status.to_string()], Self::row_to_record)?
                    .collect::<Result<Vec<_>, _>>()?;
                rows
            }
            None => {
                let mut stmt =
                    conn.prepare(&format!("{} ORDER BY rowid", SELECT_COLUMNS))?;
                let rows = stmt
                    .query_map([], Self::row_to_record)?
                    .collect::<Result<Vec<_>, _>>()?;
                rows
            }
        };

        Ok(records)
    }

    fn list_pending(&self, limit: usize) -> AppResult<Vec<CatalogRecord>> {
        let conn = self.pool.get()?;

        let mut stmt = conn.prepare(&format!(
            "{} WHERE resolution_status = 'pending' ORDER BY rowid LIMIT ?1",
            SELECT_COLUMNS
        ))?;

        let limit = i64::try_from(limit).unwrap_or(i64::MAX);
        let records = stmt
            .query_map(params![limit], Self::row_to_record)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(records)
    }

    fn update_resolution(&self, id: Uuid, outcome: &ResolutionOutcome) -> AppResult<bool> {
        let conn = self.pool.get()?;

        let rows_affected = conn.execute(
            "UPDATE catalog_records
             SET tmdb_id = ?1, resolution_status = ?2
             WHERE id = ?3 AND resolution_status = 'pending'",
            params![
                tmdb_to_sql(outcome.tmdb_id())?,
                outcome.status().to_string(),
                id.to_string(),
            ],
        )?;

        Ok(rows_affected > 0)
    }

    fn count(&self) -> AppResult<usize> {
        let conn = self.pool.get()?;

        let count: i64 =
            conn.query_row("SELECT COUNT(*) FROM catalog_records", [], |row| row.get(0))?;

        Ok(count as usize)
    }
}
