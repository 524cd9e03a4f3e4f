// src/db/migrations.rs
//
// Schema versioning
//
// Migrations are an ordered list; entry N brings the schema to version N + 1.
// Each one runs in its own IMMEDIATE transaction together with its
// `schema_version` row, so two processes opening a fresh database serialize
// instead of half-applying the schema. Migration SQL must be idempotent
// (`IF NOT EXISTS`): the loser of that race replays it harmlessly.

use rusqlite::Connection;
use crate::error::{AppError, AppResult};

const MIGRATIONS: &[&str] = &[
    // 1: catalog_records + movie_list
    include_str!("../../schema.sql"),
];

/// Bring the schema up to the latest version. Safe to call on every start.
pub fn initialize_database(conn: &Connection) -> AppResult<()> {
    let latest = MIGRATIONS.len() as i32;
    let current = get_schema_version(conn)?;

    if current > latest {
        return Err(AppError::Other(format!(
            "Database schema version {} is newer than this build supports ({})",
            current, latest
        )));
    }

    for (index, sql) in MIGRATIONS.iter().enumerate().skip(current as usize) {
        let version = index as i32 + 1;
        apply_migration(conn, version, sql)?;
        log::info!("Database schema migrated to version {}", version);
    }

    Ok(())
}

/// 0 for a database that has never been initialized
fn get_schema_version(conn: &Connection) -> AppResult<i32> {
    let tracked: bool = conn.query_row(
        "SELECT EXISTS(SELECT 1 FROM sqlite_master WHERE type = 'table' AND name = 'schema_version')",
        [],
        |row| row.get(0),
    )?;

    if !tracked {
        return Ok(0);
    }

    let version: Option<i32> =
        conn.query_row("SELECT MAX(version) FROM schema_version", [], |row| row.get(0))?;

    Ok(version.unwrap_or(0))
}

fn apply_migration(conn: &Connection, version: i32, sql: &str) -> AppResult<()> {
    conn.execute_batch("BEGIN IMMEDIATE")?;

    let applied = conn.execute_batch(sql).and_then(|_| {
        conn.execute(
            "INSERT OR IGNORE INTO schema_version (version, applied_at) VALUES (?1, datetime('now'))",
            [version],
        )
    });

    match applied {
        Ok(_) => {
            conn.execute_batch("COMMIT")?;
            Ok(())
        }
        Err(e) => {
            if let Err(rollback) = conn.execute_batch("ROLLBACK") {
                log::error!("Rollback of migration {} failed: {}", version, rollback);
            }
            Err(AppError::Other(format!("Migration {} failed: {}", version, e)))
        }
    }
}

/// Fails unless SQLite's `PRAGMA integrity_check` answers "ok"
pub fn verify_database_integrity(conn: &Connection) -> AppResult<()> {
    let verdict: String = conn.query_row("PRAGMA integrity_check", [], |row| row.get(0))?;

    if verdict != "ok" {
        return Err(AppError::Other(format!("Database integrity check failed: {}", verdict)));
    }

    Ok(())
}

fn count(conn: &Connection, sql: &str) -> AppResult<i64> {
    Ok(conn.query_row(sql, [], |row| row.get(0))?)
}

/// Size and row counts of the catalog database
pub fn get_database_stats(conn: &Connection) -> AppResult<DatabaseStats> {
    let page_count = count(conn, "PRAGMA page_count")?;
    let page_size = count(conn, "PRAGMA page_size")?;

    Ok(DatabaseStats {
        size_bytes: page_count * page_size,
        page_count,
        page_size,
        catalog_count: count(conn, "SELECT COUNT(*) FROM catalog_records")?,
        pending_count: count(
            conn,
            "SELECT COUNT(*) FROM catalog_records WHERE resolution_status = 'pending'",
        )?,
        movie_list_count: count(conn, "SELECT COUNT(*) FROM movie_list")?,
    })
}

#[derive(Debug, Clone, serde::Serialize)]
pub struct DatabaseStats {
    pub size_bytes: i64,
    pub page_count: i64,
    pub page_size: i64,
    pub catalog_count: i64,
    pub pending_count: i64,
    pub movie_list_count: i64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::connection::create_test_connection;

    #[test]
    fn test_initialize_fresh_database() {
        let conn = create_test_connection().unwrap();

        assert_eq!(get_schema_version(&conn).unwrap(), 0);

        initialize_database(&conn).unwrap();

        assert_eq!(get_schema_version(&conn).unwrap(), 1);

        let table_count: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM sqlite_master WHERE type='table' AND name IN ('catalog_records', 'movie_list')",
                [],
                |row| row.get(0)
            )
            .unwrap();
        assert_eq!(table_count, 2);
    }

    #[test]
    fn test_initialize_idempotent() {
        let conn = create_test_connection().unwrap();

        initialize_database(&conn).unwrap();
        initialize_database(&conn).unwrap();

        assert_eq!(get_schema_version(&conn).unwrap(), 1);
    }

    #[test]
    fn test_newer_schema_is_refused() {
        let conn = create_test_connection().unwrap();
        initialize_database(&conn).unwrap();
        conn.execute(
            "INSERT INTO schema_version (version, applied_at) VALUES (99, datetime('now'))",
            [],
        )
        .unwrap();

        let err = initialize_database(&conn).unwrap_err();
        assert!(err.to_string().contains("newer"));
    }

    #[test]
    fn test_natural_key_is_unique() {
        let conn = create_test_connection().unwrap();
        initialize_database(&conn).unwrap();

        let insert = "INSERT INTO catalog_records
            (id, title, link, title_key, link_key, resolution_status, source, created_by, created_at)
            VALUES (?1, 'Up', '/u', 'up', '/u', 'unmatched', 'cuevana', 'test', datetime('now'))";

        conn.execute(insert, ["a"]).unwrap();
        let result = conn.execute(insert, ["b"]);

        assert!(result.is_err(), "UNIQUE(title_key, link_key) should have been violated");
    }

    #[test]
    fn test_zero_tmdb_id_is_rejected() {
        let conn = create_test_connection().unwrap();
        initialize_database(&conn).unwrap();

        let result = conn.execute(
            "INSERT INTO catalog_records
             (id, title, link, title_key, link_key, tmdb_id, resolution_status, source, created_by, created_at)
             VALUES ('x', 'Up', '/u', 'up', '/u', 0, 'resolved', 'cuevana', 'test', datetime('now'))",
            [],
        );

        assert!(result.is_err(), "tmdb_id = 0 must never be stored");
    }

    #[test]
    fn test_database_stats() {
        let conn = create_test_connection().unwrap();
        initialize_database(&conn).unwrap();

        let stats = get_database_stats(&conn).unwrap();

        assert!(stats.size_bytes > 0);
        assert_eq!(stats.catalog_count, 0);
        assert_eq!(stats.pending_count, 0);
        assert_eq!(stats.movie_list_count, 0);
    }

    #[test]
    fn test_integrity_check() {
        let conn = create_test_connection().unwrap();
        initialize_database(&conn).unwrap();

        verify_database_integrity(&conn).unwrap();
    }
}
