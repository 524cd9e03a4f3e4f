// src/db/connection.rs
//
// SQLite connection pool
//
// Every pooled connection runs in WAL mode with a busy timeout: a harvest
// writing its batch and a CLI reader (or a second harvest) can share the
// file, and writers queue instead of failing with SQLITE_BUSY.

use std::path::{Path, PathBuf};
use std::time::Duration;

use r2d2::Pool;
use r2d2_sqlite::SqliteConnectionManager;

use crate::error::{AppError, AppResult};

pub type ConnectionPool = Pool<SqliteConnectionManager>;

const CONNECTION_PRAGMAS: &str = "PRAGMA foreign_keys = ON;
     PRAGMA journal_mode = WAL;
     PRAGMA synchronous = NORMAL;
     PRAGMA busy_timeout = 5000;";

/// `{APP_DATA}/kuhaku/kuhaku.db`
pub fn get_database_path() -> AppResult<PathBuf> {
    let app_data_dir = dirs::data_dir()
        .ok_or_else(|| AppError::Other("Could not determine app data directory".to_string()))?;

    Ok(app_data_dir.join("kuhaku").join("kuhaku.db"))
}

/// Open a pool of at most `max_size` connections to `db_path`,
/// creating the parent directory when missing.
pub fn create_connection_pool(db_path: &Path, max_size: u32) -> AppResult<ConnectionPool> {
    if let Some(parent) = db_path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }

    let manager = SqliteConnectionManager::file(db_path)
        .with_init(|conn| conn.execute_batch(CONNECTION_PRAGMAS));

    let pool = Pool::builder()
        .max_size(max_size)
        .connection_timeout(Duration::from_secs(10))
        .build(manager)
        .map_err(|e| {
            AppError::Pool(format!("Cannot open database {}: {}", db_path.display(), e))
        })?;

    log::debug!("Connection pool ready at {} (max {})", db_path.display(), max_size);

    Ok(pool)
}

/// In-memory database with the same foreign key setting as the pool
#[cfg(test)]
pub fn create_test_connection() -> AppResult<rusqlite::Connection> {
    let conn = rusqlite::Connection::open_in_memory()?;
    conn.execute_batch("PRAGMA foreign_keys = ON;")?;
    Ok(conn)
}
