// src/testing.rs
//
// Shared fixtures for unit tests: file-backed databases and listing builders.

use std::sync::Arc;

use tempfile::TempDir;

use crate::db::{create_connection_pool, initialize_database, ConnectionPool};
use crate::domain::{CatalogRecord, RawListingEntry};
use crate::repositories::CatalogRepository;

/// A fresh, initialized SQLite database in a temporary directory.
/// Keep the `TempDir` alive for as long as the pool is used.
pub fn temp_pool() -> (TempDir, Arc<ConnectionPool>) {
    let dir = tempfile::tempdir().expect("create temp dir");
    let pool = create_connection_pool(&dir.path().join("kuhaku-test.db"), 4)
        .expect("create pool");
    {
        let conn = pool.get().expect("get connection");
        initialize_database(&conn).expect("initialize schema");
    }
    (dir, Arc::new(pool))
}

pub fn entry(title: &str, link: &str) -> RawListingEntry {
    RawListingEntry::new(title, link)
}

/// `count` distinct entries: "Movie 1" .. "Movie N" linking to /m/1 .. /m/N
pub fn numbered_entries(count: usize) -> Vec<RawListingEntry> {
    (1..=count)
        .map(|i| RawListingEntry::new(format!("Movie {}", i), format!("/m/{}", i)))
        .collect()
}

/// The stored record for `title`/`link`, matched by natural key
pub fn stored_record(repo: &dyn CatalogRepository, title: &str, link: &str) -> CatalogRecord {
    let key = entry(title, link).natural_key();
    repo.list_by_status(None)
        .expect("list catalog")
        .into_iter()
        .find(|r| r.natural_key() == key)
        .unwrap_or_else(|| panic!("no record stored for {}", key))
}

/// Configuration pointing at `db_path`, with a placeholder TMDB key
pub fn test_config(db_path: &std::path::Path) -> crate::config::AppConfig {
    use crate::config::{AppConfig, DatabaseConfig, HarvestConfig, ListingConfig, TmdbConfig};

    AppConfig {
        database: DatabaseConfig {
            path: Some(db_path.to_path_buf()),
            max_connections: 4,
        },
        listing: ListingConfig {
            url_template: "http://127.0.0.1:9/peliculas/page/{page}".to_string(),
            max_pages: 1,
            source: "cuevana".to_string(),
            user_agent: "kuhaku-test".to_string(),
            timeout_secs: 1,
        },
        tmdb: TmdbConfig {
            api_key: "test-key".to_string(),
            base_url: "http://127.0.0.1:9".to_string(),
            language: None,
            min_interval_ms: 0,
            timeout_secs: 1,
        },
        harvest: HarvestConfig {
            provenance: "Kuhaku Scrapping".to_string(),
            resolver_concurrency: 2,
        },
    }
}
