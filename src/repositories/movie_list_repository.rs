// src/repositories/movie_list_repository.rs
//
// Materialized movie list persistence. Row order (position) is the list order.

use std::sync::Arc;
use chrono::NaiveDate;
use rusqlite::{params, Row, Transaction};

use super::conversions::{tmdb_from_sql, tmdb_to_sql};
use crate::db::ConnectionPool;
use crate::domain::{validate_movie_list_entry, MovieListEntry};
use crate::error::AppResult;

#[cfg_attr(test, mockall::automock)]
pub trait MovieListRepository: Send + Sync {
    fn list_all(&self) -> AppResult<Vec<MovieListEntry>>;

    /// Append entries at the end of the list, in the given order
    fn save_all(&self, entries: &[MovieListEntry]) -> AppResult<usize>;

    /// Swap the whole list for `entries` in one transaction.
    /// On failure the previous list is left untouched.
    fn replace_all(&self, entries: &[MovieListEntry]) -> AppResult<usize>;
}

pub struct SqliteMovieListRepository {
    pool: Arc<ConnectionPool>,
}

impl SqliteMovieListRepository {
    pub fn new(pool: Arc<ConnectionPool>) -> Self {
        Self { pool }
    }

    fn row_to_entry(row: &Row) -> Result<MovieListEntry, rusqlite::Error> {
        let tmdb_id = tmdb_from_sql(row.get("tmdb_id")?)?;

        let release_date = row
            .get::<_, Option<String>>("release_date")?
            .map(|s| {
                NaiveDate::parse_from_str(&s, "%Y-%m-%d")
                    .map_err(|e| rusqlite::Error::ToSqlConversionFailure(Box::new(e)))
            })
            .transpose()?;

        let genre_ids: Vec<u32> = serde_json::from_str(&row.get::<_, String>("genre_ids")?)
            .map_err(|e| rusqlite::Error::ToSqlConversionFailure(Box::new(e)))?;

        Ok(MovieListEntry {
            tmdb_id,
            title: row.get("title")?,
            overview: row.get("overview")?,
            poster_path: row.get("poster_path")?,
            release_date,
            vote_average: row.get("vote_average")?,
            genre_ids,
        })
    }
}

impl MovieListRepository for SqliteMovieListRepository {
    fn list_all(&self) -> AppResult<Vec<MovieListEntry>> {
        let conn = self.pool.get()?;

        let mut stmt = conn.prepare(
            "SELECT tmdb_id, title, overview, poster_path, release_date, vote_average, genre_ids
             FROM movie_list
             ORDER BY position",
        )?;

        let entries = stmt
            .query_map([], Self::row_to_entry)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(entries)
    }

    fn save_all(&self, entries: &[MovieListEntry]) -> AppResult<usize> {
        for entry in entries {
            validate_movie_list_entry(entry)?;
        }

        let mut conn = self.pool.get()?;
        let tx = conn.transaction()?;
        insert_entries(&tx, entries)?;
        tx.commit()?;

        Ok(entries.len())
    }

    fn replace_all(&self, entries: &[MovieListEntry]) -> AppResult<usize> {
        for entry in entries {
            validate_movie_list_entry(entry)?;
        }

        let mut conn = self.pool.get()?;
        let tx = conn.transaction()?;
        let removed = tx.execute("DELETE FROM movie_list", [])?;
        insert_entries(&tx, entries)?;
        tx.commit()?;

        log::debug!("Movie list replaced: {} removed, {} added", removed, entries.len());
        Ok(entries.len())
    }
}

/// Append `entries` after the current last position
fn insert_entries(tx: &Transaction, entries: &[MovieListEntry]) -> AppResult<()> {
    let mut stmt = tx.prepare(
        "INSERT INTO movie_list
            (tmdb_id, title, overview, poster_path, release_date, vote_average, genre_ids)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
    )?;

    for entry in entries {
        stmt.execute(params![
            tmdb_to_sql(entry.tmdb_id)?,
            entry.title,
            entry.overview,
            entry.poster_path,
            entry.release_date.map(|d| d.format("%Y-%m-%d").to_string()),
            entry.vote_average,
            serde_json::to_string(&entry.genre_ids)?,
        ])?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::TmdbId;
    use crate::testing::temp_pool;

    #[test]
    fn test_save_and_list_preserves_order() {
        let (_dir, pool) = temp_pool();
        let repo = SqliteMovieListRepository::new(pool);

        let mut dune = MovieListEntry::new("Dune", NaiveDate::from_ymd_opt(2021, 10, 22));
        dune.genre_ids = vec![878, 12];
        dune.tmdb_id = Some(TmdbId::new(438631).unwrap());
        let up = MovieListEntry::new("Up", NaiveDate::from_ymd_opt(2009, 5, 29));

        assert_eq!(repo.save_all(&[dune.clone(), up.clone()]).unwrap(), 2);

        let listed = repo.list_all().unwrap();
        assert_eq!(listed, vec![dune, up]);
    }

    #[test]
    fn test_invalid_entry_is_rejected() {
        let (_dir, pool) = temp_pool();
        let repo = SqliteMovieListRepository::new(pool);

        let mut bad = MovieListEntry::new("Up", None);
        bad.vote_average = Some(11.0);

        assert!(repo.save_all(&[bad]).is_err());
        assert!(repo.list_all().unwrap().is_empty());
    }

    #[test]
    fn test_replace_all_swaps_list() {
        let (_dir, pool) = temp_pool();
        let repo = SqliteMovieListRepository::new(pool);

        repo.save_all(&[MovieListEntry::new("Up", None), MovieListEntry::new("Dune", None)])
            .unwrap();
        assert_eq!(repo.replace_all(&[MovieListEntry::new("Alien", None)]).unwrap(), 1);

        let titles: Vec<_> = repo.list_all().unwrap().into_iter().map(|m| m.title).collect();
        assert_eq!(titles, vec!["Alien"]);
    }

    #[test]
    fn test_failed_replace_keeps_previous_list() {
        let (_dir, pool) = temp_pool();
        let repo = SqliteMovieListRepository::new(Arc::clone(&pool));
        repo.save_all(&[MovieListEntry::new("Up", None)]).unwrap();

        // Fail the insert after the DELETE has already run inside the transaction
        pool.get()
            .unwrap()
            .execute_batch(
                "CREATE TRIGGER reject_broken BEFORE INSERT ON movie_list
                 WHEN NEW.title = 'Broken'
                 BEGIN SELECT RAISE(ABORT, 'rejected'); END;",
            )
            .unwrap();

        let result = repo.replace_all(&[
            MovieListEntry::new("Alien", None),
            MovieListEntry::new("Broken", None),
        ]);
        assert!(result.is_err());

        let titles: Vec<_> = repo.list_all().unwrap().into_iter().map(|m| m.title).collect();
        assert_eq!(titles, vec!["Up"]);
    }

    #[test]
    fn test_invalid_replacement_is_rejected_before_writing() {
        let (_dir, pool) = temp_pool();
        let repo = SqliteMovieListRepository::new(pool);
        repo.save_all(&[MovieListEntry::new("Up", None)]).unwrap();

        let mut bad = MovieListEntry::new("Dune", None);
        bad.vote_average = Some(-1.0);

        assert!(repo.replace_all(&[MovieListEntry::new("Alien", None), bad]).is_err());
        assert_eq!(repo.list_all().unwrap().len(), 1);
    }
}
