// src/application/dto/mod.rs
//
// Data Transfer Objects
//
// CRITICAL PRINCIPLES:
// - DTOs are output-friendly representations (plain strings and numbers)
// - DTOs NEVER leak domain invariants
// - Conversion FROM domain types, except the movie import DTO which is
//   validated on the way in

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::db::DatabaseStats;
use crate::domain::{CatalogRecord, MovieListEntry, TmdbId};
use crate::error::AppResult;
use crate::services::{HarvestReport, ReResolutionReport};

// ============================================================================
// HARVEST DTOs
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HarvestReportDto {
    pub run_id: String,
    pub stage: String,
    pub fetched: usize,
    pub pages_failed: u32,
    pub skipped_existing: usize,
    pub resolved: usize,
    pub unresolved: usize,
    pub unmatched: usize,
    pub pending: usize,
    pub persisted: usize,
    pub duplicates_ignored: usize,
    pub started_at: String,
    pub finished_at: Option<String>,
}

impl From<&HarvestReport> for HarvestReportDto {
    fn from(report: &HarvestReport) -> Self {
        Self {
            run_id: report.run_id.to_string(),
            stage: report.stage.to_string(),
            fetched: report.fetched,
            pages_failed: report.pages_failed,
            skipped_existing: report.skipped_existing,
            resolved: report.resolved,
            unresolved: report.unresolved,
            unmatched: report.unmatched,
            pending: report.pending,
            persisted: report.persisted,
            duplicates_ignored: report.duplicates_ignored,
            started_at: report.started_at.to_rfc3339(),
            finished_at: report.finished_at.map(|t| t.to_rfc3339()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReResolutionReportDto {
    pub examined: usize,
    pub resolved: usize,
    pub unmatched: usize,
    pub still_pending: usize,
}

impl From<ReResolutionReport> for ReResolutionReportDto {
    fn from(report: ReResolutionReport) -> Self {
        Self {
            examined: report.examined,
            resolved: report.resolved,
            unmatched: report.unmatched,
            still_pending: report.still_pending,
        }
    }
}

// ============================================================================
// CATALOG DTOs
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogRecordDto {
    pub id: String,
    pub title: String,
    pub link: String,
    pub poster: Option<String>,
    pub overview: Option<String>,
    pub tmdb_id: Option<u64>,
    pub resolution_status: String,
    pub source: String,
    pub created_by: String,
    pub created_at: String,
}

impl From<CatalogRecord> for CatalogRecordDto {
    fn from(record: CatalogRecord) -> Self {
        Self {
            id: record.id.to_string(),
            title: record.title,
            link: record.link,
            poster: record.poster,
            overview: record.overview,
            tmdb_id: record.tmdb_id.map(TmdbId::get),
            resolution_status: record.resolution_status.to_string(),
            source: record.source,
            created_by: record.created_by,
            created_at: record.created_at.to_rfc3339(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseStatsDto {
    pub path: String,
    pub size_bytes: i64,
    pub catalog_records: i64,
    pub pending_records: i64,
    pub movie_list_entries: i64,
}

impl DatabaseStatsDto {
    pub fn new(path: String, stats: DatabaseStats) -> Self {
        Self {
            path,
            size_bytes: stats.size_bytes,
            catalog_records: stats.catalog_count,
            pending_records: stats.pending_count,
            movie_list_entries: stats.movie_list_count,
        }
    }
}

// ============================================================================
// MOVIE LIST DTOs
// ============================================================================

/// Movie preview as exchanged in JSON files (TMDB field names).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MovieListEntryDto {
    #[serde(default, rename = "id")]
    pub tmdb_id: Option<u64>,
    pub title: String,
    #[serde(default)]
    pub overview: Option<String>,
    #[serde(default)]
    pub poster_path: Option<String>,
    /// `YYYY-MM-DD`; empty string means unknown
    #[serde(default)]
    pub release_date: Option<String>,
    #[serde(default)]
    pub vote_average: Option<f64>,
    #[serde(default)]
    pub genre_ids: Vec<u32>,
}

impl From<MovieListEntry> for MovieListEntryDto {
    fn from(entry: MovieListEntry) -> Self {
        Self {
            tmdb_id: entry.tmdb_id.map(TmdbId::get),
            title: entry.title,
            overview: entry.overview,
            poster_path: entry.poster_path,
            release_date: entry.release_date.map(|d| d.format("%Y-%m-%d").to_string()),
            vote_average: entry.vote_average,
            genre_ids: entry.genre_ids,
        }
    }
}

impl MovieListEntryDto {
    pub fn into_domain(self) -> AppResult<MovieListEntry> {
        let tmdb_id = self.tmdb_id.map(TmdbId::new).transpose()?;

        let release_date = match self.release_date.as_deref().map(str::trim) {
            None | Some("") => None,
            Some(raw) => Some(NaiveDate::parse_from_str(raw, "%Y-%m-%d")?),
        };

        Ok(MovieListEntry {
            tmdb_id,
            title: self.title,
            overview: self.overview,
            poster_path: self.poster_path,
            release_date,
            vote_average: self.vote_average,
            genre_ids: self.genre_ids,
        })
    }
}
