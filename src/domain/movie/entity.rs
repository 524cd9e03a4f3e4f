use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::domain::resolution::TmdbId;

/// A movie in a materialized movie list.
/// Shape follows the TMDB movie preview (title, dates, genres, score).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MovieListEntry {
    pub tmdb_id: Option<TmdbId>,
    pub title: String,
    #[serde(default)]
    pub overview: Option<String>,
    #[serde(default)]
    pub poster_path: Option<String>,
    #[serde(default)]
    pub release_date: Option<NaiveDate>,
    #[serde(default)]
    pub vote_average: Option<f64>,
    #[serde(default)]
    pub genre_ids: Vec<u32>,
}

impl MovieListEntry {
    pub fn new(title: impl Into<String>, release_date: Option<NaiveDate>) -> Self {
        Self {
            tmdb_id: None,
            title: title.into(),
            overview: None,
            poster_path: None,
            release_date,
            vote_average: None,
            genre_ids: Vec::new(),
        }
    }

    pub fn release_year(&self) -> Option<i32> {
        self.release_date.map(|d| d.year())
    }
}

impl std::fmt::Display for MovieListEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.release_year() {
            Some(year) => write!(f, "{} ({})", self.title, year),
            None => write!(f, "{}", self.title),
        }
    }
}
