// src/integrations/tmdb/models.rs
//
// Wire types for the TMDB `/search/movie` endpoint.
// Only the fields the resolver reads are modelled.

use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct SearchResponse {
    #[serde(default)]
    pub results: Vec<SearchHit>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SearchHit {
    pub id: u64,

    #[serde(default)]
    pub title: String,

    #[serde(default)]
    pub original_title: Option<String>,
}

/// Error body TMDB sends with non-2xx responses
#[derive(Debug, Deserialize)]
pub struct StatusMessage {
    #[serde(default)]
    pub status_code: Option<i64>,

    #[serde(default)]
    pub status_message: Option<String>,
}
