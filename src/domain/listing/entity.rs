use serde::{Deserialize, Serialize};

use super::natural_key::NaturalKey;

/// One movie card scraped from the external listing.
/// Transient: produced by a fetcher, consumed by the harvest pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawListingEntry {
    /// Title as shown on the listing card
    pub title: String,

    /// Link to the movie page on the listing site
    pub link: String,

    /// Poster image URL, if the card has one
    pub poster: Option<String>,

    /// Short synopsis, if the card has one
    pub overview: Option<String>,

    /// Release year printed on the card
    pub year: Option<i32>,

    /// Listing page the entry was read from (1-based)
    pub page: u32,
}

impl RawListingEntry {
    pub fn new(title: impl Into<String>, link: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            link: link.into(),
            poster: None,
            overview: None,
            year: None,
            page: 1,
        }
    }

    /// Canonical (title, link) key used for deduplication
    pub fn natural_key(&self) -> NaturalKey {
        NaturalKey::new(&self.title, &self.link)
    }
}

impl std::fmt::Display for RawListingEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} : {}", self.title, self.link)
    }
}
