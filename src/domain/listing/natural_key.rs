// Canonical natural key for listing entries and catalog records.
//
// Titles: trimmed, whitespace runs collapsed, lowercased.
// Links: trimmed, one trailing '/' removed (a bare "/" stays as is).
//
// The storage UNIQUE constraint is declared over these canonical columns,
// so the existence check and the database agree on what a duplicate is.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NaturalKey {
    pub title_key: String,
    pub link_key: String,
}

impl NaturalKey {
    pub fn new(title: &str, link: &str) -> Self {
        Self {
            title_key: canonical_title(title),
            link_key: canonical_link(link),
        }
    }
}

impl std::fmt::Display for NaturalKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.title_key, self.link_key)
    }
}

pub fn canonical_title(title: &str) -> String {
    title
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

pub fn canonical_link(link: &str) -> String {
    let trimmed = link.trim();
    match trimmed.strip_suffix('/') {
        Some(stripped) if !stripped.is_empty() => stripped.to_string(),
        _ => trimmed.to_string(),
    }
}
