pub mod entity;

pub use entity::MovieListEntry;

use crate::domain::{DomainError, DomainResult};

/// Validates MovieListEntry invariants
pub fn validate_movie_list_entry(entry: &MovieListEntry) -> DomainResult<()> {
    if entry.title.trim().is_empty() {
        return Err(DomainError::InvariantViolation(
            "Movie title cannot be empty".to_string(),
        ));
    }
    if let Some(score) = entry.vote_average {
        if !(0.0..=10.0).contains(&score) {
            return Err(DomainError::InvariantViolation(format!(
                "Vote average {} is outside 0..=10",
                score
            )));
        }
    }
    Ok(())
}
