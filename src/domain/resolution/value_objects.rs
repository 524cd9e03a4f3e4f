// src/domain/resolution/value_objects.rs
//
// Resolution value objects.
//
// A resolver answers "which external catalog entry is this title?".
// "No match" is an answer; "could not ask" is not, and it never
// appears here as a variant. That case is an error raised by the
// resolver and only becomes `ResolutionOutcome::Unavailable` inside
// the harvest pipeline, where it is recorded per item.

use serde::{Deserialize, Serialize};

use crate::domain::{DomainError, DomainResult};

/// Identifier of a movie in TMDB.
/// Always non-zero: absence is `Option::None`, never a sentinel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u64", into = "u64")]
pub struct TmdbId(u64);

impl TmdbId {
    pub fn new(value: u64) -> DomainResult<Self> {
        if value == 0 {
            return Err(DomainError::InvariantViolation(
                "TMDB identifier must be positive".to_string(),
            ));
        }
        Ok(Self(value))
    }

    pub fn get(self) -> u64 {
        self.0
    }
}

impl TryFrom<u64> for TmdbId {
    type Error = DomainError;

    fn try_from(value: u64) -> Result<Self, Self::Error> {
        TmdbId::new(value)
    }
}

impl From<TmdbId> for u64 {
    fn from(id: TmdbId) -> Self {
        id.0
    }
}

impl std::fmt::Display for TmdbId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Answer from a metadata resolver
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ResolutionResult {
    Resolved(TmdbId),
    NoMatch,
}

impl ResolutionResult {
    pub fn tmdb_id(&self) -> Option<TmdbId> {
        match self {
            ResolutionResult::Resolved(id) => Some(*id),
            ResolutionResult::NoMatch => None,
        }
    }
}

/// What happened to one harvested item during the resolving stage
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ResolutionOutcome {
    Resolved(TmdbId),
    NoMatch,
    /// The resolver could not be asked; the record is kept for re-resolution
    Unavailable { reason: String },
}

impl ResolutionOutcome {
    pub fn tmdb_id(&self) -> Option<TmdbId> {
        match self {
            ResolutionOutcome::Resolved(id) => Some(*id),
            _ => None,
        }
    }

    pub fn status(&self) -> ResolutionStatus {
        match self {
            ResolutionOutcome::Resolved(_) => ResolutionStatus::Resolved,
            ResolutionOutcome::NoMatch => ResolutionStatus::Unmatched,
            ResolutionOutcome::Unavailable { .. } => ResolutionStatus::Pending,
        }
    }
}

impl From<ResolutionResult> for ResolutionOutcome {
    fn from(result: ResolutionResult) -> Self {
        match result {
            ResolutionResult::Resolved(id) => ResolutionOutcome::Resolved(id),
            ResolutionResult::NoMatch => ResolutionOutcome::NoMatch,
        }
    }
}

/// Persisted resolution state of a catalog record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResolutionStatus {
    /// TMDB identifier attached
    Resolved,
    /// TMDB answered and had nothing for this title
    Unmatched,
    /// TMDB could not be reached; needs re-resolution
    Pending,
}

impl std::fmt::Display for ResolutionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ResolutionStatus::Resolved => write!(f, "resolved"),
            ResolutionStatus::Unmatched => write!(f, "unmatched"),
            ResolutionStatus::Pending => write!(f, "pending"),
        }
    }
}

impl std::str::FromStr for ResolutionStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "resolved" => Ok(ResolutionStatus::Resolved),
            "unmatched" => Ok(ResolutionStatus::Unmatched),
            "pending" => Ok(ResolutionStatus::Pending),
            other => Err(DomainError::InvariantViolation(format!(
                "Unknown resolution status: {}",
                other
            ))),
        }
    }
}
