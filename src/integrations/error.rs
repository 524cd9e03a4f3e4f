// src/integrations/error.rs
//
// Errors raised at the external boundaries.
//
// FetchError aborts a harvest: without a listing there is nothing to reconcile.
// ResolverUnavailable never aborts one: the pipeline records the item as
// pending and moves on. It is deliberately distinct from "no match".

use thiserror::Error;

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("Listing page {url} is unreachable: {reason}")]
    Unreachable { url: String, reason: String },

    #[error("Listing page {url} returned status {status}")]
    Status { url: String, status: u16 },

    #[error("Listing page {url} has no recognizable movie entries (layout changed?)")]
    UnexpectedLayout { url: String },

    #[error("Listing parser error: {0}")]
    Parser(String),
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ResolverUnavailable {
    #[error("TMDB request failed: {0}")]
    Network(String),

    #[error("TMDB rejected credentials (status {0})")]
    Auth(u16),

    #[error("TMDB rate limit exceeded")]
    RateLimited,

    #[error("TMDB returned status {0}")]
    Upstream(u16),

    #[error("TMDB response could not be parsed: {0}")]
    InvalidResponse(String),
}
