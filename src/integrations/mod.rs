// src/integrations/mod.rs
//
// External Integrations Module
//
// - listing: paginated HTML listing fetcher (Cuevana)
// - tmdb: title to TMDB identifier resolver
//
// Adapters implement the traits in `traits`; the harvest pipeline only
// sees those traits.

pub mod error;
pub mod listing;
pub mod tmdb;
pub mod traits;

pub use error::{FetchError, ResolverUnavailable};
pub use listing::{base_url_of, CuevanaParser, HttpListingFetcher, ListingParser};
pub use tmdb::{TmdbClient, DEFAULT_BASE_URL};
pub use traits::{FetchedListing, ListingFetcher, MetadataResolver};

#[cfg(test)]
pub use traits::{MockListingFetcher, MockMetadataResolver};
