pub mod client;
pub mod parser;

pub use client::{base_url_of, HttpListingFetcher};
pub use parser::{CuevanaParser, ListingParser};
