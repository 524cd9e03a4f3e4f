//! Listing entries scraped from external sites.
//!
//! An entry is identified by its natural key, never by position in the
//! listing: the same movie can move between pages from one run to the next.

pub mod entity;
pub mod natural_key;

pub use entity::RawListingEntry;
pub use natural_key::{canonical_link, canonical_title, NaturalKey};
