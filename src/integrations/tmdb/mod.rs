pub mod client;
pub mod models;

pub use client::{best_match, TmdbClient, DEFAULT_BASE_URL};
