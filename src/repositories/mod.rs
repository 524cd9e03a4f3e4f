// src/repositories/mod.rs
//
// Repository layer
//
// CRITICAL RULES:
// - Repositories are DUMB data mappers
// - NO business logic
// - NO event emission
// - NO cross-repository calls
// - Explicit SQL only
//
// The one constraint repositories do carry is the catalog natural-key
// uniqueness, because only the database can enforce it across processes.

mod conversions;
pub mod catalog_repository;
pub mod movie_list_repository;

pub use catalog_repository::{BulkInsertOutcome, CatalogRepository, SqliteCatalogRepository};
pub use movie_list_repository::{MovieListRepository, SqliteMovieListRepository};

#[cfg(test)]
pub use catalog_repository::MockCatalogRepository;
#[cfg(test)]
pub use movie_list_repository::MockMovieListRepository;
