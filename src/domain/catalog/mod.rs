//! Critical Catalog Invariants:
//!
//! 1. A record is created once, by a harvest run, and never deleted by it
//! 2. Natural keys are unique; the database constraint is authoritative
//! 3. Only `pending` records are ever updated, and only their resolution

pub mod entity;
pub mod invariants;

pub use entity::CatalogRecord;
pub use invariants::validate_catalog_record;
