// src/db/mod.rs
//
// Database module
//
// Provides:
// - Connection pooling
// - Schema migrations
// - Database utilities

pub mod connection;
pub mod migrations;

pub use connection::{create_connection_pool, get_database_path, ConnectionPool};

pub use migrations::{
    get_database_stats, initialize_database, verify_database_integrity, DatabaseStats,
};
