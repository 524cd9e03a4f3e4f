// src/application/commands/mod.rs
//
// Command handlers invoked by the CLI.

pub mod catalog_commands;
pub mod harvest_commands;
pub mod movie_commands;

pub use catalog_commands::{database_stats, list_catalog};
pub use harvest_commands::{reresolve_pending, run_harvest};
pub use movie_commands::{filter_movies, import_movies, search_movies};
