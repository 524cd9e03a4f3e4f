// src/application/mod.rs
//
// Application Layer
//
// ARCHITECTURE:
// - Boundary between the CLI and the services
// - Translates between DTOs and domain types
// - Maps every error to an `ErrorResponse`

pub mod commands;
pub mod dto;
pub mod error_handling;
pub mod state;

pub use commands::*;
pub use dto::*;
pub use error_handling::{ErrorResponse, ErrorType};
pub use state::AppState;
