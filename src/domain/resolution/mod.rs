pub mod value_objects;

pub use value_objects::{ResolutionOutcome, ResolutionResult, ResolutionStatus, TmdbId};
