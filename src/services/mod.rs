// src/services/mod.rs
//
// Services Module - Orchestration Layer

pub mod existence_filter;
pub mod harvest_service;
pub mod movie_query_service;
pub mod reresolution_service;


pub use existence_filter::{ExistenceFilter, FilterOutcome};
pub use harvest_service::{
    HarvestError, HarvestReport, HarvestService, HarvestSettings, HarvestStage,
};
pub use movie_query_service::MovieQueryService;
pub use reresolution_service::{ReResolutionReport, ReResolutionService};
