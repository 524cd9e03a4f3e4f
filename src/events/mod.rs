// src/events/mod.rs
//
// Internal Event System - Public API

pub mod bus;
pub mod types;

pub use bus::EventBus;
pub use types::{
    DomainEvent, HarvestCompleted, HarvestFailed, HarvestStarted, RecordsReResolved,
    ResolutionDegraded,
};

/// Initialize a new event bus
pub fn create_event_bus() -> EventBus {
    EventBus::new()
}
