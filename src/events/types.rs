// src/events/types.rs
//
// Harvest events.
// Each event represents an immutable fact that has already occurred.
//
// CRITICAL RULES:
// - Events are facts, not commands
// - Events carry only the data needed to react
// - No business logic in event types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Trait that all events must implement
pub trait DomainEvent: std::fmt::Debug + Clone {
    /// Unique identifier for this event instance
    fn event_id(&self) -> Uuid;

    /// When this event occurred
    fn occurred_at(&self) -> DateTime<Utc>;

    /// Human-readable event type name
    fn event_type(&self) -> &'static str;
}

macro_rules! impl_domain_event {
    ($event:ident) => {
        impl DomainEvent for $event {
            fn event_id(&self) -> Uuid {
                self.event_id
            }
            fn occurred_at(&self) -> DateTime<Utc> {
                self.occurred_at
            }
            fn event_type(&self) -> &'static str {
                stringify!($event)
            }
        }
    };
}

// ============================================================================
// HARVEST RUN EVENTS
// ============================================================================

/// Emitted when a harvest run begins fetching
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HarvestStarted {
    pub event_id: Uuid,
    pub occurred_at: DateTime<Utc>,
    pub run_id: Uuid,
    pub source: String,
}

impl HarvestStarted {
    pub fn new(run_id: Uuid, source: String) -> Self {
        Self {
            event_id: Uuid::new_v4(),
            occurred_at: Utc::now(),
            run_id,
            source,
        }
    }
}

impl_domain_event!(HarvestStarted);

/// Emitted for each item the resolver could not answer for.
/// The item is still persisted, as pending.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResolutionDegraded {
    pub event_id: Uuid,
    pub occurred_at: DateTime<Utc>,
    pub run_id: Uuid,
    pub title: String,
    pub reason: String,
}

impl ResolutionDegraded {
    pub fn new(run_id: Uuid, title: String, reason: String) -> Self {
        Self {
            event_id: Uuid::new_v4(),
            occurred_at: Utc::now(),
            run_id,
            title,
            reason,
        }
    }
}

impl_domain_event!(ResolutionDegraded);

/// Emitted after a run committed its batch
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HarvestCompleted {
    pub event_id: Uuid,
    pub occurred_at: DateTime<Utc>,
    pub run_id: Uuid,
    pub fetched: usize,
    pub persisted: usize,
    pub duplicates_ignored: usize,
    pub pending: usize,
}

impl HarvestCompleted {
    pub fn new(
        run_id: Uuid,
        fetched: usize,
        persisted: usize,
        duplicates_ignored: usize,
        pending: usize,
    ) -> Self {
        Self {
            event_id: Uuid::new_v4(),
            occurred_at: Utc::now(),
            run_id,
            fetched,
            persisted,
            duplicates_ignored,
            pending,
        }
    }
}

impl_domain_event!(HarvestCompleted);

/// Emitted when a run aborts; nothing from the run was persisted
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HarvestFailed {
    pub event_id: Uuid,
    pub occurred_at: DateTime<Utc>,
    pub run_id: Uuid,
    pub stage: String,
    pub error: String,
}

impl HarvestFailed {
    pub fn new(run_id: Uuid, stage: String, error: String) -> Self {
        Self {
            event_id: Uuid::new_v4(),
            occurred_at: Utc::now(),
            run_id,
            stage,
            error,
        }
    }
}

impl_domain_event!(HarvestFailed);

// ============================================================================
// RE-RESOLUTION EVENTS
// ============================================================================

/// Emitted after a re-resolution pass over pending records
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecordsReResolved {
    pub event_id: Uuid,
    pub occurred_at: DateTime<Utc>,
    pub examined: usize,
    pub resolved: usize,
    pub unmatched: usize,
    pub still_pending: usize,
}

impl RecordsReResolved {
    pub fn new(examined: usize, resolved: usize, unmatched: usize, still_pending: usize) -> Self {
        Self {
            event_id: Uuid::new_v4(),
            occurred_at: Utc::now(),
            examined,
            resolved,
            unmatched,
            still_pending,
        }
    }
}

impl_domain_event!(RecordsReResolved);
