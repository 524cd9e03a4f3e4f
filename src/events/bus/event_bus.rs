// src/events/bus/event_bus.rs
//
// Core event bus implementation.
//
// DESIGN PRINCIPLES:
// 1. Synchronous - handlers execute immediately in subscription order
// 2. Observable - every emission is logged
// 3. Type-safe - events are strongly typed
// 4. A panicking handler never prevents the others from running
// 5. Handlers run without the registry lock held, so they may subscribe

use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

use crate::events::types::DomainEvent;

/// Type-erased event handler function
type EventHandler = Arc<dyn Fn(&dyn Any) + Send + Sync>;

/// The Event Bus
///
/// Lets the harvest pipeline report what happened without knowing who is
/// listening. Nothing subscribes by default.
pub struct EventBus {
    /// Map from event TypeId to list of handlers
    handlers: Arc<RwLock<HashMap<TypeId, Vec<EventHandler>>>>,
}

impl EventBus {
    pub fn new() -> Self {
        Self {
            handlers: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Subscribe to a specific event type.
    /// Handlers are executed in the order they are subscribed.
    ///
    /// ```ignore
    /// bus.subscribe::<HarvestCompleted, _>(|event| {
    ///     log::info!("persisted {}", event.persisted);
    /// });
    /// ```
    pub fn subscribe<E, F>(&self, handler: F)
    where
        E: DomainEvent + 'static,
        F: Fn(&E) + Send + Sync + 'static,
    {
        let type_id = TypeId::of::<E>();

        let wrapped: EventHandler = Arc::new(move |event_any: &dyn Any| {
            if let Some(event) = event_any.downcast_ref::<E>() {
                handler(event);
            } else {
                log::error!(
                    "Failed to downcast event in handler for {}",
                    std::any::type_name::<E>()
                );
            }
        });

        let mut handlers = self.handlers.write().unwrap_or_else(PoisonError::into_inner);
        handlers.entry(type_id).or_default().push(wrapped);
    }

    /// Emit an event to every handler subscribed to its type at the time of the call.
    pub fn emit<E>(&self, event: E)
    where
        E: DomainEvent + 'static,
    {
        let handlers: Vec<EventHandler> = {
            let registry = self.handlers.read().unwrap_or_else(PoisonError::into_inner);
            registry
                .get(&TypeId::of::<E>())
                .map(|h| h.iter().map(Arc::clone).collect())
                .unwrap_or_default()
        };

        log::debug!(
            "[EVENT] {} (id: {}, at: {}) | {} handlers",
            event.event_type(),
            event.event_id(),
            event.occurred_at().to_rfc3339(),
            handlers.len()
        );

        for (idx, handler) in handlers.iter().enumerate() {
            let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
                handler(&event as &dyn Any);
            }));

            if let Err(e) = result {
                log::error!(
                    "Handler {} for {} panicked: {:?}",
                    idx,
                    event.event_type(),
                    e
                );
            }
        }
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

// Clones share handlers
impl Clone for EventBus {
    fn clone(&self) -> Self {
        Self {
            handlers: Arc::clone(&self.handlers),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::types::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use uuid::Uuid;

    fn started() -> HarvestStarted {
        HarvestStarted::new(Uuid::new_v4(), "cuevana".to_string())
    }

    #[test]
    fn test_subscribe_and_emit() {
        let bus = EventBus::new();
        let counter = Arc::new(AtomicUsize::new(0));
        let counter_clone = Arc::clone(&counter);

        bus.subscribe::<HarvestStarted, _>(move |_event| {
            counter_clone.fetch_add(1, Ordering::SeqCst);
        });

        bus.emit(started());

        assert_eq!(counter.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_multiple_handlers_execute_in_order() {
        let bus = EventBus::new();
        let sequence = Arc::new(RwLock::new(Vec::new()));

        for n in 1..=3 {
            let seq = Arc::clone(&sequence);
            bus.subscribe::<HarvestStarted, _>(move |_| {
                seq.write().unwrap().push(n);
            });
        }

        bus.emit(started());

        assert_eq!(*sequence.read().unwrap(), vec![1, 2, 3]);
    }

    #[test]
    fn test_handlers_only_receive_their_event_type() {
        let bus = EventBus::new();
        let counter = Arc::new(AtomicUsize::new(0));
        let counter_clone = Arc::clone(&counter);

        bus.subscribe::<ResolutionDegraded, _>(move |event| {
            assert_eq!(event.title, "Inception");
            counter_clone.fetch_add(1, Ordering::SeqCst);
        });

        bus.emit(started());
        bus.emit(ResolutionDegraded::new(
            Uuid::new_v4(),
            "Inception".to_string(),
            "TMDB rate limit exceeded".to_string(),
        ));

        assert_eq!(counter.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_handler_may_subscribe_during_emit() {
        let bus = EventBus::new();
        let counter = Arc::new(AtomicUsize::new(0));

        let inner_bus = bus.clone();
        let inner_counter = Arc::clone(&counter);
        bus.subscribe::<HarvestStarted, _>(move |_| {
            let c = Arc::clone(&inner_counter);
            inner_bus.subscribe::<HarvestStarted, _>(move |_| {
                c.fetch_add(1, Ordering::SeqCst);
            });
        });

        // The handler added during this emit is not part of it
        bus.emit(started());
        assert_eq!(counter.load(Ordering::SeqCst), 0);

        bus.emit(started());
        assert_eq!(counter.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_handler_panic_doesnt_break_bus() {
        let bus = EventBus::new();
        let counter = Arc::new(AtomicUsize::new(0));

        bus.subscribe::<HarvestStarted, _>(|_| {
            panic!("Intentional panic");
        });

        let counter_clone = Arc::clone(&counter);
        bus.subscribe::<HarvestStarted, _>(move |_| {
            counter_clone.fetch_add(1, Ordering::SeqCst);
        });

        bus.emit(started());

        assert_eq!(counter.load(Ordering::SeqCst), 1);
    }
}
