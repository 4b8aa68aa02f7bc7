//! # Event Bus
//!
//! Publish/subscribe distribution of typed application events.
//!
//! `EventManager` is the handle shared from the composition root. Subscribing
//! through it yields a `Subscription` owned by the subscriber; the handler is
//! released exactly once, either by `Subscription::unsubscribe` or on drop.

use super::app_events::{AppEvent, EventKind};
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};

/// Type alias for event handlers to reduce complexity
pub type AppEventHandler = Arc<dyn Fn(&AppEvent) + Send + Sync>;

/// Identifier assigned to a handler on subscription
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriptionId(u64);

/// Event bus for decoupled communication between components
pub trait EventBus: Send + Sync {
    /// Register a handler for one event kind
    fn subscribe(&mut self, kind: EventKind, handler: AppEventHandler) -> SubscriptionId;

    /// Remove a handler; returns false when it was not registered
    fn unsubscribe(&mut self, id: SubscriptionId) -> bool;

    /// Handlers currently registered for `kind`, in subscription order
    fn handlers(&self, kind: EventKind) -> Vec<AppEventHandler>;

    /// Deliver an event to every handler of its kind; returns the number notified
    fn publish(&mut self, event: AppEvent) -> usize {
        let handlers = self.handlers(event.kind());
        for handler in &handlers {
            handler(&event);
        }
        handlers.len()
    }
}

/// Simple in-memory event bus implementation
#[derive(Default)]
pub struct SimpleEventBus {
    next_id: u64,
    handlers: Vec<(SubscriptionId, EventKind, AppEventHandler)>,
}

impl SimpleEventBus {
    pub fn new() -> Self {
        Self::default()
    }
}

impl EventBus for SimpleEventBus {
    fn subscribe(&mut self, kind: EventKind, handler: AppEventHandler) -> SubscriptionId {
        self.next_id += 1;
        let id = SubscriptionId(self.next_id);
        self.handlers.push((id, kind, handler));
        id
    }

    fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.handlers.len();
        self.handlers.retain(|(handler_id, _, _)| *handler_id != id);
        self.handlers.len() != before
    }

    fn handlers(&self, kind: EventKind) -> Vec<AppEventHandler> {
        self.handlers
            .iter()
            .filter(|(_, handler_kind, _)| *handler_kind == kind)
            .map(|(_, _, handler)| Arc::clone(handler))
            .collect()
    }
}

type SharedBus = Mutex<Box<dyn EventBus>>;

fn lock_bus(bus: &SharedBus) -> MutexGuard<'_, Box<dyn EventBus>> {
    bus.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Cloneable handle to the application's event bus
#[derive(Clone)]
pub struct EventManager {
    bus: Arc<SharedBus>,
}

impl EventManager {
    /// Create a manager backed by a `SimpleEventBus`
    pub fn new() -> Self {
        Self::with_bus(Box::new(SimpleEventBus::new()))
    }

    pub fn with_bus(bus: Box<dyn EventBus>) -> Self {
        Self {
            bus: Arc::new(Mutex::new(bus)),
        }
    }

    /// Register `handler` for `kind` and return the owning subscription
    pub fn subscribe<F>(&self, kind: EventKind, handler: F) -> Subscription
    where
        F: Fn(&AppEvent) + Send + Sync + 'static,
    {
        let id = lock_bus(&self.bus).subscribe(kind, Arc::new(handler));
        tracing::debug!("Subscribed {:?} to {}", id, kind);
        Subscription {
            id,
            kind,
            bus: Arc::downgrade(&self.bus),
        }
    }

    /// Deliver `event` to its subscribers; returns the number notified.
    ///
    /// Handlers run after the bus lock is released, so a handler may
    /// broadcast or subscribe itself.
    pub fn broadcast(&self, event: AppEvent) -> usize {
        let handlers = lock_bus(&self.bus).handlers(event.kind());
        tracing::debug!(
            "Broadcasting {} to {} subscriber(s)",
            event.kind(),
            handlers.len()
        );
        for handler in &handlers {
            handler(&event);
        }
        handlers.len()
    }

    pub fn subscriber_count(&self, kind: EventKind) -> usize {
        lock_bus(&self.bus).handlers(kind).len()
    }
}

impl Default for EventManager {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for EventManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventManager").finish_non_exhaustive()
    }
}

/// Owned registration on the event bus; releases its handler when dropped
pub struct Subscription {
    id: SubscriptionId,
    kind: EventKind,
    bus: Weak<SharedBus>,
}

impl Subscription {
    pub fn id(&self) -> SubscriptionId {
        self.id
    }

    pub fn kind(&self) -> EventKind {
        self.kind
    }

    /// Release the handler now
    pub fn unsubscribe(self) {
        drop(self);
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(bus) = self.bus.upgrade() {
            let removed = lock_bus(&bus).unsubscribe(self.id);
            tracing::debug!("Released {:?} from {} (removed: {})", self.id, self.kind, removed);
        }
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("id", &self.id)
            .field("kind", &self.kind)
            .finish()
    }
}
