//! # Events Module
//!
//! Typed application events and the bus that distributes them.

pub mod app_events;
pub mod event_bus;

// Re-export all types for easy access
pub use app_events::{AppEvent, EventKind};
pub use event_bus::{
    AppEventHandler, EventBus, EventManager, SimpleEventBus, Subscription, SubscriptionId,
};
