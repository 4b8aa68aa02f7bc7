//! # REST Entities
//!
//! Common contract for every record exchanged with a REST resource.

use crate::client::events::EventKind;
use serde::de::DeserializeOwned;
use serde::Serialize;

/// A domain record served from a fixed REST resource path
pub trait RestEntity: Serialize + DeserializeOwned + Clone + Send + Sync + 'static {
    /// Resource path relative to the server API root, e.g. `api/emprestimos`
    const RESOURCE_PATH: &'static str;

    /// Event that signals a change to this entity's collection
    const LIST_MODIFICATION: EventKind;

    /// Human readable entity name used in logs
    const NAME: &'static str;

    /// Server-assigned identifier, absent before creation
    fn id(&self) -> Option<i64>;
}
