//! # Reserva (Reservation)

use super::entity::RestEntity;
use crate::client::events::EventKind;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Reservation record; everything but the identifier is opaque to the client
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Reserva {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,

    #[serde(flatten)]
    pub attributes: Map<String, Value>,
}

impl Reserva {
    pub fn new(id: Option<i64>) -> Self {
        Self {
            id,
            attributes: Map::new(),
        }
    }

    pub fn with_attribute(mut self, key: impl Into<String>, value: Value) -> Self {
        self.attributes.insert(key.into(), value);
        self
    }
}

impl RestEntity for Reserva {
    const RESOURCE_PATH: &'static str = "api/reservas";
    const LIST_MODIFICATION: EventKind = EventKind::ReservaListModification;
    const NAME: &'static str = "Reserva";

    fn id(&self) -> Option<i64> {
        self.id
    }
}
