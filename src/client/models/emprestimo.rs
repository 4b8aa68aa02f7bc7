//! # Emprestimo (Loan)
//!
//! Loan record. Only the loan date is interpreted on the client; every other
//! attribute is carried through untouched.

use super::calendar_date::{wire_date, CalendarDate};
use super::entity::RestEntity;
use crate::client::events::EventKind;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Emprestimo {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,

    /// Loan date, sent as `YYYY-MM-DD` or `null`
    #[serde(default, with = "wire_date")]
    pub data_emprestimo: Option<CalendarDate>,

    /// Attributes this layer does not interpret
    #[serde(flatten)]
    pub attributes: Map<String, Value>,
}

impl Emprestimo {
    pub fn new(data_emprestimo: Option<CalendarDate>) -> Self {
        Self {
            id: None,
            data_emprestimo,
            attributes: Map::new(),
        }
    }

    pub fn with_id(mut self, id: i64) -> Self {
        self.id = Some(id);
        self
    }

    pub fn with_attribute(mut self, key: impl Into<String>, value: Value) -> Self {
        self.attributes.insert(key.into(), value);
        self
    }
}

impl RestEntity for Emprestimo {
    const RESOURCE_PATH: &'static str = "api/emprestimos";
    const LIST_MODIFICATION: EventKind = EventKind::EmprestimoListModification;
    const NAME: &'static str = "Emprestimo";

    fn id(&self) -> Option<i64> {
        self.id
    }
}
