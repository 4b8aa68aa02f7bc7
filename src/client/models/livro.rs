//! # Livro (Book)

use super::entity::RestEntity;
use crate::client::events::EventKind;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Book record
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Livro {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub titulo: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub categoria: Option<String>,

    #[serde(flatten)]
    pub attributes: Map<String, Value>,
}

impl Livro {
    pub fn new(titulo: impl Into<String>, categoria: impl Into<String>) -> Self {
        Self {
            id: None,
            titulo: Some(titulo.into()),
            categoria: Some(categoria.into()),
            attributes: Map::new(),
        }
    }
}

impl RestEntity for Livro {
    const RESOURCE_PATH: &'static str = "api/livros";
    const LIST_MODIFICATION: EventKind = EventKind::LivroListModification;
    const NAME: &'static str = "Livro";

    fn id(&self) -> Option<i64> {
        self.id
    }
}
