//! # Application Events
//!
//! Typed payloads carried on the event bus. Each event belongs to exactly one
//! `EventKind`, which is what subscribers register for.

use std::fmt;

/// Channel an event is delivered on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    EmprestimoListModification,
    ReservaListModification,
    LivroListModification,
}

impl EventKind {
    /// Channel name as used by the web front end
    pub fn name(&self) -> &'static str {
        match self {
            Self::EmprestimoListModification => "emprestimoListModification",
            Self::ReservaListModification => "reservaListModification",
            Self::LivroListModification => "livroListModification",
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Events broadcast when some part of the application changes shared state
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppEvent {
    /// The loan collection changed
    EmprestimoListModification { content: String },

    /// The reservation collection changed
    ReservaListModification { content: String },

    /// The book collection changed
    LivroListModification { content: String },
}

impl AppEvent {
    /// Build the list-modification event for `kind`
    pub fn list_modification(kind: EventKind, content: impl Into<String>) -> Self {
        let content = content.into();
        match kind {
            EventKind::EmprestimoListModification => Self::EmprestimoListModification { content },
            EventKind::ReservaListModification => Self::ReservaListModification { content },
            EventKind::LivroListModification => Self::LivroListModification { content },
        }
    }

    pub fn kind(&self) -> EventKind {
        match self {
            Self::EmprestimoListModification { .. } => EventKind::EmprestimoListModification,
            Self::ReservaListModification { .. } => EventKind::ReservaListModification,
            Self::LivroListModification { .. } => EventKind::LivroListModification,
        }
    }

    /// Free-form description attached by the emitter
    pub fn content(&self) -> &str {
        match self {
            Self::EmprestimoListModification { content }
            | Self::ReservaListModification { content }
            | Self::LivroListModification { content } => content,
        }
    }
}
