//! # Client Architecture
//!
//! Layers of the Weblioteca client, from the wire up:
//!
//! - `services` talk to the REST API through an injected `HttpTransport`
//! - `models` are the DTOs and value types those services exchange
//! - `events` carries invalidation signals between components
//! - `controllers` combine the above into view state

pub mod controllers;
pub mod events;
pub mod models;
pub mod services;

// Re-export core types
pub use controllers::{ListController, ListState, ReservaListController};
pub use events::{AppEvent, EventKind, EventManager, Subscription};
pub use models::{Account, CalendarDate, Emprestimo, Livro, RequestOptions, Reserva, RestEntity};
pub use services::{
    AccountService, AlertService, EmprestimoService, EntityService, HttpError, HttpTransport,
    LivroService, ReqwestTransport, ReservaService,
};
