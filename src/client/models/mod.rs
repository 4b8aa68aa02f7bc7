//! # Models Module
//!
//! Data transfer objects and value types shared by services and controllers.

pub mod account;
pub mod calendar_date;
pub mod emprestimo;
pub mod entity;
pub mod livro;
pub mod request_options;
pub mod reserva;

// Re-export all models for easy access
pub use account::Account;
pub use calendar_date::{wire_date, CalendarDate, DATE_FORMAT};
pub use emprestimo::Emprestimo;
pub use entity::RestEntity;
pub use livro::Livro;
pub use request_options::{create_request_params, RequestOptions};
pub use reserva::Reserva;
