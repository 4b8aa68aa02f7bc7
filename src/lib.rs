//! # Weblioteca - Typed REST Client for the Weblioteca Library Service
//!
//! Client side of the loan (`emprestimo`), reservation (`reserva`) and book
//! (`livro`) resources.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────┐  query   ┌──────────────┐  ApiRequest  ┌───────────────┐
//! │ Controllers  │─────────►│   Services   │─────────────►│ HttpTransport │
//! │              │          │              │              │               │
//! │ - List state │          │ - CRUD       │              │ - reqwest     │
//! │ - Alerts     │          │ - Dates      │              │ - mock        │
//! └──────────────┘          └──────────────┘              └───────────────┘
//!        ▲
//!        │ list-modification events
//! ┌──────────────┐
//! │ EventManager │
//! └──────────────┘
//! ```

pub mod client;
pub mod cmd_args;
pub mod config;

// Re-export main types for easy access
pub use client::*;
