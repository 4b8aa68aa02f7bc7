//! # Controllers Module
//!
//! Contains the controllers that drive entity views.

pub mod list_controller;

// Re-export main types for convenience
pub use list_controller::{ListController, ListState, ReservaListController};
