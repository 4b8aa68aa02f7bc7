//! Step definitions for Cucumber tests
//!
//! Steps are organized by feature domain:
//! - `list_controller` - Reservation list loading, invalidation and teardown

pub mod list_controller;
