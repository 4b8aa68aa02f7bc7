//! Common test utilities and infrastructure
//!
//! This module provides shared functionality for integration tests including:
//! - Cucumber world implementation
//! - Helpers for scripting server replies

pub mod world;

// Re-export commonly used items
pub use world::ListWorld;
