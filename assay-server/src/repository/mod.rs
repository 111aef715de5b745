//! Repository Module
//!
//! Data access layer for the result store.

pub mod result;

// Re-export for convenience
pub use result as result_repository;
