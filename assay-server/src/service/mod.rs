//! Service Module
//!
//! Business logic layer. Services orchestrate between the registry,
//! the repository, the filesystem and the job runner.

pub mod submission;

// Re-export for convenience
pub use submission as submission_service;
