//! Core domain types
//!
//! This module contains the core domain structures used across the Assay
//! server. These types represent the fundamental business entities shared
//! between the registry, the submission service, and the job runner.

pub mod result;
