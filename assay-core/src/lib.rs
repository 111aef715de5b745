//! Assay Core
//!
//! Core types and abstractions for the Assay test-processing system.
//!
//! This crate contains:
//! - Domain types: test specifications and result records
//! - DTOs: view types exposed through the HTTP API

pub mod domain;
pub mod dto;
