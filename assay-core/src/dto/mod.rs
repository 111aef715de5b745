//! View types exposed through the HTTP API
//!
//! DTOs are lightweight representations of domain entities shaped for
//! API responses. Anything a client should not see (processing command,
//! artifact locations) is stripped here.

pub mod result;
