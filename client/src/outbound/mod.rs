//! Driven adapters implementing the domain ports.
//!
//! `rest` speaks the hosted backend's HTTP dialect; `memory` provides
//! deterministic in-process implementations for integration tests and
//! front-end previews.

pub mod memory;
pub mod rest;
