//! storyloc library
//!
//! Real-time positioning core for place-based story discovery.
//! Exposes modules for integration testing and binary reuse.

pub mod domain;
pub mod infra;
pub mod io;
pub mod services;
