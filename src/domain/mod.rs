//! Domain layer for the pollwise closure and guide system
//!
//! This module contains core business models, errors and port traits.

pub mod errors;
pub mod models;
pub mod ports;

pub use errors::{CancellationError, DomainError, DomainResult};
