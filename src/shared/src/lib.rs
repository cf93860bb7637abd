//! Shared types and utilities for the TrustFlow platform

pub mod types;

// Export all types from types module
pub use types::*;
