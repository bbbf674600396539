//! Shared types and utilities for convbench
//!
//! This crate contains the data structures exchanged between the timing
//! harness, the compute-runtime backends and the command-line front end.

pub mod types;
pub mod utils;

// Re-export commonly used types
pub use types::{diff::*, record::*, stage::*, summary::*};
