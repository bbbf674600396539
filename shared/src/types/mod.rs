//! Measurement data types

pub mod diff;
pub mod record;
pub mod stage;
pub mod summary;
