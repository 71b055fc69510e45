//! Accelerated index structures.

pub mod flat;
