//! Core vector data structures.

pub mod record;
pub mod vector;
