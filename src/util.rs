//! Shared utility modules used across ragdex components.

pub mod id;
pub mod simd;
