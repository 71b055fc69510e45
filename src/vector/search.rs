//! Search execution: result ranking and the brute-force strategy.

pub mod brute_force;
pub mod ranking;
