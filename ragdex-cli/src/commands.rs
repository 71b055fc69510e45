pub mod build;
pub mod chunk;
pub mod search;
