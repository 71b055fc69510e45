//! Content-addressed chunk identifiers.
//!
//! A chunk id is derived from where the chunk lives in the source document,
//! not from insertion order, so rebuilding an index from identical input
//! yields identical ids.
//!
//! Layout: the first [`CHUNK_ID_HEX_LEN`] hex digits of
//! `SHA-1("p{page}_s{start}_e{end}")`, the same ids the
//! extraction pipeline writes into `meta.json`.

use sha1::{Digest, Sha1};

/// Number of hex characters kept from the digest.
pub const CHUNK_ID_HEX_LEN: usize = 12;

/// Canonical location key hashed into a chunk id.
pub fn location_key(page: u32, start: usize, end: usize) -> String {
    format!("p{page}_s{start}_e{end}")
}

/// Create the chunk id for a span `[start, end)` on `page`.
pub fn create_chunk_id(page: u32, start: usize, end: usize) -> String {
    let digest = Sha1::digest(location_key(page, start, end).as_bytes());
    let mut id = hex::encode(digest);
    id.truncate(CHUNK_ID_HEX_LEN);
    id
}

/// Check that a string has the shape of a chunk id.
pub fn is_chunk_id(id: &str) -> bool {
    id.len() == CHUNK_ID_HEX_LEN && id.bytes().all(|b| matches!(b, b'0'..=b'9' | b'a'..=b'f'))
}
