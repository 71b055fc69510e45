//! Flat inner-product index used as the accelerated search structure.
//!
//! The index is exact: it keeps its own contiguous copy of the normalized
//! vectors and scans them in parallel chunks, keeping a bounded top-k per
//! chunk. Labels are store positions; unused result slots carry [`NO_MATCH`].
//!
//! # File format
//!
//! ```text
//! Offset   Size    Type        Description
//! 0x00     8       [u8; 8]     Magic: "RDXFLAT1"
//! 0x08     4       u32 LE      Format version
//! 0x0C     4       u32 LE      D: dimension
//! 0x10     8       u64 LE      N: number of vectors
//! 0x18     N*D*4   [f32]       Vector data (little endian, row-major)
//! ```

use std::io::Cursor;

use byteorder::{ByteOrder, LittleEndian, ReadBytesExt};

#[cfg(feature = "accelerated")]
use rayon::prelude::*;

use crate::error::{RagdexError, Result};
use crate::util::simd::numeric::dot;
use crate::vector::search::ranking::{ScoredPosition, TopK};

pub const FLAT_MAGIC: [u8; 8] = *b"RDXFLAT1";
pub const FLAT_VERSION: u32 = 1;
pub const HEADER_SIZE: usize = 24;

/// Label reported for result slots without a match.
pub const NO_MATCH: i64 = -1;

/// Rows scored per parallel task.
const SCAN_CHUNK_ROWS: usize = 1024;

/// Whether this build can construct and query the accelerated index.
pub fn is_available() -> bool {
    cfg!(feature = "accelerated")
}

/// Exact flat index over normalized vectors.
#[derive(Debug, Clone, PartialEq)]
pub struct FlatIndex {
    dimension: usize,
    data: Vec<f32>,
}

/// Raw result of [`FlatIndex::search`]: `k` slots, best first.
#[derive(Debug, Clone, PartialEq)]
pub struct FlatSearchResult {
    pub scores: Vec<f32>,
    pub labels: Vec<i64>,
}

impl FlatIndex {
    /// Build an index over a row-major buffer of normalized vectors.
    pub fn build(dimension: usize, data: Vec<f32>) -> Result<Self> {
        if dimension == 0 {
            return Err(RagdexError::input("flat index dimension must be at least 1"));
        }
        if data.len() % dimension != 0 {
            return Err(RagdexError::input(format!(
                "flat index buffer of {} values is not a multiple of dimension {}",
                data.len(),
                dimension
            )));
        }
        Ok(Self { dimension, data })
    }

    pub fn dimension(&self) -> usize {
        self.dimension
    }

    pub fn len(&self) -> usize {
        self.data.len() / self.dimension
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Search for the `k` highest inner products.
    ///
    /// Always returns exactly `k` slots; slots beyond the number of stored
    /// vectors hold [`NO_MATCH`] with a score of negative infinity.
    pub fn search(&self, query: &[f32], k: usize) -> Result<FlatSearchResult> {
        if query.len() != self.dimension {
            return Err(RagdexError::input(format!(
                "query dimension {} does not match index dimension {}",
                query.len(),
                self.dimension
            )));
        }

        let ranked = self.scan(query, k).into_sorted_vec();

        let mut scores = Vec::with_capacity(k);
        let mut labels = Vec::with_capacity(k);
        for candidate in &ranked {
            scores.push(candidate.score);
            labels.push(candidate.position as i64);
        }
        scores.resize(k, f32::NEG_INFINITY);
        labels.resize(k, NO_MATCH);

        Ok(FlatSearchResult { scores, labels })
    }

    #[cfg(feature = "accelerated")]
    fn scan(&self, query: &[f32], k: usize) -> TopK {
        let dimension = self.dimension;
        self.data
            .par_chunks(SCAN_CHUNK_ROWS * dimension)
            .enumerate()
            .map(|(chunk_idx, chunk)| {
                let base = chunk_idx * SCAN_CHUNK_ROWS;
                let mut top = TopK::new(k);
                for (offset, row) in chunk.chunks_exact(dimension).enumerate() {
                    top.push(ScoredPosition::new(base + offset, dot(query, row)));
                }
                top
            })
            .reduce(|| TopK::new(k), TopK::merge)
    }

    #[cfg(not(feature = "accelerated"))]
    fn scan(&self, query: &[f32], k: usize) -> TopK {
        let mut top = TopK::new(k);
        for (position, row) in self.data.chunks_exact(self.dimension).enumerate() {
            top.push(ScoredPosition::new(position, dot(query, row)));
        }
        top
    }

    /// Serialize to the on-disk format.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(HEADER_SIZE + self.data.len() * 4);
        out.extend_from_slice(&FLAT_MAGIC);
        out.extend_from_slice(&FLAT_VERSION.to_le_bytes());
        out.extend_from_slice(&(self.dimension as u32).to_le_bytes());
        out.extend_from_slice(&(self.len() as u64).to_le_bytes());

        let payload_start = out.len();
        out.resize(payload_start + self.data.len() * 4, 0);
        LittleEndian::write_f32_into(&self.data, &mut out[payload_start..]);
        out
    }

    /// Parse the on-disk format.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        if bytes.len() < HEADER_SIZE {
            return Err(RagdexError::corrupt("flat index file too small for header"));
        }
        if bytes[..8] != FLAT_MAGIC {
            return Err(RagdexError::corrupt("invalid flat index magic"));
        }

        let mut cursor = Cursor::new(&bytes[8..HEADER_SIZE]);
        let truncated = |_| RagdexError::corrupt("truncated flat index header");
        let version = cursor.read_u32::<LittleEndian>().map_err(truncated)?;
        let dimension = cursor.read_u32::<LittleEndian>().map_err(truncated)? as usize;
        let count = cursor.read_u64::<LittleEndian>().map_err(truncated)? as usize;

        if version != FLAT_VERSION {
            return Err(RagdexError::corrupt(format!(
                "unsupported flat index version {version}"
            )));
        }
        if dimension == 0 {
            return Err(RagdexError::corrupt("flat index has dimension 0"));
        }

        let payload = &bytes[HEADER_SIZE..];
        let expected = count
            .checked_mul(dimension)
            .and_then(|n| n.checked_mul(4))
            .ok_or_else(|| RagdexError::corrupt("flat index header overflows"))?;
        if payload.len() != expected {
            return Err(RagdexError::corrupt(format!(
                "flat index payload is {} bytes, {count} x {dimension} vectors need {expected}",
                payload.len()
            )));
        }

        let mut data = vec![0.0f32; count * dimension];
        LittleEndian::read_f32_into(payload, &mut data);
        Ok(Self { dimension, data })
    }
}
