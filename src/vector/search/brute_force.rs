//! Exact brute-force search over a [`RecordStore`].
//!
//! Scores every stored vector against the query, sorts, truncates. This is
//! the fallback when no accelerated index is loaded and the reference the
//! accelerated path must agree with.

use crate::util::simd::numeric::dot;
use crate::vector::search::ranking::{ScoredPosition, rank_order};
use crate::vector::store::RecordStore;

/// Return the `top_k` best positions for an already normalized query.
pub fn search(store: &RecordStore, query: &[f32], top_k: usize) -> Vec<ScoredPosition> {
    let mut candidates: Vec<ScoredPosition> = store
        .iter()
        .map(|(position, vector, _)| ScoredPosition::new(position, dot(query, vector)))
        .collect();

    candidates.sort_by(rank_order);
    candidates.truncate(top_k);
    candidates
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vector::core::record::ChunkRecord;
    use crate::vector::core::vector::normalize;

    fn create_test_store() -> RecordStore {
        let rows = [
            vec![1.0, 0.0, 0.0],
            vec![0.0, 1.0, 0.0],
            vec![0.0, 0.0, 1.0],
            vec![1.0, 0.0, 0.0],
        ];
        let mut vectors = Vec::new();
        let mut records = Vec::new();
        for (i, row) in rows.iter().enumerate() {
            vectors.extend(normalize(row));
            records.push(ChunkRecord::new(1, i * 10, i * 10 + 10, format!("chunk {i}")));
        }
        RecordStore::new(3, vectors, records).unwrap()
    }

    #[test]
    fn test_brute_force_orders_by_score() {
        let store = create_test_store();
        let hits = search(&store, &normalize(&[0.0, 1.0, 0.1]), 2);
        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].position, 1);
        assert_eq!(hits[1].position, 2);
    }

    #[test]
    fn test_brute_force_tie_break() {
        let store = create_test_store();
        let hits = search(&store, &[1.0, 0.0, 0.0], 2);
        assert_eq!(hits[0].position, 0);
        assert_eq!(hits[1].position, 3);
        assert_eq!(hits[0].score, hits[1].score);
    }

    #[test]
    fn test_brute_force_top_k_larger_than_store() {
        let store = create_test_store();
        let hits = search(&store, &[0.0, 0.0, 1.0], 10);
        assert_eq!(hits.len(), 4);
    }
}
