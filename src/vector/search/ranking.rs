//! Result ordering shared by every search strategy.
//!
//! Higher score ranks first; equal scores rank the lower store position
//! first. Both strategies go through [`rank_order`], so the order they
//! produce for identical scores is identical.

use std::cmp::Ordering;
use std::collections::BinaryHeap;

/// A store position with its similarity to the query.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoredPosition {
    pub position: usize,
    pub score: f32,
}

impl ScoredPosition {
    pub fn new(position: usize, score: f32) -> Self {
        Self { position, score }
    }
}

/// `Less` means `a` ranks before `b`.
pub fn rank_order(a: &ScoredPosition, b: &ScoredPosition) -> Ordering {
    b.score
        .partial_cmp(&a.score)
        .unwrap_or(Ordering::Equal)
        .then_with(|| a.position.cmp(&b.position))
}

/// Heap entry whose maximum is the worst-ranked candidate.
#[derive(Debug, Clone, Copy)]
struct Ranked(ScoredPosition);

impl PartialEq for Ranked {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Ranked {}

impl PartialOrd for Ranked {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Ranked {
    fn cmp(&self, other: &Self) -> Ordering {
        rank_order(&self.0, &other.0)
    }
}

/// Bounded selection of the `k` best candidates.
#[derive(Debug, Clone)]
pub struct TopK {
    k: usize,
    heap: BinaryHeap<Ranked>,
}

impl TopK {
    pub fn new(k: usize) -> Self {
        Self {
            k,
            heap: BinaryHeap::with_capacity(k.saturating_add(1)),
        }
    }

    pub fn len(&self) -> usize {
        self.heap.len()
    }

    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }

    pub fn push(&mut self, candidate: ScoredPosition) {
        if self.k == 0 {
            return;
        }
        if self.heap.len() < self.k {
            self.heap.push(Ranked(candidate));
            return;
        }
        if let Some(worst) = self.heap.peek()
            && rank_order(&candidate, &worst.0) == Ordering::Less
        {
            self.heap.pop();
            self.heap.push(Ranked(candidate));
        }
    }

    /// Combine two partial selections over disjoint candidates.
    pub fn merge(mut self, other: TopK) -> TopK {
        for entry in other.heap {
            self.push(entry.0);
        }
        self
    }

    /// Best candidate first.
    pub fn into_sorted_vec(self) -> Vec<ScoredPosition> {
        self.heap
            .into_sorted_vec()
            .into_iter()
            .map(|ranked| ranked.0)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rank_order_ties_prefer_lower_position() {
        let a = ScoredPosition::new(3, 0.5);
        let b = ScoredPosition::new(7, 0.5);
        assert_eq!(rank_order(&a, &b), Ordering::Less);
        assert_eq!(rank_order(&b, &a), Ordering::Greater);
    }

    #[test]
    fn test_signed_zero_scores_tie() {
        let a = ScoredPosition::new(1, -0.0);
        let b = ScoredPosition::new(0, 0.0);
        assert_eq!(rank_order(&b, &a), Ordering::Less);
    }

    #[test]
    fn test_top_k_selects_best() {
        let mut top = TopK::new(3);
        for (position, score) in [0.1, 0.9, 0.3, 0.9, 0.7, 0.2].into_iter().enumerate() {
            top.push(ScoredPosition::new(position, score));
        }
        let positions: Vec<usize> = top.into_sorted_vec().iter().map(|s| s.position).collect();
        assert_eq!(positions, vec![1, 3, 4]);
    }

    #[test]
    fn test_top_k_merge_matches_single_pass() {
        let scores = [0.4, 0.4, 0.8, -0.2, 0.4, 0.6, 0.0, 0.8];
        let mut single = TopK::new(4);
        let mut left = TopK::new(4);
        let mut right = TopK::new(4);
        for (position, score) in scores.into_iter().enumerate() {
            let candidate = ScoredPosition::new(position, score);
            single.push(candidate);
            if position < 4 {
                left.push(candidate);
            } else {
                right.push(candidate);
            }
        }
        assert_eq!(right.merge(left).into_sorted_vec(), single.into_sorted_vec());
    }

    #[test]
    fn test_top_k_zero() {
        let mut top = TopK::new(0);
        top.push(ScoredPosition::new(0, 1.0));
        assert!(top.is_empty());
    }
}
