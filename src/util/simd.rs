//! SIMD-friendly helpers for the scoring hot path.
//!
//! Every score in the crate goes through [`numeric::dot`], so the brute-force
//! and the accelerated strategies produce bit-identical scores for the same
//! pair of vectors.

/// Numerical kernels used for similarity scoring.
pub mod numeric {
    #[cfg(feature = "accelerated")]
    use wide::f32x8;

    /// Inner product of two equal-length slices.
    ///
    /// Lanes are accumulated 8 at a time when the `accelerated` feature is
    /// enabled. The summation order only depends on the slice length.
    #[cfg(feature = "accelerated")]
    pub fn dot(a: &[f32], b: &[f32]) -> f32 {
        debug_assert_eq!(a.len(), b.len());

        let chunks_a = a.chunks_exact(8);
        let chunks_b = b.chunks_exact(8);
        let rem_a = chunks_a.remainder();
        let rem_b = chunks_b.remainder();

        let mut acc = f32x8::splat(0.0);
        let mut lane_a = [0.0f32; 8];
        let mut lane_b = [0.0f32; 8];
        for (ca, cb) in chunks_a.zip(chunks_b) {
            lane_a.copy_from_slice(ca);
            lane_b.copy_from_slice(cb);
            acc = acc + f32x8::from(lane_a) * f32x8::from(lane_b);
        }

        let mut sum = acc.reduce_add();
        for (x, y) in rem_a.iter().zip(rem_b.iter()) {
            sum += x * y;
        }
        sum
    }

    /// Inner product of two equal-length slices.
    #[cfg(not(feature = "accelerated"))]
    pub fn dot(a: &[f32], b: &[f32]) -> f32 {
        debug_assert_eq!(a.len(), b.len());
        a.iter().zip(b.iter()).map(|(x, y)| x * y).sum()
    }

    /// Squared euclidean norm.
    pub fn squared_norm(v: &[f32]) -> f32 {
        v.iter().map(|x| x * x).sum()
    }

}
