//! Dense vectors and the unit-norm convention shared by build and query.
//!
//! Stored vectors and query vectors are both normalized with
//! `v / (||v||_2 + NORM_EPSILON)`, which makes the inner product of two
//! normalized vectors their cosine similarity. The epsilon keeps the
//! all-zero vector finite: it normalizes to itself.

use serde::{Deserialize, Serialize};

use crate::util::simd::numeric;

/// Added to the L2 norm before dividing.
pub const NORM_EPSILON: f32 = 1e-12;

/// A dense `f32` vector produced by an embedding function.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Vector {
    pub data: Vec<f32>,
}

impl Vector {
    pub fn new(data: Vec<f32>) -> Self {
        Self { data }
    }

    pub fn dimension(&self) -> usize {
        self.data.len()
    }

    /// True when every component is finite.
    pub fn is_valid(&self) -> bool {
        is_finite(&self.data)
    }

    pub fn norm(&self) -> f32 {
        l2_norm(&self.data)
    }

    /// Return a normalized copy, leaving `self` untouched.
    pub fn normalized(&self) -> Vector {
        Vector::new(normalize(&self.data))
    }

    /// Normalize the owned buffer in place.
    pub fn normalize_in_place(&mut self) {
        normalize_in_place(&mut self.data);
    }

    pub fn as_slice(&self) -> &[f32] {
        &self.data
    }

    pub fn into_inner(self) -> Vec<f32> {
        self.data
    }
}

impl From<Vec<f32>> for Vector {
    fn from(data: Vec<f32>) -> Self {
        Vector::new(data)
    }
}

/// L2 norm of a slice.
pub fn l2_norm(v: &[f32]) -> f32 {
    numeric::squared_norm(v).sqrt()
}

pub fn is_finite(v: &[f32]) -> bool {
    v.iter().all(|x| x.is_finite())
}

/// Normalize into a new buffer. Caller data is not modified.
pub fn normalize(v: &[f32]) -> Vec<f32> {
    let scale = 1.0 / (l2_norm(v) + NORM_EPSILON);
    v.iter().map(|x| x * scale).collect()
}

/// Normalize a buffer the caller owns.
pub fn normalize_in_place(v: &mut [f32]) {
    let scale = 1.0 / (l2_norm(v) + NORM_EPSILON);
    for x in v.iter_mut() {
        *x *= scale;
    }
}
