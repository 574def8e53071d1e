//! Pairwise Euclidean distances
//!
//! The matrix is stored flat (`d[i * n + j]`) and is always symmetric with a
//! zero diagonal. Rows are computed in parallel; each cell depends only on its
//! two input rows so the result does not depend on scheduling.

use rayon::prelude::*;
use serde::Serialize;

/// Euclidean distance between two equal-length slices
///
/// Components are divided by the largest absolute difference before
/// squaring, so finite inputs near `f64::MAX` do not overflow.
#[inline]
pub fn euclidean(a: &[f64], b: &[f64]) -> f64 {
    debug_assert_eq!(a.len(), b.len());
    let scale = a
        .iter()
        .zip(b.iter())
        .fold(0.0_f64, |m, (x, y)| m.max((x - y).abs()));
    if scale == 0.0 || !scale.is_finite() {
        return scale;
    }
    let sum = a
        .iter()
        .zip(b.iter())
        .map(|(x, y)| {
            let d = (x - y) / scale;
            d * d
        })
        .sum::<f64>();
    scale * sum.sqrt()
}

/// Symmetric N×N matrix of non-negative distances
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DistanceMatrix {
    n: usize,
    data: Vec<f64>,
}

impl DistanceMatrix {
    /// Compute all pairwise distances between `rows`
    pub fn from_rows<R>(rows: &[R]) -> Self
    where
        R: AsRef<[f64]> + Sync,
    {
        let n = rows.len();
        let mut data = vec![0.0; n * n];

        if n > 0 {
            data.par_chunks_mut(n).enumerate().for_each(|(i, out)| {
                let a = rows[i].as_ref();
                for (j, cell) in out.iter_mut().enumerate() {
                    if i != j {
                        *cell = euclidean(a, rows[j].as_ref());
                    }
                }
            });
        }

        Self { n, data }
    }

    #[cfg(test)]
    pub(crate) fn from_raw(n: usize, data: Vec<f64>) -> Self {
        assert_eq!(data.len(), n * n);
        Self { n, data }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.n
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.n == 0
    }

    #[inline]
    pub fn get(&self, i: usize, j: usize) -> f64 {
        self.data[i * self.n + j]
    }

    /// Row `i` as a slice
    #[inline]
    pub fn row(&self, i: usize) -> &[f64] {
        &self.data[i * self.n..(i + 1) * self.n]
    }

    /// Integer arc cost: the distance truncated toward zero.
    ///
    /// Tour costs reported to callers are sums of these, so they are identical
    /// across platforms even where float summation order differs.
    #[inline]
    pub fn cost(&self, i: usize, j: usize) -> u64 {
        self.get(i, j) as u64
    }

    /// Largest entry, zero for an empty matrix
    pub fn max(&self) -> f64 {
        self.data.iter().copied().fold(0.0, f64::max)
    }

    /// Every entry divided by `divisor`
    pub fn scaled_down(&self, divisor: f64) -> Self {
        Self {
            n: self.n,
            data: self.data.iter().map(|d| d / divisor).collect(),
        }
    }

    /// Sum of the strict upper triangle, used to scale stress
    pub fn upper_sum_of_squares(&self) -> f64 {
        let mut sum = 0.0;
        for i in 0..self.n {
            for j in (i + 1)..self.n {
                let d = self.get(i, j);
                sum += d * d;
            }
        }
        sum
    }
}
