//! Metric embedding by stress majorization (SMACOF)
//!
//! Places every row of a feature matrix in the plane so that planar
//! distances approximate the original feature-space distances. Each run
//! starts from a seeded random configuration and repeatedly applies the
//! Guttman transform, which never increases the raw stress
//!
//! ```text
//! σ(X) = Σ_{i<j} (δ_ij − d_ij(X))²
//! X⁺   = (1/n) · B(X) · X
//! b_ij = −δ_ij / d_ij(X)  (i ≠ j, d_ij > 0),  b_ii = −Σ_{j≠i} b_ij
//! ```
//!
//! Dissimilarities are divided by their largest entry before the runs and
//! the winning coordinates are scaled back, so features of any finite
//! magnitude embed without overflow. A run stops once the normalized stress
//! drops by no more than `tolerance` relative to the previous iteration.
//!
//! Several runs (`n_init`) are made with consecutive seeds and the one with
//! the lowest stress wins, so the same input and configuration always give
//! the same coordinates.

use crate::distance::DistanceMatrix;
use crate::{Error, FeatureMatrix, Result};
use ordered_float::OrderedFloat;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

/// Planar distances below this are treated as coincident points
const COINCIDENT_EPS: f64 = 1e-12;

/// Normalized stress at or below this is an exact fit
const STRESS_FLOOR: f64 = 1e-20;

/// Configuration for the SMACOF embedder
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EmbeddingConfig {
    /// Maximum Guttman iterations per run
    pub max_iterations: usize,
    /// Stop once normalized stress improves by no more than this fraction
    /// of its previous value
    pub tolerance: f64,
    /// Seed of the first run; run `k` uses `seed + k`
    pub seed: u64,
    /// Number of independent runs
    pub n_init: usize,
    /// Consecutive stress increases tolerated before a run is abandoned
    pub patience: usize,
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            max_iterations: 1000,
            tolerance: 1e-6,
            seed: 42,
            n_init: 4,
            patience: 5,
        }
    }
}

impl EmbeddingConfig {
    pub fn validate(&self) -> Result<()> {
        if self.max_iterations == 0 {
            return Err(Error::InvalidConfig(
                "embedding max_iterations must be positive".to_string(),
            ));
        }
        if !(self.tolerance.is_finite() && self.tolerance > 0.0) {
            return Err(Error::InvalidConfig(format!(
                "embedding tolerance must be a positive number, got {}",
                self.tolerance
            )));
        }
        if self.n_init == 0 {
            return Err(Error::InvalidConfig("embedding n_init must be positive".to_string()));
        }
        if self.patience == 0 {
            return Err(Error::InvalidConfig("embedding patience must be positive".to_string()));
        }
        Ok(())
    }
}

/// Planar coordinates, row `i` belonging to feature row `i`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Embedding {
    coords: Vec<[f64; 2]>,
    /// Raw stress of `coords`; overflows to infinity for dissimilarities
    /// beyond about 1e154
    stress: f64,
    /// Stress divided by the sum of squared dissimilarities
    normalized_stress: f64,
    iterations: usize,
    converged: bool,
}

impl Embedding {
    fn trivial(coords: Vec<[f64; 2]>) -> Self {
        Self {
            coords,
            stress: 0.0,
            normalized_stress: 0.0,
            iterations: 0,
            converged: true,
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.coords.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.coords.is_empty()
    }

    #[inline]
    pub fn coords(&self) -> &[[f64; 2]] {
        &self.coords
    }

    #[inline]
    pub fn point(&self, index: usize) -> [f64; 2] {
        self.coords[index]
    }

    pub fn stress(&self) -> f64 {
        self.stress
    }

    pub fn normalized_stress(&self) -> f64 {
        self.normalized_stress
    }

    /// Iterations used by the winning run
    pub fn iterations(&self) -> usize {
        self.iterations
    }

    /// False when the winning run hit its iteration cap or kept diverging;
    /// the coordinates are then the best seen, not a fixed point.
    pub fn converged(&self) -> bool {
        self.converged
    }
}

/// SMACOF embedder into two dimensions
#[derive(Debug, Clone, Default)]
pub struct Embedder {
    config: EmbeddingConfig,
}

impl Embedder {
    pub fn new(config: EmbeddingConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &EmbeddingConfig {
        &self.config
    }

    /// Embed the rows of a feature matrix
    pub fn embed(&self, matrix: &FeatureMatrix) -> Embedding {
        let delta = DistanceMatrix::from_rows(matrix.rows());
        self.embed_dissimilarities(&delta)
    }

    /// Embed from a precomputed dissimilarity matrix
    pub fn embed_dissimilarities(&self, delta: &DistanceMatrix) -> Embedding {
        let n = delta.len();
        match n {
            0 => return Embedding::trivial(Vec::new()),
            1 => return Embedding::trivial(vec![[0.0, 0.0]]),
            2 => return Embedding::trivial(vec![[0.0, 0.0], [delta.get(0, 1), 0.0]]),
            _ => {}
        }

        let peak = delta.max();
        if peak <= 0.0 {
            // Every item has the same features.
            return Embedding::trivial(vec![[0.0, 0.0]; n]);
        }
        let unit = delta.scaled_down(peak);
        let scale = unit.upper_sum_of_squares();

        let runs: Vec<Embedding> = (0..self.config.n_init)
            .into_par_iter()
            .map(|k| self.run(&unit, scale, self.config.seed.wrapping_add(k as u64)))
            .collect();

        let mut best = runs
            .into_iter()
            .enumerate()
            .min_by_key(|(k, run)| (OrderedFloat(run.stress), *k))
            .map(|(_, run)| run)
            .unwrap_or_else(|| Embedding::trivial(vec![[0.0, 0.0]; n]));

        for p in best.coords.iter_mut() {
            p[0] *= peak;
            p[1] *= peak;
        }
        best.stress *= peak * peak;
        best
    }

    fn run(&self, delta: &DistanceMatrix, scale: f64, seed: u64) -> Embedding {
        let n = delta.len();
        let mut rng = StdRng::seed_from_u64(seed);
        let mut x: Vec<[f64; 2]> = (0..n)
            .map(|_| [rng.random_range(-1.0..1.0), rng.random_range(-1.0..1.0)])
            .collect();
        center(&mut x);

        let mut best = x.clone();
        let mut best_stress = f64::INFINITY;
        let mut monitor = StressMonitor::new(&self.config);
        let mut converged = false;
        let mut iterations = 0;

        for iteration in 1..=self.config.max_iterations {
            iterations = iteration;
            let d = DistanceMatrix::from_rows(&x);
            let stress = raw_stress(delta, &d);

            if stress < best_stress {
                best_stress = stress;
                best.clone_from(&x);
            }

            match monitor.observe(stress / scale) {
                Step::Continue => {}
                Step::Converged => {
                    converged = true;
                    break;
                }
                Step::Diverged => break,
            }

            x = guttman_transform(delta, &d, &x);
        }

        Embedding {
            coords: best,
            stress: best_stress,
            normalized_stress: best_stress / scale,
            iterations,
            converged,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Step {
    Continue,
    Converged,
    Diverged,
}

/// Stopping rule over the normalized stress of successive iterations
#[derive(Debug)]
struct StressMonitor {
    tolerance: f64,
    patience: usize,
    previous: f64,
    worsening: usize,
}

impl StressMonitor {
    fn new(config: &EmbeddingConfig) -> Self {
        Self {
            tolerance: config.tolerance,
            patience: config.patience,
            previous: f64::INFINITY,
            worsening: 0,
        }
    }

    fn observe(&mut self, normalized: f64) -> Step {
        if normalized <= STRESS_FLOOR {
            return Step::Converged;
        }
        let previous = std::mem::replace(&mut self.previous, normalized);
        if !previous.is_finite() {
            return Step::Continue;
        }

        let improvement = previous - normalized;
        let threshold = self.tolerance * previous;
        if improvement < -threshold {
            self.worsening += 1;
            if self.worsening >= self.patience {
                return Step::Diverged;
            }
            Step::Continue
        } else {
            self.worsening = 0;
            if improvement <= threshold {
                Step::Converged
            } else {
                Step::Continue
            }
        }
    }
}

/// Σ_{i<j} (δ_ij − d_ij)²
fn raw_stress(delta: &DistanceMatrix, d: &DistanceMatrix) -> f64 {
    let n = delta.len();
    let mut sum = 0.0;
    for i in 0..n {
        for j in (i + 1)..n {
            let r = delta.get(i, j) - d.get(i, j);
            sum += r * r;
        }
    }
    sum
}

fn guttman_transform(
    delta: &DistanceMatrix,
    d: &DistanceMatrix,
    x: &[[f64; 2]],
) -> Vec<[f64; 2]> {
    let n = x.len();
    let inv_n = 1.0 / n as f64;

    (0..n)
        .into_par_iter()
        .map(|i| {
            let mut acc = [0.0, 0.0];
            let mut b_ii = 0.0;
            for j in 0..n {
                if i == j {
                    continue;
                }
                let d_ij = d.get(i, j);
                if d_ij > COINCIDENT_EPS {
                    let b_ij = -delta.get(i, j) / d_ij;
                    acc[0] += b_ij * x[j][0];
                    acc[1] += b_ij * x[j][1];
                    b_ii -= b_ij;
                }
            }
            [
                (acc[0] + b_ii * x[i][0]) * inv_n,
                (acc[1] + b_ii * x[i][1]) * inv_n,
            ]
        })
        .collect()
}

fn center(x: &mut [[f64; 2]]) {
    if x.is_empty() {
        return;
    }
    let n = x.len() as f64;
    let cx = x.iter().map(|p| p[0]).sum::<f64>() / n;
    let cy = x.iter().map(|p| p[1]).sum::<f64>() / n;
    for p in x.iter_mut() {
        p[0] -= cx;
        p[1] -= cy;
    }
}

/// Builder for creating an [`Embedder`] with custom options
#[derive(Debug, Clone, Default)]
pub struct EmbedderBuilder {
    config: EmbeddingConfig,
}

impl EmbedderBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn max_iterations(mut self, max_iterations: usize) -> Self {
        self.config.max_iterations = max_iterations;
        self
    }

    pub fn tolerance(mut self, tolerance: f64) -> Self {
        self.config.tolerance = tolerance;
        self
    }

    pub fn seed(mut self, seed: u64) -> Self {
        self.config.seed = seed;
        self
    }

    pub fn n_init(mut self, n_init: usize) -> Self {
        self.config.n_init = n_init;
        self
    }

    pub fn patience(mut self, patience: usize) -> Self {
        self.config.patience = patience;
        self
    }

    pub fn build(self) -> Result<Embedder> {
        self.config.validate()?;
        Ok(Embedder::new(self.config))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::FeatureVector;

    fn matrix(rows: &[&[f64]]) -> FeatureMatrix {
        let dim = rows.first().map(|r| r.len()).unwrap_or(0);
        FeatureMatrix::from_rows(rows.iter().map(|r| FeatureVector::from_slice(r)).collect(), dim)
            .unwrap()
    }

    fn planar_distance(e: &Embedding, i: usize, j: usize) -> f64 {
        crate::distance::euclidean(&e.point(i), &e.point(j))
    }

    #[test]
    fn test_trivial_sizes() {
        let embedder = Embedder::default();

        let empty = embedder.embed(&matrix(&[]));
        assert!(empty.is_empty());
        assert!(empty.converged());

        let single = embedder.embed(&matrix(&[&[1.0, 2.0, 3.0]]));
        assert_eq!(single.coords(), &[[0.0, 0.0]]);

        let pair = embedder.embed(&matrix(&[&[0.0, 0.0, 0.0], &[3.0, 4.0, 0.0]]));
        assert_eq!(pair.len(), 2);
        assert!((planar_distance(&pair, 0, 1) - 5.0).abs() < 1e-12);
        assert_eq!(pair.iterations(), 0);
    }

    #[test]
    fn test_planar_input_is_recovered_up_to_isometry() {
        let m = matrix(&[&[0.0, 0.0], &[0.0, 1.0], &[10.0, 10.0], &[10.0, 11.0]]);
        let e = EmbedderBuilder::new()
            .tolerance(1e-12)
            .max_iterations(10_000)
            .build()
            .unwrap()
            .embed(&m);
        let delta = DistanceMatrix::from_rows(m.rows());

        assert_eq!(e.len(), 4);
        for i in 0..4 {
            for j in 0..4 {
                assert!(
                    (planar_distance(&e, i, j) - delta.get(i, j)).abs() < 1e-3,
                    "pair ({}, {}) distorted",
                    i,
                    j
                );
            }
        }
        assert!(e.normalized_stress() < 1e-6);
    }

    #[test]
    fn test_deterministic_for_same_seed() {
        let m = matrix(&[
            &[0.1, 0.9, 3.0],
            &[0.4, 0.2, 1.0],
            &[0.9, 0.5, 2.0],
            &[0.3, 0.3, 7.0],
            &[0.8, 0.1, 5.0],
        ]);
        let a = Embedder::default().embed(&m);
        let b = Embedder::default().embed(&m);
        assert_eq!(a, b);
    }

    #[test]
    fn test_more_runs_never_worse() {
        let m = matrix(&[
            &[0.1, 0.9, 3.0, 1.0],
            &[0.4, 0.2, 1.0, 0.0],
            &[0.9, 0.5, 2.0, 4.0],
            &[0.3, 0.3, 7.0, 2.0],
            &[0.8, 0.1, 5.0, 3.0],
            &[0.5, 0.7, 0.0, 6.0],
        ]);
        let one = EmbedderBuilder::new().n_init(1).build().unwrap().embed(&m);
        let four = EmbedderBuilder::new().n_init(4).build().unwrap().embed(&m);
        // Run 0 is shared, so the best of four is at most run 0's stress.
        assert!(four.stress() <= one.stress());
    }

    #[test]
    fn test_identical_rows_collapse() {
        let m = matrix(&[&[1.0, 1.0], &[1.0, 1.0], &[1.0, 1.0]]);
        let e = Embedder::default().embed(&m);
        assert_eq!(e.coords(), &[[0.0, 0.0]; 3]);
        assert!(e.converged());
    }

    #[test]
    fn test_iteration_cap_reports_non_convergence() {
        let m = matrix(&[
            &[0.0, 0.0, 1.0],
            &[0.0, 1.0, 5.0],
            &[10.0, 10.0, 2.0],
            &[10.0, 11.0, 0.0],
        ]);
        let e = EmbedderBuilder::new().max_iterations(1).build().unwrap().embed(&m);
        assert!(!e.converged());
        assert_eq!(e.iterations(), 1);
        assert_eq!(e.len(), 4);
    }

    #[test]
    fn test_default_config_recovers_planar_input() {
        let m = matrix(&[&[0.0, 0.0], &[0.0, 1.0], &[10.0, 10.0], &[10.0, 11.0]]);
        let e = Embedder::default().embed(&m);
        let delta = DistanceMatrix::from_rows(m.rows());

        assert!(e.converged());
        for i in 0..4 {
            for j in 0..4 {
                assert!((planar_distance(&e, i, j) - delta.get(i, j)).abs() < 1e-6);
            }
        }
    }

    #[test]
    fn test_huge_features_embed_finitely() {
        let m = matrix(&[&[0.0], &[1e200], &[-1e200], &[5.0]]);
        let e = Embedder::default().embed(&m);

        assert!(e.normalized_stress().is_finite());
        assert!(e.normalized_stress() < 1e-6);
        assert!(e.coords().iter().all(|p| p[0].is_finite() && p[1].is_finite()));
        assert!((planar_distance(&e, 1, 2) / 2e200 - 1.0).abs() < 1e-4);
        assert!((planar_distance(&e, 0, 1) / 1e200 - 1.0).abs() < 1e-4);
    }

    #[test]
    fn test_small_improvement_is_relative_to_stress() {
        let mut monitor = StressMonitor::new(&EmbeddingConfig::default());
        assert_eq!(monitor.observe(2e-6), Step::Continue);
        // An absolute drop of 1e-7 is 5% of the stress, so the run goes on.
        assert_eq!(monitor.observe(1.9e-6), Step::Continue);
        assert_eq!(monitor.observe(1.9e-6 * (1.0 - 1e-7)), Step::Converged);
    }

    #[test]
    fn test_exact_fit_converges_immediately() {
        let mut monitor = StressMonitor::new(&EmbeddingConfig::default());
        assert_eq!(monitor.observe(0.0), Step::Converged);
    }

    #[test]
    fn test_rising_stress_exhausts_patience() {
        let config = EmbeddingConfig {
            patience: 3,
            ..EmbeddingConfig::default()
        };
        let mut monitor = StressMonitor::new(&config);
        assert_eq!(monitor.observe(0.1), Step::Continue);
        assert_eq!(monitor.observe(0.2), Step::Continue);
        assert_eq!(monitor.observe(0.3), Step::Continue);
        // A real improvement resets the count.
        assert_eq!(monitor.observe(0.25), Step::Continue);
        assert_eq!(monitor.observe(0.3), Step::Continue);
        assert_eq!(monitor.observe(0.4), Step::Continue);
        assert_eq!(monitor.observe(0.5), Step::Diverged);
    }

    #[test]
    fn test_diverging_run_reports_non_convergence() {
        // Upper and lower triangles disagree, so the Guttman step is no
        // longer a majorization and the stress climbs.
        let n = 5;
        let data = (0..n * n)
            .map(|k| match (k / n, k % n) {
                (i, j) if i == j => 0.0,
                (i, j) if i < j => 1.0,
                _ => 5.0,
            })
            .collect();
        let delta = DistanceMatrix::from_raw(n, data);
        let embedder = EmbedderBuilder::new().patience(1).build().unwrap();

        let e = embedder.embed_dissimilarities(&delta);
        assert!(!e.converged());
        assert!(e.iterations() < embedder.config().max_iterations);
        assert_eq!(e.len(), n);
        assert!(e.coords().iter().all(|p| p[0].is_finite() && p[1].is_finite()));
    }

    #[test]
    fn test_config_validation() {
        assert!(EmbedderBuilder::new().max_iterations(0).build().is_err());
        assert!(EmbedderBuilder::new().tolerance(0.0).build().is_err());
        assert!(EmbedderBuilder::new().tolerance(f64::NAN).build().is_err());
        assert!(EmbedderBuilder::new().n_init(0).build().is_err());
        assert!(EmbedderBuilder::new().patience(0).build().is_err());
        assert!(EmbedderBuilder::new().build().is_ok());
    }
}
