//! Open-path tour construction and 2-opt improvement
//!
//! The tour starts at a fixed depot and never returns to it. Construction is
//! the nearest-neighbor heuristic (ties go to the lowest index); improvement
//! is first-improvement 2-opt, including the open-path move that reverses the
//! whole tail. Move decisions compare exact float lengths; the integer cost
//! reported alongside sums truncated arc costs.

use crate::distance::DistanceMatrix;
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};

/// Candidates closer than this are considered equidistant
const TIE_EPS: f64 = 1e-9;

/// A reversal must shorten the path by more than this to be applied
const IMPROVEMENT_EPS: f64 = 1e-10;

/// Configuration for the tour solver
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TourConfig {
    /// Index of the item the tour starts from
    pub depot: usize,
    /// Maximum number of full 2-opt passes
    pub max_passes: usize,
    /// Wall-clock budget for 2-opt, in milliseconds
    pub time_budget_ms: Option<u64>,
}

impl Default for TourConfig {
    fn default() -> Self {
        Self {
            depot: 0,
            max_passes: 1000,
            time_budget_ms: None,
        }
    }
}

impl TourConfig {
    pub fn time_budget(&self) -> Option<Duration> {
        self.time_budget_ms.map(Duration::from_millis)
    }
}

/// An ordering of all item indices, starting at the depot
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Tour {
    order: Vec<usize>,
    length: f64,
    cost: u64,
    construction_length: f64,
    passes: usize,
    improvements: usize,
    budget_exhausted: bool,
}

impl Tour {
    fn trivial(order: Vec<usize>) -> Self {
        Self {
            order,
            length: 0.0,
            cost: 0,
            construction_length: 0.0,
            passes: 0,
            improvements: 0,
            budget_exhausted: false,
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.order.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Item indices in visiting order
    #[inline]
    pub fn order(&self) -> &[usize] {
        &self.order
    }

    /// Exact Euclidean length of the open path
    pub fn length(&self) -> f64 {
        self.length
    }

    /// Sum of truncated integer arc costs
    pub fn cost(&self) -> u64 {
        self.cost
    }

    /// Length of the nearest-neighbor path before 2-opt
    pub fn construction_length(&self) -> f64 {
        self.construction_length
    }

    pub fn passes(&self) -> usize {
        self.passes
    }

    /// Number of reversals applied
    pub fn improvements(&self) -> usize {
        self.improvements
    }

    /// True when 2-opt stopped on its pass or time cap rather than at a
    /// local optimum
    pub fn budget_exhausted(&self) -> bool {
        self.budget_exhausted
    }

    /// Position of each item in the tour (`positions()[item] == k` iff
    /// `order()[k] == item`)
    pub fn positions(&self) -> Vec<usize> {
        let mut positions = vec![0; self.order.len()];
        for (k, &item) in self.order.iter().enumerate() {
            positions[item] = k;
        }
        positions
    }

    /// Reorder `items` into tour order
    pub fn apply<T: Clone>(&self, items: &[T]) -> Vec<T> {
        self.order.iter().map(|&i| items[i].clone()).collect()
    }
}

/// Nearest-neighbor construction followed by 2-opt
#[derive(Debug, Clone, Default)]
pub struct TourSolver {
    config: TourConfig,
}

impl TourSolver {
    pub fn new(config: TourConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &TourConfig {
        &self.config
    }

    /// Solve over planar points
    pub fn solve(&self, points: &[[f64; 2]]) -> Result<Tour> {
        let distances = DistanceMatrix::from_rows(points);
        self.solve_distances(&distances)
    }

    /// Solve over a precomputed distance matrix
    pub fn solve_distances(&self, distances: &DistanceMatrix) -> Result<Tour> {
        let n = distances.len();
        let depot = self.config.depot;

        if n == 0 {
            return Ok(Tour::trivial(Vec::new()));
        }
        if depot >= n {
            return Err(Error::InvalidDepot { depot, len: n });
        }
        if n == 1 {
            return Ok(Tour::trivial(vec![depot]));
        }

        let mut order = nearest_neighbor(distances, depot);
        let construction_length = path_length(distances, &order);

        let deadline = self.config.time_budget().map(|b| Instant::now() + b);
        let outcome = two_opt(distances, &mut order, self.config.max_passes, deadline);

        let length = path_length(distances, &order);
        tracing::debug!(
            n,
            construction_length,
            length,
            passes = outcome.passes,
            improvements = outcome.improvements,
            "tour solved"
        );

        Ok(Tour {
            cost: path_cost(distances, &order),
            order,
            length,
            construction_length,
            passes: outcome.passes,
            improvements: outcome.improvements,
            budget_exhausted: outcome.exhausted,
        })
    }
}

/// Greedy open path from `start`, always moving to the closest unvisited
/// point. Candidates within `TIE_EPS` of the closest distance resolve to the
/// lowest index.
pub fn nearest_neighbor(distances: &DistanceMatrix, start: usize) -> Vec<usize> {
    let n = distances.len();
    let mut visited = vec![false; n];
    let mut order = Vec::with_capacity(n);

    let mut current = start;
    visited[current] = true;
    order.push(current);

    for _ in 1..n {
        let row = distances.row(current);
        let closest = row
            .iter()
            .zip(visited.iter())
            .filter(|&(_, &seen)| !seen)
            .map(|(&dist, _)| dist)
            .fold(f64::INFINITY, f64::min);

        let best_next = row
            .iter()
            .zip(visited.iter())
            .position(|(&dist, &seen)| !seen && dist <= closest + TIE_EPS);

        let Some(next) = best_next else { break };
        visited[next] = true;
        order.push(next);
        current = next;
    }

    order
}

/// Exact length of an open path
pub fn path_length(distances: &DistanceMatrix, order: &[usize]) -> f64 {
    order
        .windows(2)
        .map(|w| distances.get(w[0], w[1]))
        .fold(0.0, |acc, d| acc + d)
}

/// Integer cost of an open path
pub fn path_cost(distances: &DistanceMatrix, order: &[usize]) -> u64 {
    order
        .windows(2)
        .map(|w| distances.cost(w[0], w[1]))
        .fold(0u64, |acc, c| acc.saturating_add(c))
}

#[derive(Debug, Clone, Copy, Default)]
struct TwoOptOutcome {
    passes: usize,
    improvements: usize,
    exhausted: bool,
}

/// First-improvement 2-opt on an open path whose first element is fixed.
///
/// Reversing `order[i+1..=j]` replaces edges (i, i+1) and (j, j+1) with
/// (i, j) and (i+1, j+1); when `j` is the last position only the first edge
/// changes.
fn two_opt(
    distances: &DistanceMatrix,
    order: &mut [usize],
    max_passes: usize,
    deadline: Option<Instant>,
) -> TwoOptOutcome {
    let n = order.len();
    let mut outcome = TwoOptOutcome::default();
    if n < 3 {
        return outcome;
    }

    let out_of_time = || deadline.is_some_and(|d| Instant::now() >= d);

    loop {
        if outcome.passes >= max_passes || out_of_time() {
            outcome.exhausted = true;
            break;
        }
        outcome.passes += 1;

        let mut improved = false;
        for i in 0..n - 2 {
            if out_of_time() {
                outcome.exhausted = true;
                return outcome;
            }
            for j in (i + 2)..n {
                let a = order[i];
                let b = order[i + 1];
                let c = order[j];
                let delta = if j + 1 < n {
                    let e = order[j + 1];
                    distances.get(a, c) + distances.get(b, e)
                        - distances.get(a, b)
                        - distances.get(c, e)
                } else {
                    distances.get(a, c) - distances.get(a, b)
                };

                if delta < -IMPROVEMENT_EPS {
                    order[i + 1..=j].reverse();
                    outcome.improvements += 1;
                    improved = true;
                }
            }
        }

        if !improved {
            break;
        }
    }

    outcome
}

/// Builder for creating a [`TourSolver`] with custom options
#[derive(Debug, Clone, Default)]
pub struct TourSolverBuilder {
    config: TourConfig,
}

impl TourSolverBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn depot(mut self, depot: usize) -> Self {
        self.config.depot = depot;
        self
    }

    pub fn max_passes(mut self, max_passes: usize) -> Self {
        self.config.max_passes = max_passes;
        self
    }

    pub fn time_budget(mut self, budget: Duration) -> Self {
        self.config.time_budget_ms = Some(budget.as_millis() as u64);
        self
    }

    pub fn build(self) -> TourSolver {
        TourSolver::new(self.config)
    }
}
