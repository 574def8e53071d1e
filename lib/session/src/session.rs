//! One shuffle computation, end to end
//!
//! A [`ShuffleSession`] validates its input up front and then computes each
//! stage lazily. Every stage is computed at most once; later calls return the
//! cached value, and asking for a later stage first fills in the earlier ones.

use crate::chart::{CapabilityProfile, ChartData, ChartDataAdapter};
use crate::config::SessionConfig;
use serde::Serialize;
use smartshuffle_core::{
    Embedder, Embedding, Error, FeatureMatrix, FeatureMatrixBuilder, FeatureRecord, Item, Result,
    Tour, TourSolver,
};
use std::cell::{Cell, OnceCell};
use tracing::{debug, warn};

/// A non-fatal condition met while shuffling
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Warning {
    /// The embedding stopped before reaching a stress fixed point
    Convergence { iterations: usize, stress: f64 },
    /// 2-opt stopped on its pass or time cap
    BudgetExceeded { passes: usize },
}

impl std::fmt::Display for Warning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Warning::Convergence { iterations, stress } => write!(
                f,
                "embedding did not converge after {} iterations (stress {:.6})",
                iterations, stress
            ),
            Warning::BudgetExceeded { passes } => {
                write!(f, "tour improvement stopped after {} passes", passes)
            }
        }
    }
}

/// How many times each stage has been computed
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SessionStats {
    pub embedding_runs: usize,
    pub tour_runs: usize,
}

pub struct ShuffleSession {
    items: Vec<Item>,
    config: SessionConfig,
    matrix: FeatureMatrix,
    embedding: OnceCell<Embedding>,
    tour: OnceCell<Tour>,
    embedding_runs: Cell<usize>,
    tour_runs: Cell<usize>,
}

impl ShuffleSession {
    /// Create a session from items and their feature records.
    ///
    /// All input validation happens here, so a data error is reported before
    /// any embedding or tour work starts.
    pub fn new(items: Vec<Item>, records: &[FeatureRecord], config: SessionConfig) -> Result<Self> {
        config.validate()?;
        let matrix = FeatureMatrixBuilder::new(config.schema.clone()).build(&items, records)?;
        Self::from_matrix(items, matrix, config)
    }

    /// Create a session over an already assembled feature matrix
    pub fn from_matrix(
        items: Vec<Item>,
        matrix: FeatureMatrix,
        config: SessionConfig,
    ) -> Result<Self> {
        config.embedding.validate()?;
        if items.len() != matrix.len() {
            return Err(Error::CardinalityMismatch {
                items: items.len(),
                records: matrix.len(),
            });
        }
        if !items.is_empty() && config.tour.depot >= items.len() {
            return Err(Error::InvalidDepot {
                depot: config.tour.depot,
                len: items.len(),
            });
        }

        debug!(items = items.len(), dim = matrix.dim(), "shuffle session created");
        Ok(Self {
            items,
            config,
            matrix,
            embedding: OnceCell::new(),
            tour: OnceCell::new(),
            embedding_runs: Cell::new(0),
            tour_runs: Cell::new(0),
        })
    }

    pub fn items(&self) -> &[Item] {
        &self.items
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn get_feature_matrix(&self) -> &FeatureMatrix {
        &self.matrix
    }

    /// Planar coordinates of every item, computed on first call
    pub fn get_embedding(&self) -> &Embedding {
        self.embedding.get_or_init(|| {
            self.embedding_runs.set(self.embedding_runs.get() + 1);
            let embedding = Embedder::new(self.config.embedding.clone()).embed(&self.matrix);
            debug!(
                items = embedding.len(),
                iterations = embedding.iterations(),
                stress = embedding.stress(),
                "embedding computed"
            );
            if !embedding.converged() {
                warn!(
                    iterations = embedding.iterations(),
                    stress = embedding.stress(),
                    "embedding did not converge, using best coordinates found"
                );
            }
            embedding
        })
    }

    /// The visiting order, computed on first call
    pub fn get_tour(&self) -> Result<&Tour> {
        if let Some(tour) = self.tour.get() {
            return Ok(tour);
        }

        let embedding = self.get_embedding();
        self.tour_runs.set(self.tour_runs.get() + 1);
        let tour = TourSolver::new(self.config.tour.clone()).solve(embedding.coords())?;
        debug!(
            items = tour.len(),
            length = tour.length(),
            cost = tour.cost(),
            "tour computed"
        );
        if tour.budget_exhausted() {
            warn!(
                passes = tour.passes(),
                "tour improvement budget exhausted, using best tour found"
            );
        }
        Ok(self.tour.get_or_init(|| tour))
    }

    /// Chart point sets before and after ordering
    pub fn get_chart_data(&self, profile: CapabilityProfile) -> Result<ChartData> {
        let tour = self.get_tour()?;
        ChartDataAdapter::new(profile).adapt(&self.items, self.get_embedding(), tour)
    }

    /// The items rearranged into tour order
    pub fn shuffled_items(&self) -> Result<Vec<Item>> {
        Ok(self.get_tour()?.apply(&self.items))
    }

    /// Non-fatal conditions from the stages computed so far
    pub fn warnings(&self) -> Vec<Warning> {
        let mut warnings = Vec::new();
        if let Some(embedding) = self.embedding.get() {
            if !embedding.converged() {
                warnings.push(Warning::Convergence {
                    iterations: embedding.iterations(),
                    stress: embedding.stress(),
                });
            }
        }
        if let Some(tour) = self.tour.get() {
            if tour.budget_exhausted() {
                warnings.push(Warning::BudgetExceeded { passes: tour.passes() });
            }
        }
        warnings
    }

    pub fn stats(&self) -> SessionStats {
        SessionStats {
            embedding_runs: self.embedding_runs.get(),
            tour_runs: self.tour_runs.get(),
        }
    }
}
