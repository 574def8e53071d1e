//! # smartshuffle
//!
//! Orders items described by numeric feature vectors so that consecutive
//! items are as similar as possible.
//!
//! The pipeline has three stages:
//!
//! 1. **Feature matrix**: per-item records are validated and assembled into an N×D matrix
//! 2. **Embedding**: SMACOF stress majorization places every item in the plane
//! 3. **Tour**: nearest-neighbor construction and 2-opt produce an open path from a depot
//!
//! A [`ShuffleSession`] runs the pipeline lazily and caches every stage;
//! [`ShuffleSession::get_chart_data`] exposes the before/after coordinates for
//! a renderer.
//!
//! ## Quick Start
//!
//! ### From the command line
//!
//! ```bash
//! smartshuffle playlist.json --profile constrained --pretty
//! ```
//!
//! ### As a Library
//!
//! ```rust
//! use smartshuffle::prelude::*;
//!
//! let schema = FeatureSchema::new(vec!["x".to_string(), "y".to_string()]);
//! let config = SessionConfig::default().with_schema(schema);
//!
//! let items: Vec<Item> = (0..4u64).map(|i| Item::new(i, format!("track {}", i))).collect();
//! let records: Vec<FeatureRecord> = [(0.0, 0.0), (0.0, 1.0), (10.0, 10.0), (10.0, 11.0)]
//!     .iter()
//!     .map(|&(x, y)| FeatureRecord::new().with("x", x).with("y", y))
//!     .collect();
//!
//! let session = ShuffleSession::new(items, &records, config).unwrap();
//! assert_eq!(session.get_tour().unwrap().order(), &[0, 1, 2, 3]);
//! ```
//!
//! ## Crate Structure
//!
//! - [`smartshuffle-core`](https://docs.rs/smartshuffle-core) - Data model, embedding, tour solver
//! - [`smartshuffle-session`](https://docs.rs/smartshuffle-session) - Memoizing session and
//!   chart data

// Re-export core types
pub use smartshuffle_core::{
    DistanceMatrix, Embedder, EmbedderBuilder, Embedding, EmbeddingConfig, Error,
    FeatureMatrix, FeatureMatrixBuilder, FeatureRecord, FeatureSchema, FeatureVector, Item,
    ItemId, Result, Tour, TourConfig, TourSolver, TourSolverBuilder, DEFAULT_FEATURE_FIELDS,
};

// Re-export session
pub use smartshuffle_session::{
    CapabilityProfile, ChartData, ChartDataAdapter, ChartPoint, ChartPointSet, Interaction,
    SessionConfig, SessionStats, ShuffleSession, Warning,
};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::{
        CapabilityProfile, ChartData, Embedding, Error, FeatureRecord, FeatureSchema, Item,
        ItemId, Result, SessionConfig, ShuffleSession, Tour, Warning,
    };
}
