//! # smartshuffle Core
//!
//! Core library for smartshuffle: ordering items so that neighbours are similar.
//!
//! This crate provides the data model and the two numeric stages:
//!
//! - [`FeatureMatrixBuilder`] - Assembles a validated [`FeatureMatrix`] from per-item records
//! - [`Embedder`] - SMACOF stress majorization into two dimensions
//! - [`TourSolver`] - Nearest-neighbor construction plus 2-opt over the planar points
//! - [`DistanceMatrix`] - Symmetric pairwise Euclidean distances
//!
//! ## Example
//!
//! ```rust
//! use smartshuffle_core::{
//!     Embedder, FeatureMatrixBuilder, FeatureRecord, FeatureSchema, Item, TourSolver,
//! };
//!
//! let schema = FeatureSchema::new(vec!["energy".to_string(), "tempo".to_string()]);
//! let items = vec![Item::new("a", "Song A"), Item::new("b", "Song B"), Item::new("c", "Song C")];
//! let records = vec![
//!     FeatureRecord::new().with("energy", 0.9).with("tempo", 120.0),
//!     FeatureRecord::new().with("energy", 0.2).with("tempo", 80.0),
//!     FeatureRecord::new().with("energy", 0.8).with("tempo", 118.0),
//! ];
//!
//! let matrix = FeatureMatrixBuilder::new(schema).build(&items, &records).unwrap();
//! let embedding = Embedder::default().embed(&matrix);
//! let tour = TourSolver::default().solve(embedding.coords()).unwrap();
//! assert_eq!(tour.order()[0], 0);
//! ```

pub mod distance;
pub mod embedding;
pub mod error;
pub mod features;
pub mod item;
pub mod tour;
pub mod vector;

pub use distance::DistanceMatrix;
pub use embedding::{Embedder, EmbedderBuilder, Embedding, EmbeddingConfig};
pub use error::{Error, Result};
pub use features::{
    FeatureMatrix, FeatureMatrixBuilder, FeatureRecord, FeatureSchema, DEFAULT_FEATURE_FIELDS,
};
pub use item::{Item, ItemId};
pub use tour::{Tour, TourConfig, TourSolver, TourSolverBuilder};
pub use vector::FeatureVector;
