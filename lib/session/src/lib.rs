//! # smartshuffle Session
//!
//! Orchestration and presentation data on top of `smartshuffle-core`.
//!
//! - [`ShuffleSession`] - Owns one shuffle: validates input, then lazily
//!   computes and caches the embedding and the tour
//! - [`ChartDataAdapter`] - Turns the result into two renderer-agnostic point sets
//! - [`SessionConfig`] - Schema, embedding and tour settings, loadable from JSON
//!
//! ## Flow
//!
//! ```text
//! ┌─────────────┐     ┌─────────────┐     ┌─────────────┐
//! │  Records    │────>│  Embedder   │────>│ TourSolver  │
//! │  (matrix)   │     │  (SMACOF)   │     │ (NN, 2-opt) │
//! └─────────────┘     └─────────────┘     └─────────────┘
//!                                                │
//!                                         ┌──────┴──────┐
//!                                         │ Chart data  │
//!                                         │ (2 sets)    │
//!                                         └─────────────┘
//! ```
//!
//! ## Example
//!
//! ```rust
//! use smartshuffle_core::{FeatureRecord, FeatureSchema, Item};
//! use smartshuffle_session::{CapabilityProfile, SessionConfig, ShuffleSession};
//!
//! let schema = FeatureSchema::new(vec!["energy".to_string(), "valence".to_string()]);
//! let config = SessionConfig::default().with_schema(schema);
//! let items = vec![Item::new("a", "Intro"), Item::new("b", "Anthem"), Item::new("c", "Outro")];
//! let records = vec![
//!     FeatureRecord::new().with("energy", 0.2).with("valence", 0.3),
//!     FeatureRecord::new().with("energy", 0.9).with("valence", 0.8),
//!     FeatureRecord::new().with("energy", 0.3).with("valence", 0.2),
//! ];
//!
//! let session = ShuffleSession::new(items, &records, config).unwrap();
//! let order = session.get_tour().unwrap().order().to_vec();
//! let chart = session.get_chart_data(CapabilityProfile::Constrained).unwrap();
//! assert_eq!(chart.sorted.len(), order.len());
//! ```

pub mod chart;
pub mod config;
pub mod session;

pub use chart::{
    CapabilityProfile, ChartData, ChartDataAdapter, ChartPoint, ChartPointSet, Interaction,
    InteractionSet,
};
pub use config::SessionConfig;
pub use session::{SessionStats, ShuffleSession, Warning};
