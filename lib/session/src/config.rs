//! Session configuration
//!
//! Aggregates the per-stage configurations. Every field has a default, so a
//! JSON file only needs to name what it changes:
//!
//! ```json
//! { "embedding": { "seed": 7 }, "tour": { "depot": 3, "time_budget_ms": 250 } }
//! ```

use serde::{Deserialize, Serialize};
use smartshuffle_core::{EmbeddingConfig, FeatureSchema, Result, TourConfig};
use std::path::Path;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    pub schema: FeatureSchema,
    pub embedding: EmbeddingConfig,
    pub tour: TourConfig,
}

impl SessionConfig {
    pub fn validate(&self) -> Result<()> {
        self.schema.validate()?;
        self.embedding.validate()?;
        Ok(())
    }

    /// Load and validate a JSON configuration file
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        let config: SessionConfig = serde_json::from_str(&raw)?;
        config.validate()?;
        Ok(config)
    }

    #[must_use]
    pub fn with_schema(mut self, schema: FeatureSchema) -> Self {
        self.schema = schema;
        self
    }

    #[must_use]
    pub fn with_embedding(mut self, embedding: EmbeddingConfig) -> Self {
        self.embedding = embedding;
        self
    }

    #[must_use]
    pub fn with_depot(mut self, depot: usize) -> Self {
        self.tour.depot = depot;
        self
    }
}
