//! Feature matrix assembly
//!
//! Turns per-item feature records (named numeric fields) into a rectangular
//! matrix whose row order matches the item order. Records are matched to items
//! by position, never by id.

use crate::{Error, FeatureVector, Item, Result};
use ahash::AHashMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Default feature fields: the ten audio features of a track
pub const DEFAULT_FEATURE_FIELDS: [&str; 10] = [
    "danceability",
    "energy",
    "key",
    "loudness",
    "speechiness",
    "acousticness",
    "instrumentalness",
    "liveness",
    "valence",
    "tempo",
];

/// Ordered list of feature fields that make up each matrix row
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FeatureSchema {
    pub fields: Vec<String>,
}

impl Default for FeatureSchema {
    fn default() -> Self {
        Self::new(DEFAULT_FEATURE_FIELDS.iter().map(|f| f.to_string()).collect())
    }
}

impl FeatureSchema {
    pub fn new(fields: Vec<String>) -> Self {
        Self { fields }
    }

    /// Number of columns in the matrix
    pub fn arity(&self) -> usize {
        self.fields.len()
    }

    /// Reject empty schemas and duplicate field names
    pub fn validate(&self) -> Result<()> {
        if self.fields.is_empty() {
            return Err(Error::InvalidConfig("feature schema has no fields".to_string()));
        }
        let mut seen = ahash::AHashSet::with_capacity(self.fields.len());
        for field in &self.fields {
            if !seen.insert(field.as_str()) {
                return Err(Error::InvalidConfig(format!(
                    "feature field '{}' listed more than once",
                    field
                )));
            }
        }
        Ok(())
    }
}

/// Named numeric feature values describing one item
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FeatureRecord {
    values: AHashMap<String, f64>,
    /// Fields present in the source but not numeric
    non_numeric: Vec<String>,
}

impl FeatureRecord {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with(mut self, field: impl Into<String>, value: f64) -> Self {
        self.insert(field, value);
        self
    }

    pub fn insert(&mut self, field: impl Into<String>, value: f64) {
        self.values.insert(field.into(), value);
    }

    pub fn get(&self, field: &str) -> Option<f64> {
        self.values.get(field).copied()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Build a record from a JSON object.
    ///
    /// Numeric entries become feature values. Anything else (ids, URIs, type
    /// tags) is remembered only so that a schema field holding a non-number can
    /// be reported precisely.
    pub fn from_json(value: &Value) -> Result<Self> {
        let object = value.as_object().ok_or_else(|| {
            Error::Serialization("feature record must be a JSON object".to_string())
        })?;

        let mut record = Self::new();
        for (field, v) in object {
            match v.as_f64() {
                Some(num) => record.insert(field.clone(), num),
                None => record.non_numeric.push(field.clone()),
            }
        }
        Ok(record)
    }

    fn is_non_numeric(&self, field: &str) -> bool {
        self.non_numeric.iter().any(|f| f == field)
    }
}

impl<K: Into<String>> FromIterator<(K, f64)> for FeatureRecord {
    fn from_iter<I: IntoIterator<Item = (K, f64)>>(iter: I) -> Self {
        let mut record = Self::new();
        for (field, value) in iter {
            record.insert(field, value);
        }
        record
    }
}

/// An N×D matrix of finite feature values, one row per item
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FeatureMatrix {
    rows: Vec<FeatureVector>,
    dim: usize,
}

impl FeatureMatrix {
    /// Wrap pre-built rows, checking that they are rectangular and finite
    pub fn from_rows(rows: Vec<FeatureVector>, dim: usize) -> Result<Self> {
        for (index, row) in rows.iter().enumerate() {
            if row.dim() != dim {
                return Err(Error::InvalidDimension {
                    expected: dim,
                    actual: row.dim(),
                });
            }
            if let Some(col) = row.first_non_finite() {
                return Err(Error::NonFinite {
                    index,
                    field: format!("#{}", col),
                });
            }
        }
        Ok(Self { rows, dim })
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    #[inline]
    pub fn dim(&self) -> usize {
        self.dim
    }

    #[inline]
    pub fn row(&self, index: usize) -> &[f64] {
        self.rows[index].as_slice()
    }

    pub fn rows(&self) -> &[FeatureVector] {
        &self.rows
    }
}

/// Assembles a [`FeatureMatrix`] from items and their feature records
#[derive(Debug, Clone, Default)]
pub struct FeatureMatrixBuilder {
    schema: FeatureSchema,
}

impl FeatureMatrixBuilder {
    pub fn new(schema: FeatureSchema) -> Self {
        Self { schema }
    }

    pub fn schema(&self) -> &FeatureSchema {
        &self.schema
    }

    /// Build the matrix.
    ///
    /// Row `i` is taken from `records[i]` and describes `items[i]`. Fails on a
    /// cardinality mismatch, a missing or non-numeric schema field, or a
    /// non-finite value.
    pub fn build(&self, items: &[Item], records: &[FeatureRecord]) -> Result<FeatureMatrix> {
        if items.len() != records.len() {
            return Err(Error::CardinalityMismatch {
                items: items.len(),
                records: records.len(),
            });
        }

        let dim = self.schema.arity();
        let mut rows = Vec::with_capacity(records.len());

        for (index, record) in records.iter().enumerate() {
            let mut row = Vec::with_capacity(dim);
            for field in &self.schema.fields {
                let value = match record.get(field) {
                    Some(v) => v,
                    None if record.is_non_numeric(field) => {
                        return Err(Error::NonNumericField {
                            index,
                            field: field.clone(),
                        })
                    }
                    None => {
                        return Err(Error::MissingField {
                            index,
                            field: field.clone(),
                        })
                    }
                };
                if !value.is_finite() {
                    return Err(Error::NonFinite {
                        index,
                        field: field.clone(),
                    });
                }
                row.push(value);
            }
            rows.push(FeatureVector::new(row));
        }

        Ok(FeatureMatrix { rows, dim })
    }
}
