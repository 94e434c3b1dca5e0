//! Feature Row - per-entity numeric vector
//!
//! One row per entity key: either a plain user identity (whole-window
//! mode) or a "user | hour-bucket" composite (hourly mode). All rows
//! processed together in one run must share one dimensionality; the
//! normalizer and scorer check this before touching values.

use serde::{Deserialize, Serialize};

/// (entity key, numeric vector) pair produced by the feature builder.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureRow {
    /// User identity, or "user | MM-DD HH:00" in hourly mode.
    pub entity: String,
    /// Feature values in layout order.
    pub values: Vec<f32>,
}

impl FeatureRow {
    pub fn new(entity: &str, values: Vec<f32>) -> Self {
        Self {
            entity: entity.to_string(),
            values,
        }
    }

    /// Vector dimensionality.
    pub fn dims(&self) -> usize {
        self.values.len()
    }

    /// Get a value by dimension index.
    pub fn get(&self, index: usize) -> Option<f32> {
        self.values.get(index).copied()
    }
}
