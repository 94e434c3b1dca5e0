//! Result Cache - last completed scoring run
//!
//! Holds the most recent run's outputs for presentation-layer readers:
//! the scored results, the entity-key lookup used to build them, and the
//! baseline mean vector the explainer compares against.
//!
//! Publication is one atomic swap of an immutable snapshot behind an
//! `Arc`. Readers clone the `Arc` and keep a complete, internally
//! consistent view for as long as they hold it; they can never observe
//! new scores paired with a stale row map.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

use crate::logic::features::{FeatureRow, LayoutInfo};
use crate::logic::model::AnomalyResult;

// ============================================================================
// SNAPSHOT
// ============================================================================

/// Complete output of one scoring run. Immutable once published.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoreSnapshot {
    /// Scored target entities, sorted by score descending.
    pub scored: Vec<AnomalyResult>,
    /// Entity key to the (normalized) feature row behind its score.
    pub rows_by_entity: HashMap<String, FeatureRow>,
    /// Centroid of the (normalized) baseline rows.
    pub baseline_mean: Vec<f32>,
    /// Feature layout the vectors in this snapshot were built under.
    pub layout: LayoutInfo,
    /// When the run completed (UTC).
    pub updated_at: DateTime<Utc>,
}

impl ScoreSnapshot {
    /// The pre-first-run snapshot: no results, epoch timestamp.
    pub fn empty() -> Self {
        Self {
            scored: Vec::new(),
            rows_by_entity: HashMap::new(),
            baseline_mean: Vec::new(),
            layout: LayoutInfo::current_hourly(),
            updated_at: DateTime::UNIX_EPOCH,
        }
    }

    /// True until the first run publishes.
    pub fn is_empty(&self) -> bool {
        self.scored.is_empty() && self.updated_at == DateTime::UNIX_EPOCH
    }

    /// Convert to a JSONL line for the audit log.
    pub fn to_jsonl(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| "{}".to_string())
    }
}

// ============================================================================
// CACHE
// ============================================================================

/// Owner of the latest snapshot. One per process, owned by the embedding
/// application and shared by reference with readers.
#[derive(Debug)]
pub struct ResultCache {
    inner: RwLock<Arc<ScoreSnapshot>>,
}

impl ResultCache {
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(Arc::new(ScoreSnapshot::empty())),
        }
    }

    /// Replace the whole snapshot in one swap.
    pub fn publish(&self, snapshot: ScoreSnapshot) {
        *self.inner.write() = Arc::new(snapshot);
    }

    /// Current snapshot. The returned `Arc` stays consistent even if a
    /// new run publishes while the caller still holds it.
    pub fn snapshot(&self) -> Arc<ScoreSnapshot> {
        self.inner.read().clone()
    }
}

impl Default for ResultCache {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot_with(entity: &str, score: f32) -> ScoreSnapshot {
        let row = FeatureRow::new(entity, vec![1.0, 2.0]);
        ScoreSnapshot {
            scored: vec![AnomalyResult {
                entity: entity.to_string(),
                score,
                is_anomaly: true,
            }],
            rows_by_entity: HashMap::from([(entity.to_string(), row)]),
            baseline_mean: vec![0.5, 0.5],
            layout: LayoutInfo::current_hourly(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_initial_snapshot_is_empty() {
        let cache = ResultCache::new();
        let snap = cache.snapshot();
        assert!(snap.is_empty());
        assert_eq!(snap.updated_at, DateTime::UNIX_EPOCH);
    }

    #[test]
    fn test_publish_replaces_everything_at_once() {
        let cache = ResultCache::new();
        cache.publish(snapshot_with("alice | 08-01 10:00", 0.9));

        let snap = cache.snapshot();
        assert_eq!(snap.scored.len(), 1);
        assert!(snap.rows_by_entity.contains_key("alice | 08-01 10:00"));
        assert_eq!(snap.baseline_mean.len(), 2);
        assert!(!snap.is_empty());
    }

    #[test]
    fn test_snapshot_to_jsonl() {
        let jsonl = snapshot_with("alice", 0.9).to_jsonl();
        assert!(jsonl.contains("alice"));
        assert!(!jsonl.contains('\n'), "JSONL = single line");
    }

    #[test]
    fn test_reader_keeps_consistent_view_across_publish() {
        let cache = ResultCache::new();
        cache.publish(snapshot_with("alice", 0.9));

        let held = cache.snapshot();
        cache.publish(snapshot_with("bob", 0.4));

        // The held snapshot still pairs alice's result with alice's row.
        assert_eq!(held.scored[0].entity, "alice");
        assert!(held.rows_by_entity.contains_key("alice"));

        let fresh = cache.snapshot();
        assert_eq!(fresh.scored[0].entity, "bob");
    }
}
