//! Anomaly Scorer - baseline-trained scoring with a stable threshold
//!
//! Fits the low-rank model on the normalized baseline only, derives the
//! detection threshold from the baseline's own score distribution, and
//! scores the target window against it. Because the threshold never
//! depends on the data being evaluated, re-running against a different
//! target window leaves it unchanged.
//!
//! The scorer is a plain value constructed per run: no shared model
//! context, nothing to reset between runs, trivially injectable in tests.

use serde::{Deserialize, Serialize};

use crate::constants::{
    DEFAULT_MODEL_RANK, DEFAULT_PERCENTILE, MIN_BASELINE_ROWS, MODEL_SEED,
};
use crate::logic::features::FeatureRow;
use crate::logic::model::normalize::{normalize_against_baseline, NormalizeOutcome};
use crate::logic::model::pca::LowRankModel;

// ============================================================================
// CONFIG
// ============================================================================

/// Scoring knobs; `Default` matches the shipped detector.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScorerConfig {
    /// Rank of the reconstruction subspace.
    pub rank: usize,
    /// Baseline-score percentile used as the anomaly threshold, in [0, 1].
    pub percentile: f64,
    /// Seed for the model's random projections.
    pub seed: u64,
    /// Below this many baseline rows the model is not trusted and every
    /// target row passes through unflagged with score zero.
    pub min_baseline_rows: usize,
}

impl Default for ScorerConfig {
    fn default() -> Self {
        Self {
            rank: DEFAULT_MODEL_RANK,
            percentile: DEFAULT_PERCENTILE,
            seed: MODEL_SEED,
            min_baseline_rows: MIN_BASELINE_ROWS,
        }
    }
}

// ============================================================================
// RESULT
// ============================================================================

/// Scored entity. The score is always a finite real.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnomalyResult {
    pub entity: String,
    pub score: f32,
    pub is_anomaly: bool,
}

// ============================================================================
// SCORER
// ============================================================================

/// Stateless per-run scorer.
#[derive(Debug, Clone, Default)]
pub struct AnomalyScorer {
    config: ScorerConfig,
}

impl AnomalyScorer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: ScorerConfig) -> Self {
        Self { config }
    }

    pub fn with_percentile(percentile: f64) -> Self {
        Self {
            config: ScorerConfig {
                percentile,
                ..Default::default()
            },
        }
    }

    pub fn config(&self) -> &ScorerConfig {
        &self.config
    }

    /// Train on the baseline rows and score the target rows.
    ///
    /// Both slices are normalized in place against the baseline's min/max
    /// before fitting, so callers observe normalized values afterwards.
    /// Results come back sorted by score descending.
    pub fn score(
        &self,
        baseline: &mut [FeatureRow],
        target: &mut [FeatureRow],
    ) -> Vec<AnomalyResult> {
        if baseline.len() < self.config.min_baseline_rows || target.is_empty() {
            log::debug!(
                "insufficient data for anomaly model ({} baseline rows, {} target rows); passing through",
                baseline.len(),
                target.len()
            );
            return target
                .iter()
                .map(|row| AnomalyResult {
                    entity: row.entity.clone(),
                    score: 0.0,
                    is_anomaly: false,
                })
                .collect();
        }

        match normalize_against_baseline(baseline, target) {
            NormalizeOutcome::Applied { .. } | NormalizeOutcome::EmptyBaseline => {}
            NormalizeOutcome::DimensionMismatch { expected, found } => {
                log::warn!(
                    "feature dimensionality mismatch (expected {}, found {}); scoring raw values",
                    expected,
                    found
                );
            }
        }

        let model = LowRankModel::fit(baseline, self.config.rank, self.config.seed);

        let baseline_scores: Vec<f32> = baseline
            .iter()
            .map(|row| sanitize_score(model.score(&row.values)))
            .collect();
        let threshold = percentile(&baseline_scores, self.config.percentile);

        let mut scored: Vec<AnomalyResult> = target
            .iter()
            .map(|row| {
                let score = sanitize_score(model.score(&row.values));
                AnomalyResult {
                    entity: row.entity.clone(),
                    score,
                    is_anomaly: score > threshold,
                }
            })
            .collect();

        // Fallback: surface the top row when nothing crosses the
        // threshold, as long as the window is big enough to rank.
        if !scored.iter().any(|s| s.is_anomaly) && scored.len() >= 3 {
            if let Some(top) = scored
                .iter_mut()
                .max_by(|a, b| a.score.partial_cmp(&b.score).unwrap_or(std::cmp::Ordering::Equal))
            {
                top.is_anomaly = true;
            }
        }

        scored.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(std::cmp::Ordering::Equal)
        });

        let flagged = scored.iter().filter(|s| s.is_anomaly).count();
        log::info!(
            "scored {} target rows against {} baseline rows (threshold {:.4}, {} flagged)",
            scored.len(),
            baseline.len(),
            threshold,
            flagged
        );

        scored
    }
}

/// Backward-compatible entry point: default configuration, 0.99 percentile.
pub fn score_with_baseline(
    baseline: &mut [FeatureRow],
    target: &mut [FeatureRow],
) -> Vec<AnomalyResult> {
    AnomalyScorer::new().score(baseline, target)
}

// ============================================================================
// HELPERS
// ============================================================================

/// Non-finite model output maps to zero before any comparison.
fn sanitize_score(score: f32) -> f32 {
    if score.is_finite() {
        score
    } else {
        0.0
    }
}

/// Percentile of a score set: the value at rank `round((n-1) * p)` of the
/// ascending order, with `p` clamped to [0, 1]. `percentile(_, 0.0)` is
/// the minimum, `percentile(_, 1.0)` the maximum.
pub fn percentile(values: &[f32], p: f64) -> f32 {
    if values.is_empty() {
        return 0.0;
    }

    let p = p.clamp(0.0, 1.0);
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));

    let idx = ((sorted.len() - 1) as f64 * p).round() as usize;
    sorted[idx.min(sorted.len() - 1)]
}

// ============================================================================
// TESTS
// ============================================================================
