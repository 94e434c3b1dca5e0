//! Reference-Frame Normalization
//!
//! Rescales target rows using min/max statistics computed only from the
//! baseline set, then rescales the baseline the same way. Freezing the
//! statistics before touching the target keeps scoring consistent across
//! runs: the target distribution can never shift the scale.
//!
//! The outcome is reported instead of silently swallowed. A
//! dimensionality mismatch is a data-quality problem upstream, and
//! callers decide whether to degrade or abort.

use serde::{Deserialize, Serialize};

use crate::constants::DEGENERATE_RANGE;
use crate::logic::features::FeatureRow;

/// What a normalization call did.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NormalizeOutcome {
    /// Both sets rescaled in place.
    Applied { dims: usize },
    /// Nothing to derive statistics from; no mutation.
    EmptyBaseline,
    /// A row deviated from the baseline's dimensionality; no mutation,
    /// raw values preserved.
    DimensionMismatch { expected: usize, found: usize },
}

impl NormalizeOutcome {
    pub fn is_applied(&self) -> bool {
        matches!(self, NormalizeOutcome::Applied { .. })
    }
}

/// Normalize both row sets using per-dimension min/max learned ONLY from
/// the baseline. Dimensions whose baseline range is below
/// [`DEGENERATE_RANGE`] map to exactly zero (degenerate variance, and the
/// divide-by-zero guard).
pub fn normalize_against_baseline(
    baseline: &mut [FeatureRow],
    target: &mut [FeatureRow],
) -> NormalizeOutcome {
    if baseline.is_empty() {
        return NormalizeOutcome::EmptyBaseline;
    }

    let dims = baseline[0].dims();
    for row in baseline.iter().chain(target.iter()) {
        if row.dims() != dims {
            return NormalizeOutcome::DimensionMismatch {
                expected: dims,
                found: row.dims(),
            };
        }
    }

    let mut min = vec![f32::MAX; dims];
    let mut max = vec![f32::MIN; dims];
    for row in baseline.iter() {
        for (j, &v) in row.values.iter().enumerate() {
            min[j] = min[j].min(v);
            max[j] = max[j].max(v);
        }
    }

    let rescale = |rows: &mut [FeatureRow]| {
        for row in rows {
            for (j, v) in row.values.iter_mut().enumerate() {
                let range = max[j] - min[j];
                *v = if range < DEGENERATE_RANGE {
                    0.0
                } else {
                    (*v - min[j]) / range
                };
            }
        }
    };

    rescale(baseline);
    rescale(target);

    NormalizeOutcome::Applied { dims }
}

// ============================================================================
// TESTS
// ============================================================================
