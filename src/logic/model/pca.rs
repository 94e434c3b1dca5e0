//! Low-Rank Reconstruction Model
//!
//! Randomized principal-component model over the normalized baseline:
//! rows are centered to zero mean and the top principal directions are
//! found by seeded orthogonal iteration on the covariance. A row's
//! anomaly score is a weighted reconstruction error: the residual outside
//! the learned subspace counts at full weight, while deviation along a
//! retained direction is damped in proportion to how much the baseline
//! itself varies there. Directions the baseline never moves in therefore
//! count fully, so a row that is merely "very far along a normal axis"
//! still stands out instead of reconstructing for free.
//!
//! The projection seed is fixed, so the fitted basis and every
//! downstream threshold are identical across runs over unchanged data.

use ndarray::{Array1, Array2, Axis};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::logic::features::FeatureRow;

/// Orthogonal-iteration sweeps. The feature space is small (6-12 dims),
/// so a handful of sweeps converges.
const POWER_ITERATIONS: usize = 8;

/// Columns with norms below this are treated as collapsed during
/// orthonormalization.
const COLLAPSE_EPS: f32 = 1e-8;

/// Principal directions with variance below this are dropped from the
/// retained basis.
const VARIANCE_EPS: f32 = 1e-6;

/// A fitted model: baseline mean, an orthonormal basis of the retained
/// principal directions, and one damping weight per direction.
#[derive(Debug, Clone)]
pub struct LowRankModel {
    mean: Array1<f32>,
    basis: Array2<f32>,
    weights: Vec<f32>,
}

impl LowRankModel {
    /// Fit on baseline rows. All rows must share one dimensionality
    /// (the scorer guards this before calling).
    pub fn fit(rows: &[FeatureRow], rank: usize, seed: u64) -> Self {
        let n = rows.len();
        let d = rows.first().map(|r| r.dims()).unwrap_or(0);
        let k = rank.min(d);

        let mut data = Array2::<f32>::zeros((n, d));
        for (i, row) in rows.iter().enumerate() {
            for (j, &v) in row.values.iter().enumerate() {
                data[(i, j)] = v;
            }
        }

        let mean = if n > 0 {
            data.sum_axis(Axis(0)) / n as f32
        } else {
            Array1::zeros(d)
        };
        let centered = &data - &mean;
        let cov = centered.t().dot(&centered) / (n.max(1) as f32);

        // Seeded random start, then orthogonal iteration toward the
        // top-k eigenvectors of the covariance.
        let mut rng = StdRng::seed_from_u64(seed);
        let mut candidate = Array2::<f32>::zeros((d, k));
        for v in candidate.iter_mut() {
            *v = rng.gen_range(-1.0..1.0);
        }
        orthonormalize(&mut candidate);

        for _ in 0..POWER_ITERATIONS {
            candidate = cov.dot(&candidate);
            orthonormalize(&mut candidate);
        }

        // Keep directions with real baseline variance; weight each so
        // that high-variance (expected) movement is forgiven and barely
        // varying directions count at full weight.
        let mut kept: Vec<(Array1<f32>, f32)> = Vec::new();
        for j in 0..candidate.ncols() {
            let col = candidate.column(j).to_owned();
            let variance = col.dot(&cov.dot(&col));
            if col.dot(&col) > 0.5 && variance > VARIANCE_EPS {
                kept.push((col, variance));
            }
        }
        let min_variance = kept
            .iter()
            .map(|(_, v)| *v)
            .fold(f32::MAX, f32::min);

        let mut basis = Array2::<f32>::zeros((d, kept.len()));
        let mut weights = Vec::with_capacity(kept.len());
        for (j, (col, variance)) in kept.into_iter().enumerate() {
            basis.column_mut(j).assign(&col);
            weights.push(min_variance / variance);
        }

        Self {
            mean,
            basis,
            weights,
        }
    }

    /// Weighted reconstruction error for one row. Returns 0 for rows
    /// whose dimensionality does not match the fitted space.
    pub fn score(&self, values: &[f32]) -> f32 {
        if values.len() != self.mean.len() {
            return 0.0;
        }

        let x = Array1::from_iter(values.iter().copied());
        let centered = &x - &self.mean;
        let coords = self.basis.t().dot(&centered);

        let total = centered.dot(&centered);
        let explained = coords.dot(&coords);
        let residual_sq = (total - explained).max(0.0);

        let damped_sq: f32 = coords
            .iter()
            .zip(self.weights.iter())
            .map(|(c, w)| c * c * w)
            .sum();

        (residual_sq + damped_sq).sqrt()
    }

    /// Number of retained principal directions (at most the requested
    /// rank, fewer when the baseline's variance is degenerate).
    pub fn rank(&self) -> usize {
        self.basis.ncols()
    }
}

/// Modified Gram-Schmidt over the columns. Collapsed columns (linearly
/// dependent or fed by a degenerate covariance) are zeroed; the fit step
/// drops them from the retained basis.
fn orthonormalize(m: &mut Array2<f32>) {
    let cols = m.ncols();
    for j in 0..cols {
        for prev in 0..j {
            let dot = m.column(j).dot(&m.column(prev));
            let prev_col = m.column(prev).to_owned();
            let mut col = m.column_mut(j);
            col.scaled_add(-dot, &prev_col);
        }
        let norm = m.column(j).dot(&m.column(j)).sqrt();
        let mut col = m.column_mut(j);
        if norm < COLLAPSE_EPS {
            col.fill(0.0);
        } else {
            col.mapv_inplace(|v| v / norm);
        }
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn row(entity: &str, values: &[f32]) -> FeatureRow {
        FeatureRow::new(entity, values.to_vec())
    }

    #[test]
    fn test_mean_row_scores_zero_and_residual_counts_fully() {
        // Rows on a line through the origin: one retained direction.
        let rows: Vec<FeatureRow> = (0..12)
            .map(|i| {
                let t = i as f32 / 11.0;
                row(&format!("u{}", i), &[t, 2.0 * t, 0.0, 0.0])
            })
            .collect();

        let model = LowRankModel::fit(&rows, 1, 1);
        assert_eq!(model.rank(), 1);

        let at_mean = model.score(&[0.5, 1.0, 0.0, 0.0]);
        assert!(at_mean < 1e-3, "row at the mean should score ~0: {}", at_mean);

        let off_subspace = model.score(&[0.5, 1.0, 0.0, 3.0]);
        assert!(
            (off_subspace - 3.0).abs() < 1e-3,
            "off-subspace error counts at full weight: {}",
            off_subspace
        );
    }

    #[test]
    fn test_far_along_normal_axis_still_scores() {
        let rows: Vec<FeatureRow> = (0..12)
            .map(|i| row(&format!("u{}", i), &[(i % 5) as f32 * 0.25, 0.0, 0.0]))
            .collect();
        let model = LowRankModel::fit(&rows, 3, 1);

        let baseline_max = rows
            .iter()
            .map(|r| model.score(&r.values))
            .fold(0.0f32, f32::max);
        let runaway = model.score(&[10.0, 0.0, 0.0]);
        assert!(
            runaway > baseline_max * 5.0,
            "magnitude outlier must dominate baseline scores: {} vs {}",
            runaway,
            baseline_max
        );
    }

    #[test]
    fn test_fit_is_deterministic() {
        let rows: Vec<FeatureRow> = (0..15)
            .map(|i| row(&format!("u{}", i), &[i as f32, (i % 3) as f32, 1.0]))
            .collect();

        let a = LowRankModel::fit(&rows, 3, 1);
        let b = LowRankModel::fit(&rows, 3, 1);

        let probe = [7.5, 2.5, -1.0];
        assert_eq!(a.score(&probe), b.score(&probe));
    }

    #[test]
    fn test_constant_baseline_scores_by_distance_from_mean() {
        let rows: Vec<FeatureRow> = (0..10)
            .map(|i| row(&format!("u{}", i), &[1.0, 1.0]))
            .collect();
        let model = LowRankModel::fit(&rows, 3, 1);

        // Zero covariance retains nothing; the score degenerates to
        // plain distance from the mean.
        assert_eq!(model.rank(), 0);
        assert_eq!(model.score(&[1.0, 1.0]), 0.0);
        let off = model.score(&[4.0, 5.0]);
        assert!((off - 5.0).abs() < 1e-4, "expected 5, got {}", off);
    }

    #[test]
    fn test_rank_limited_by_real_variance() {
        let rows: Vec<FeatureRow> = (0..10)
            .map(|i| row(&format!("u{}", i), &[i as f32, 1.0]))
            .collect();
        let model = LowRankModel::fit(&rows, 3, 1);
        assert_eq!(model.rank(), 1, "only one direction actually varies");
    }

    #[test]
    fn test_mismatched_probe_scores_zero() {
        let rows: Vec<FeatureRow> = (0..10)
            .map(|i| row(&format!("u{}", i), &[i as f32, 1.0]))
            .collect();
        let model = LowRankModel::fit(&rows, 2, 1);
        assert_eq!(model.score(&[1.0, 2.0, 3.0]), 0.0);
    }
}
