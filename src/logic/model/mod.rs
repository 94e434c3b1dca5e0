//! Model Module - Unsupervised Anomaly Scoring
//!
//! Reference-frame normalization, the low-rank reconstruction model, and
//! the baseline-thresholded scorer. The scorer is constructed per run;
//! nothing in here holds shared state.

pub mod normalize;
pub mod pca;
pub mod scorer;

// Re-export common types
pub use normalize::{normalize_against_baseline, NormalizeOutcome};
pub use pca::LowRankModel;
pub use scorer::{percentile, score_with_baseline, AnomalyResult, AnomalyScorer, ScorerConfig};
