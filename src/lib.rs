//! Argus Security Monitor - Anomaly Scoring Core
//!
//! Scores user behavior derived from system/security log events and
//! surfaces anomalous activity for the monitoring dashboard. One batch
//! run takes two event windows and flows through:
//!
//! ```text
//! events ─→ features ─→ normalize ─→ score ─→ cache ─→ threats
//!           (per user,   (baseline    (low-rank  (atomic   (explained
//!            per hour)    min/max)     model)     snapshot)  records)
//! ```
//!
//! The baseline window defines "normal": normalization statistics and
//! the detection threshold are derived from it alone, so re-running
//! against different target windows never moves the goalposts. Every
//! insufficient-data condition degrades to a benign zeroed result; the
//! host process must never crash because a log channel went quiet.
//!
//! Log ingestion, rule-based detection, persistence, and the dashboard
//! itself live in their own crates; this one starts at `EventRecord` and
//! ends at `ThreatRecord`.

pub mod constants;
pub mod logic;

// Re-export the pipeline surface
pub use logic::cache::{ResultCache, ScoreSnapshot};
pub use logic::events::EventRecord;
pub use logic::features::{
    build_hourly_features, build_per_user_features, build_per_user_hourly_features, FeatureRow,
    IndicatorTable, LayoutInfo,
};
pub use logic::model::{
    normalize_against_baseline, score_with_baseline, AnomalyResult, AnomalyScorer,
    NormalizeOutcome, ScorerConfig,
};
pub use logic::pipeline::{compute_mean, run_hourly_scan, PipelineConfig};
pub use logic::threat::{build_threats, Severity, ThreatRecord};
