//! Threat Module
//!
//! Turns flagged anomalies into dashboard-facing threat records with
//! per-feature explanations. Rule-based detections live elsewhere; the
//! fixed source/technique tags here mark records as model-sourced.

pub mod explainer;
pub mod types;

// Re-export common types
pub use explainer::{build_threats, ML_SOURCE, ML_TACTIC, ML_TECHNIQUE, ML_THREAT_NAME};
pub use types::{Severity, ThreatRecord};
