//! Threat Types
//!
//! Data structures handed to the presentation layer. No logic here
//! beyond the severity boundary.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::constants::HIGH_SEVERITY_SCORE;

// ============================================================================
// SEVERITY
// ============================================================================

/// Severity tier for model-sourced threats. Exactly two tiers; the
/// dashboard's filter rows depend on these literal strings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Severity {
    Medium,
    High,
}

impl Severity {
    /// Single-threshold mapping: `High` at and above the boundary score.
    pub fn from_score(score: f32) -> Self {
        if score >= HIGH_SEVERITY_SCORE {
            Severity::High
        } else {
            Severity::Medium
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Medium => "Medium",
            Severity::High => "High",
        }
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ============================================================================
// THREAT RECORD
// ============================================================================

/// One dashboard-facing threat entry produced from a flagged anomaly.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ThreatRecord {
    /// When the record was generated (UTC).
    pub time: DateTime<Utc>,
    /// Entity key the anomaly was scored under.
    pub user: String,
    /// Detection origin tag; distinguishes model detections from rules.
    pub source: String,
    /// Technique tag shown in the technique filter.
    pub technique: String,
    /// Display name.
    pub name: String,
    /// Tactic label.
    pub tactic: String,
    /// Severity tier.
    pub severity: Severity,
    /// Multi-line explanation text.
    pub details: String,
}

// ============================================================================
// TESTS
// ============================================================================
