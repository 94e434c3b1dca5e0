//! Threat Explainer - flagged anomalies to dashboard records
//!
//! Converts each flagged anomaly into a `ThreatRecord` annotated with the
//! top contributing feature deviations versus the baseline mean. Every
//! flagged result yields a record; when the feature breakdown is not
//! available the explanation degrades to a fixed sentence instead of
//! dropping the record.

use std::collections::HashMap;

use chrono::{DateTime, Utc};

use crate::logic::features::layout::feature_label;
use crate::logic::features::FeatureRow;
use crate::logic::model::AnomalyResult;
use crate::logic::threat::types::{Severity, ThreatRecord};

/// Origin tag for model-sourced detections.
pub const ML_SOURCE: &str = "ML";
/// Technique tag for model-sourced detections.
pub const ML_TECHNIQUE: &str = "ML";
/// Display name for model-sourced detections.
pub const ML_THREAT_NAME: &str = "ML: Unusual activity";
/// Tactic label for model-sourced detections.
pub const ML_TACTIC: &str = "Anomaly Detection";

/// Most feature deviations quoted per record.
const MAX_REASONS: usize = 3;

/// Fixed sentence when no dimension deviates upward.
const NO_DEVIATION_SENTENCE: &str =
    "No strong feature deviation from baseline (score-based anomaly).";

/// Build one threat record per flagged anomaly.
///
/// `rows_by_entity` and `baseline_mean` come from the same scoring run as
/// `scored`; the explainer only reads them.
pub fn build_threats(
    scored: &[AnomalyResult],
    rows_by_entity: &HashMap<String, FeatureRow>,
    baseline_mean: &[f32],
    generated_at: DateTime<Utc>,
) -> Vec<ThreatRecord> {
    let mut records = Vec::new();

    for result in scored.iter().filter(|r| r.is_anomaly) {
        let mut details = format!("ML anomaly score: {:.3}\n", result.score);

        let row = rows_by_entity.get(&result.entity);
        match row {
            Some(row) if row.dims() == baseline_mean.len() && !baseline_mean.is_empty() => {
                let reasons = build_reasons(&row.values, baseline_mean);
                details.push_str("\nReasons:\n- ");
                details.push_str(&reasons.join("\n- "));
            }
            _ => {
                details.push_str("\nReasons: (no feature breakdown available)");
            }
        }

        records.push(ThreatRecord {
            time: generated_at,
            user: result.entity.clone(),
            source: ML_SOURCE.to_string(),
            technique: ML_TECHNIQUE.to_string(),
            name: ML_THREAT_NAME.to_string(),
            tactic: ML_TACTIC.to_string(),
            severity: Severity::from_score(result.score),
            details,
        });
    }

    records
}

/// Top positive deviations from the baseline mean, largest first, at most
/// [`MAX_REASONS`] lines. Falls back to a fixed sentence when nothing
/// deviates upward.
fn build_reasons(values: &[f32], mean: &[f32]) -> Vec<String> {
    let mut deltas: Vec<(usize, f32, f32)> = values
        .iter()
        .zip(mean.iter())
        .enumerate()
        .map(|(i, (&v, &m))| (i, v - m, v))
        .collect();
    deltas.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));

    let mut reasons = Vec::new();
    for (i, delta, value) in deltas.into_iter().take(MAX_REASONS) {
        if delta <= 0.0 {
            continue;
        }
        let label = feature_label(i)
            .map(|l| l.to_string())
            .unwrap_or_else(|| format!("Feature {}", i));
        reasons.push(format!(
            "{} is higher than baseline (value {}).",
            label,
            format_value(value)
        ));
    }

    if reasons.is_empty() {
        reasons.push(NO_DEVIATION_SENTENCE.to_string());
    }

    reasons
}

/// Up to three decimals, trailing zeros trimmed ("50", "10.5", "0.125").
fn format_value(v: f32) -> String {
    let s = format!("{:.3}", v);
    let trimmed = s.trim_end_matches('0').trim_end_matches('.');
    if trimmed == "-0" {
        "0".to_string()
    } else {
        trimmed.to_string()
    }
}

// ============================================================================
// TESTS
// ============================================================================
