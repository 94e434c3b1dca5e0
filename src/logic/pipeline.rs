//! Scoring Pipeline - one batch run over two windows
//!
//! Wires the stages together: hourly feature rows for the baseline and
//! target windows, a fresh scorer, the baseline centroid for the
//! explainer, and one snapshot published to the cache. Synchronous and
//! single-threaded; an external scheduler decides when runs happen.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::constants::{DEFAULT_BASELINE_LOOKBACK_HOURS, DEFAULT_LOOKBACK_HOURS};
use crate::logic::cache::{ResultCache, ScoreSnapshot};
use crate::logic::events::EventRecord;
use crate::logic::features::{
    build_per_user_hourly_features, FeatureRow, IndicatorTable, LayoutInfo,
};
use crate::logic::model::{AnomalyResult, AnomalyScorer, ScorerConfig};

// ============================================================================
// CONFIG
// ============================================================================

/// Everything one run needs; `Default` matches the shipped detector.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    pub scorer: ScorerConfig,
    pub indicators: IndicatorTable,
    /// Lookback applied to the target window (hours).
    pub target_lookback_hours: i64,
    /// Lookback applied to the baseline window (hours). Wider than the
    /// target's so a trusted multi-day reference period survives the
    /// cutoff.
    pub baseline_lookback_hours: i64,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            scorer: ScorerConfig::default(),
            indicators: IndicatorTable::default(),
            target_lookback_hours: DEFAULT_LOOKBACK_HOURS,
            baseline_lookback_hours: DEFAULT_BASELINE_LOOKBACK_HOURS,
        }
    }
}

// ============================================================================
// RUN
// ============================================================================

/// Score the target window against the baseline window and publish the
/// complete result set to `cache`. Returns the scored results.
pub fn run_hourly_scan(
    baseline_events: &[EventRecord],
    target_events: &[EventRecord],
    config: &PipelineConfig,
    cache: &ResultCache,
    now: DateTime<Utc>,
) -> Vec<AnomalyResult> {
    let mut baseline_rows = build_per_user_hourly_features(
        baseline_events,
        config.baseline_lookback_hours,
        now,
        &config.indicators,
    );
    let mut target_rows = build_per_user_hourly_features(
        target_events,
        config.target_lookback_hours,
        now,
        &config.indicators,
    );

    let scorer = AnomalyScorer::with_config(config.scorer.clone());
    let scored = scorer.score(&mut baseline_rows, &mut target_rows);

    // Rows and mean are read after scoring, i.e. in the normalized frame
    // the scores were computed in; the explainer's deltas stay comparable.
    let baseline_mean = compute_mean(&baseline_rows);
    let rows_by_entity = target_rows
        .into_iter()
        .map(|row| (row.entity.clone(), row))
        .collect();

    cache.publish(ScoreSnapshot {
        scored: scored.clone(),
        rows_by_entity,
        baseline_mean,
        layout: LayoutInfo::current_hourly(),
        updated_at: now,
    });

    log::info!(
        "hourly scan complete: {} baseline events -> {} rows, {} target events -> {} results",
        baseline_events.len(),
        baseline_rows.len(),
        target_events.len(),
        scored.len()
    );

    scored
}

/// Centroid of a row set, one component per dimension. Empty input
/// yields an empty vector.
pub fn compute_mean(rows: &[FeatureRow]) -> Vec<f32> {
    let Some(first) = rows.first() else {
        return Vec::new();
    };

    let dims = first.dims();
    let mut mean = vec![0.0f32; dims];
    for row in rows {
        for (j, &v) in row.values.iter().enumerate().take(dims) {
            mean[j] += v;
        }
    }
    for v in mean.iter_mut() {
        *v /= rows.len() as f32;
    }
    mean
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    use crate::logic::threat::{build_threats, Severity};

    fn init_logs() {
        let _ = env_logger::builder().is_test(true).try_init();
    }

    #[test]
    fn test_compute_mean() {
        let rows = vec![
            FeatureRow::new("a", vec![1.0, 2.0]),
            FeatureRow::new("b", vec![3.0, 6.0]),
        ];
        assert_eq!(compute_mean(&rows), vec![2.0, 4.0]);
        assert!(compute_mean(&[]).is_empty());
    }

    /// Reference scenario: a tight 6-dimension baseline with jitter only
    /// in total-event volume, one loud target user. The target must be
    /// flagged, explained by its positive deviations, and tiered by the
    /// 0.8 boundary.
    #[test]
    fn test_reference_scenario_vectors() {
        let mut baseline: Vec<FeatureRow> = (0..12)
            .map(|i| {
                let jitter = 8.0 + (i % 5) as f32; // 8..12
                FeatureRow::new(&format!("user{}", i), vec![jitter, 0.0, 0.0, 0.0, 2.0, 1.0])
            })
            .collect();
        let mut target = vec![FeatureRow::new(
            "alice",
            vec![50.0, 6.0, 6.0, 6.0, 9.0, 9.0],
        )];

        let scored = AnomalyScorer::new().score(&mut baseline, &mut target);
        assert_eq!(scored.len(), 1);
        assert!(scored[0].is_anomaly, "alice must cross the 99th percentile");

        let mean = compute_mean(&baseline);
        let rows = std::collections::HashMap::from([("alice".to_string(), target[0].clone())]);
        let records = build_threats(&scored, &rows, &mean, Utc::now());

        assert_eq!(records.len(), 1);
        let record = &records[0];
        assert_eq!(record.severity, Severity::from_score(scored[0].score));
        assert_eq!(record.severity, Severity::High);

        let reason_lines: Vec<&str> = record
            .details
            .lines()
            .filter(|l| l.starts_with("- ") || l.starts_with("Total") || l.contains("higher than baseline"))
            .collect();
        assert!(!reason_lines.is_empty(), "details carry a reasons block");
        assert!(
            record.details.contains("Total events is higher than baseline"),
            "the dominant deviation is total event volume: {}",
            record.details
        );
    }

    /// Full run over raw events: quiet baseline users, one noisy target
    /// user, snapshot published as a unit.
    #[test]
    fn test_run_hourly_scan_end_to_end() {
        init_logs();
        let now = Utc.with_ymd_and_hms(2026, 8, 1, 12, 0, 0).unwrap();

        // Baseline: three users across three days, one or two benign
        // events per (user, hour) bucket → 18 rows.
        let mut baseline_events = Vec::new();
        for day in 29..=31 {
            for hour in [9, 11] {
                for user in ["u1", "u2", "u3"] {
                    baseline_events.push(
                        EventRecord::new(
                            &format!("2026-07-{:02} {:02}:10:00", day, hour),
                            "Security",
                            "Information",
                            user,
                        )
                        .with_event_id(4624)
                        .with_process("winlogon.exe")
                        .with_source("DC01"),
                    );
                    if user == "u1" {
                        baseline_events.push(
                            EventRecord::new(
                                &format!("2026-07-{:02} {:02}:40:00", day, hour),
                                "System",
                                "Information",
                                user,
                            )
                            .with_process("services.exe")
                            .with_source("HOST1"),
                        );
                    }
                }
            }
        }

        // Target: one quiet bucket and one brute-force burst.
        let mut target_events = vec![EventRecord::new(
            "2026-08-01 09:05:00",
            "Security",
            "Information",
            "u1",
        )
        .with_event_id(4624)
        .with_process("winlogon.exe")
        .with_source("DC01")];
        for minute in 0..30 {
            target_events.push(
                EventRecord::new(
                    &format!("2026-08-01 10:{:02}:00", minute),
                    "Security",
                    "Information",
                    "mallory",
                )
                .with_event_id(4625)
                .with_process("lsass.exe")
                .with_source("DC01")
                .with_details("An account failed to log on"),
            );
        }
        target_events.push(
            EventRecord::new("2026-08-01 10:30:00", "Sysmon", "Information", "mallory")
                .with_event_id(1)
                .with_image("C:\\Windows\\System32\\WindowsPowerShell\\v1.0\\powershell.exe")
                .with_command_line("powershell -EncodedCommand aQBlAHgA"),
        );

        let cache = ResultCache::new();
        let config = PipelineConfig::default();
        let scored = run_hourly_scan(&baseline_events, &target_events, &config, &cache, now);

        assert!(!scored.is_empty());
        assert!(
            scored[0].entity.starts_with("mallory | 08-01 10:00"),
            "burst bucket must rank first: {:?}",
            scored
        );
        assert!(scored[0].is_anomaly);

        let snapshot = cache.snapshot();
        assert_eq!(snapshot.updated_at, now);
        assert_eq!(snapshot.scored, scored);
        assert!(snapshot.rows_by_entity.contains_key(&scored[0].entity));
        assert!(!snapshot.baseline_mean.is_empty());

        let records = build_threats(
            &snapshot.scored,
            &snapshot.rows_by_entity,
            &snapshot.baseline_mean,
            now,
        );
        assert!(!records.is_empty());
        assert!(records[0].details.starts_with("ML anomaly score:"));
    }

    /// Re-running over identical inputs publishes identical results.
    #[test]
    fn test_repeated_runs_are_identical() {
        let now = Utc.with_ymd_and_hms(2026, 8, 1, 12, 0, 0).unwrap();
        let baseline: Vec<EventRecord> = (0..12)
            .map(|i| {
                EventRecord::new(
                    &format!("2026-07-31 {:02}:00:00", 8 + (i % 12)),
                    "Security",
                    "Information",
                    &format!("u{}", i),
                )
                .with_event_id(4624)
                .with_source("DC01")
            })
            .collect();
        let target = vec![
            EventRecord::new("2026-08-01 09:00:00", "Security", "Error", "x")
                .with_details("failed repeatedly")
                .with_source("DC01"),
        ];

        let config = PipelineConfig::default();
        let cache_a = ResultCache::new();
        let cache_b = ResultCache::new();
        let a = run_hourly_scan(&baseline, &target, &config, &cache_a, now);
        let b = run_hourly_scan(&baseline, &target, &config, &cache_b, now);
        assert_eq!(a, b);
    }
}
