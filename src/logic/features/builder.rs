//! Feature Builder - event records to per-entity vectors
//!
//! Two aggregation modes over an ordered sequence of event records:
//!
//! - **Whole-window**: one 6-dimension row per user across the entire
//!   input; events without an identifiable user are dropped.
//! - **Hourly**: one 12-dimension row per (user, hour bucket) inside a
//!   lookback window; events without a user land in an "Unknown" group
//!   so off-hours machine activity still gets scored.
//!
//! Empty input yields an empty row set in both modes; nothing here errors.

use std::collections::{BTreeMap, HashSet};

use chrono::{DateTime, Duration, Timelike, Utc};

use crate::constants::{
    CATEGORY_SECURITY, CATEGORY_SYSMON, DEFAULT_LOOKBACK_HOURS, EVENT_FAILED_LOGON,
    EVENT_FILE_CREATE, EVENT_NETWORK_CONNECT, EVENT_PROCESS_CREATE,
};
use crate::logic::events::EventRecord;
use crate::logic::features::indicators::{IndicatorTable, DEFAULT_INDICATORS};
use crate::logic::features::row::FeatureRow;

/// Group label for events that carry no user identity.
const UNKNOWN_USER: &str = "Unknown";

// ============================================================================
// WHOLE-WINDOW MODE
// ============================================================================

/// Build one 6-dimension row per user over the whole input window.
pub fn build_per_user_features(events: &[EventRecord]) -> Vec<FeatureRow> {
    let mut grouped: BTreeMap<&str, Vec<&EventRecord>> = BTreeMap::new();
    for event in events {
        if event.has_unknown_user() {
            continue;
        }
        grouped.entry(event.user.as_str()).or_default().push(event);
    }

    grouped
        .into_iter()
        .map(|(user, group)| {
            let total = group.len();
            let failed = group
                .iter()
                .filter(|e| e.details.to_lowercase().contains("failed"))
                .count();
            let errors = group.iter().filter(|e| is_error_severity(e)).count();
            let warnings = group.iter().filter(|e| is_warning_severity(e)).count();
            let unique_proc = distinct_non_empty(group.iter().map(|e| e.process.as_str()));
            let unique_src = distinct_non_empty(group.iter().map(|e| e.source.as_str()));

            FeatureRow::new(
                user,
                vec![
                    total as f32,
                    failed as f32,
                    errors as f32,
                    warnings as f32,
                    unique_proc as f32,
                    unique_src as f32,
                ],
            )
        })
        .collect()
}

// ============================================================================
// HOURLY MODE
// ============================================================================

/// Build one 12-dimension row per (user, hour bucket) inside the lookback
/// window ending at `now`. Events with unparseable timestamps, or older
/// than `now - lookback_hours`, are discarded.
pub fn build_per_user_hourly_features(
    events: &[EventRecord],
    lookback_hours: i64,
    now: DateTime<Utc>,
    indicators: &IndicatorTable,
) -> Vec<FeatureRow> {
    let cutoff = now - Duration::hours(lookback_hours);

    let mut grouped: BTreeMap<(String, DateTime<Utc>), Vec<&EventRecord>> = BTreeMap::new();
    for event in events {
        let Some(ts) = event.parsed_time() else {
            continue;
        };
        if ts < cutoff {
            continue;
        }

        let user = if event.has_unknown_user() {
            UNKNOWN_USER.to_string()
        } else {
            event.user.clone()
        };
        grouped
            .entry((user, hour_bucket(ts)))
            .or_default()
            .push(event);
    }

    grouped
        .into_iter()
        .map(|((user, bucket), group)| {
            let entity = format!("{} | {}:00", user, bucket.format("%m-%d %H"));

            let total = group.len();
            let failed = count_code(&group, CATEGORY_SECURITY, EVENT_FAILED_LOGON);
            let errors = group.iter().filter(|e| is_error_severity(e)).count();
            let warnings = group.iter().filter(|e| is_warning_severity(e)).count();
            let unique_proc = distinct_non_empty(group.iter().map(|e| e.process.as_str()));
            let unique_src = distinct_non_empty(group.iter().map(|e| e.source.as_str()));

            let proc_creates = count_code(&group, CATEGORY_SYSMON, EVENT_PROCESS_CREATE);
            let net_connects = count_code(&group, CATEGORY_SYSMON, EVENT_NETWORK_CONNECT);
            let file_creates = count_code(&group, CATEGORY_SYSMON, EVENT_FILE_CREATE);

            let lolbin = group
                .iter()
                .filter(|e| indicators.matches_lolbin(&lolbin_haystack(e)))
                .count();
            let suspicious = group
                .iter()
                .filter(|e| indicators.matches_suspicious(command_text(e)))
                .count();

            FeatureRow::new(
                &entity,
                vec![
                    total as f32,
                    failed as f32,
                    errors as f32,
                    warnings as f32,
                    unique_proc as f32,
                    unique_src as f32,
                    proc_creates as f32,
                    net_connects as f32,
                    lolbin as f32,
                    suspicious as f32,
                    failed as f32,
                    file_creates as f32,
                ],
            )
        })
        .collect()
}

/// Hourly mode with the shipped indicator table, a 24-hour lookback, and
/// the current wall clock.
pub fn build_hourly_features(events: &[EventRecord]) -> Vec<FeatureRow> {
    build_per_user_hourly_features(events, DEFAULT_LOOKBACK_HOURS, Utc::now(), &DEFAULT_INDICATORS)
}

// ============================================================================
// HELPERS
// ============================================================================

fn is_error_severity(event: &EventRecord) -> bool {
    let severity = event.severity.as_str();
    severity.eq_ignore_ascii_case("Error")
        || severity.eq_ignore_ascii_case("Critical")
        || severity.to_lowercase().contains("failure")
}

fn is_warning_severity(event: &EventRecord) -> bool {
    event.severity.eq_ignore_ascii_case("Warning")
}

fn distinct_non_empty<'a>(values: impl Iterator<Item = &'a str>) -> usize {
    values
        .filter(|v| !v.trim().is_empty())
        .collect::<HashSet<_>>()
        .len()
}

fn count_code(group: &[&EventRecord], category: &str, event_id: u32) -> usize {
    group
        .iter()
        .filter(|e| e.category.eq_ignore_ascii_case(category) && e.event_id == event_id)
        .count()
}

/// Image path falls back to the provider/process column; command line
/// falls back to details. Sparse channels fill whichever they have.
fn lolbin_haystack(event: &EventRecord) -> String {
    let image = if event.image.is_empty() {
        event.process.as_str()
    } else {
        event.image.as_str()
    };
    format!("{} {}", image, command_text(event))
}

fn command_text(event: &EventRecord) -> &str {
    if event.command_line.is_empty() {
        event.details.as_str()
    } else {
        event.command_line.as_str()
    }
}

/// Truncate a timestamp to the start of its hour.
fn hour_bucket(ts: DateTime<Utc>) -> DateTime<Utc> {
    ts.with_minute(0)
        .and_then(|t| t.with_second(0))
        .and_then(|t| t.with_nanosecond(0))
        .unwrap_or(ts)
}
