//! Feature Layout - Centralized Feature Definition
//!
//! **CRITICAL: This file controls the feature schema**
//!
//! ## Rules (NEVER break these):
//! 1. Add feature → increment FEATURE_VERSION
//! 2. Change order → increment FEATURE_VERSION
//! 3. Remove feature → increment FEATURE_VERSION
//!
//! Two aggregation modes share this schema: the whole-window layout is a
//! prefix-compatible 6-dimension view, the hourly layout the full
//! 12 dimensions. Downstream consumers (snapshots, explanations) validate
//! against the layout hash before trusting stored vectors.

use crc32fast::Hasher;
use serde::{Deserialize, Serialize};

// ============================================================================
// FEATURE VERSION
// ============================================================================

/// Current feature layout version.
/// MUST be incremented when either layout changes.
pub const FEATURE_VERSION: u8 = 1;

// ============================================================================
// FEATURE LAYOUTS (Authoritative source)
// ============================================================================

/// Whole-window per-user layout, in exact vector order.
pub const WINDOW_LAYOUT: &[&str] = &[
    "total_events",     // 0: all events for the user in the window
    "failed_events",    // 1: details text contains "failed"
    "error_events",     // 2: severity Error/Critical or contains Failure
    "warning_events",   // 3: severity Warning
    "unique_processes", // 4: distinct non-empty process identifiers
    "unique_sources",   // 5: distinct non-empty source identifiers
];

/// Per-user-per-hour layout, in exact vector order.
///
/// Indices 1 and 10 both count Security 4625 failed logons. The duplicate
/// is load-bearing for stored vectors and stays until the schema is
/// re-versioned.
pub const HOURLY_LAYOUT: &[&str] = &[
    "total_events",        // 0
    "failed_logons",       // 1: Security 4625
    "error_events",        // 2
    "warning_events",      // 3
    "unique_processes",    // 4
    "unique_sources",      // 5
    "process_creates",     // 6: Sysmon EID 1
    "network_connects",    // 7: Sysmon EID 3
    "lolbin_hits",         // 8: image/command line matches LOLBin table
    "suspicious_cmdlines", // 9: command line matches suspicious-pattern table
    "failed_logons_4625",  // 10: Security 4625 (duplicate of index 1)
    "file_creates",        // 11: Sysmon EID 11
];

/// Human-readable labels, one per hourly dimension. Whole-window vectors
/// reuse the first six.
pub const FEATURE_LABELS: &[&str] = &[
    "Total events",
    "Failed logons",
    "Errors/Failures",
    "Warnings",
    "Unique processes",
    "Unique sources",
    "Sysmon Proc Create (EID 1)",
    "Sysmon Network (EID 3)",
    "LOLBin executions",
    "Suspicious command lines",
    "Security 4625",
    "Sysmon File Create (EID 11)",
];

/// Whole-window vector dimensionality.
pub const WINDOW_FEATURE_COUNT: usize = 6;

/// Hourly vector dimensionality.
pub const HOURLY_FEATURE_COUNT: usize = 12;

// ============================================================================
// LAYOUT HASH
// ============================================================================

/// CRC32 hash over a layout's version and ordered feature names.
/// Used to detect layout mismatches at runtime.
fn compute_layout_hash(layout: &[&str]) -> u32 {
    let mut hasher = Hasher::new();
    hasher.update(&[FEATURE_VERSION]);
    for name in layout {
        hasher.update(name.as_bytes());
        hasher.update(&[0]); // Separator
    }
    hasher.finalize()
}

/// Hash of the whole-window layout.
pub fn window_layout_hash() -> u32 {
    compute_layout_hash(WINDOW_LAYOUT)
}

/// Hash of the hourly layout.
pub fn hourly_layout_hash() -> u32 {
    compute_layout_hash(HOURLY_LAYOUT)
}

// ============================================================================
// LAYOUT INFO
// ============================================================================

/// Complete layout information for serialization/logging.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayoutInfo {
    pub version: u8,
    pub hash: u32,
    pub feature_count: usize,
    pub feature_names: Vec<String>,
}

impl LayoutInfo {
    pub fn current_window() -> Self {
        Self {
            version: FEATURE_VERSION,
            hash: window_layout_hash(),
            feature_count: WINDOW_FEATURE_COUNT,
            feature_names: WINDOW_LAYOUT.iter().map(|s| s.to_string()).collect(),
        }
    }

    pub fn current_hourly() -> Self {
        Self {
            version: FEATURE_VERSION,
            hash: hourly_layout_hash(),
            feature_count: HOURLY_FEATURE_COUNT,
            feature_names: HOURLY_LAYOUT.iter().map(|s| s.to_string()).collect(),
        }
    }
}

// ============================================================================
// LAYOUT VALIDATION
// ============================================================================

/// Error when incoming feature data doesn't match the current layout.
#[derive(Debug, Clone)]
pub struct LayoutMismatchError {
    pub expected_version: u8,
    pub expected_hash: u32,
    pub actual_version: u8,
    pub actual_hash: u32,
}

impl std::fmt::Display for LayoutMismatchError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Feature layout mismatch: expected v{} (hash: {:08x}), got v{} (hash: {:08x})",
            self.expected_version, self.expected_hash, self.actual_version, self.actual_hash
        )
    }
}

impl std::error::Error for LayoutMismatchError {}

/// Validate that incoming hourly data matches the current layout.
pub fn validate_hourly_layout(
    incoming_version: u8,
    incoming_hash: u32,
) -> Result<(), LayoutMismatchError> {
    let current_hash = hourly_layout_hash();

    if incoming_version != FEATURE_VERSION || incoming_hash != current_hash {
        return Err(LayoutMismatchError {
            expected_version: FEATURE_VERSION,
            expected_hash: current_hash,
            actual_version: incoming_version,
            actual_hash: incoming_hash,
        });
    }

    Ok(())
}

// ============================================================================
// FEATURE LOOKUP
// ============================================================================

/// Get feature index by name within a layout (O(n) but features are few).
pub fn feature_index(layout: &[&str], name: &str) -> Option<usize> {
    layout.iter().position(|&n| n == name)
}

/// Get the human-readable label for a dimension index.
pub fn feature_label(index: usize) -> Option<&'static str> {
    FEATURE_LABELS.get(index).copied()
}

// ============================================================================
// TESTS
// ============================================================================
