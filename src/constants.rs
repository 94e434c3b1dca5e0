//! Central Configuration Constants
//!
//! Single source of truth for event codes and scoring defaults.
//! To retune the detector, only edit this file.

/// App name
pub const APP_NAME: &str = "Argus";

/// App version
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

// ============================================
// Event categories and codes
// ============================================

/// Category carrying Windows security auditing events.
pub const CATEGORY_SECURITY: &str = "Security";

/// Category carrying Sysmon operational events.
pub const CATEGORY_SYSMON: &str = "Sysmon";

/// Security: an account failed to log on.
pub const EVENT_FAILED_LOGON: u32 = 4625;

/// Sysmon: process creation.
pub const EVENT_PROCESS_CREATE: u32 = 1;

/// Sysmon: network connection.
pub const EVENT_NETWORK_CONNECT: u32 = 3;

/// Sysmon: file created.
pub const EVENT_FILE_CREATE: u32 = 11;

// ============================================
// Scoring defaults
// ============================================

/// Default lookback for the hourly target window (hours).
pub const DEFAULT_LOOKBACK_HOURS: i64 = 24;

/// Default lookback when building the baseline window (hours).
pub const DEFAULT_BASELINE_LOOKBACK_HOURS: i64 = 24 * 7;

/// Minimum baseline rows required before the model is trusted.
pub const MIN_BASELINE_ROWS: usize = 10;

/// Default baseline-score percentile used as the anomaly threshold.
pub const DEFAULT_PERCENTILE: f64 = 0.99;

/// Rank of the low-rank reconstruction model.
pub const DEFAULT_MODEL_RANK: usize = 3;

/// Seed for the model's random projections. Fixed so repeated runs over
/// unchanged baseline data produce identical thresholds.
pub const MODEL_SEED: u64 = 1;

/// Score at or above which a flagged anomaly is tiered High.
pub const HIGH_SEVERITY_SCORE: f32 = 0.8;

/// Per-dimension baseline ranges narrower than this are treated as
/// degenerate during normalization and map to zero.
pub const DEGENERATE_RANGE: f32 = 1e-6;
