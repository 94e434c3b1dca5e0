//! Features Module - Event-to-Vector Extraction
//!
//! Turns ordered event records into fixed-layout per-entity vectors.
//! The layout module is the single source of truth for dimension order;
//! the indicator table drives the hostile-tooling dimensions.

pub mod builder;
pub mod indicators;
pub mod layout;
pub mod row;


// Re-export common types
pub use builder::{build_hourly_features, build_per_user_features, build_per_user_hourly_features};
pub use indicators::{IndicatorTable, DEFAULT_INDICATORS};
pub use layout::{LayoutInfo, HOURLY_FEATURE_COUNT, WINDOW_FEATURE_COUNT};
pub use row::FeatureRow;
