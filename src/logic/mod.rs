//! Logic Module - Scoring Engines
//!
//! The batch anomaly-scoring pipeline, stage by stage:
//! - `events` - immutable log event records from the ingestion layer
//! - `features` - event records to fixed-layout per-entity vectors
//! - `model` - normalization, the low-rank model, and the scorer
//! - `cache` - atomic snapshot of the last completed run
//! - `threat` - flagged anomalies to dashboard threat records
//! - `pipeline` - one run wired end to end

pub mod cache;
pub mod events;
pub mod features;
pub mod model;
pub mod pipeline;
pub mod threat;
