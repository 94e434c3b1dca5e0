//! Log Event Records
//!
//! Immutable event records handed over by the ingestion layer.
//! One record per observed log event; fields follow the collector's
//! column shapes, with Sysmon extended attributes where available.

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

// ============================================================================
// EVENT RECORD
// ============================================================================

/// One observed log event.
///
/// Produced by the ingestion collector and never modified afterwards.
/// String fields default to empty rather than `Option` so that rows read
/// from sparse log channels stay uniform.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EventRecord {
    /// Event timestamp as recorded by the collector (parseable string).
    pub time: String,
    /// Log channel category: Security / System / Application / Sysmon.
    pub category: String,
    /// Severity label as reported by the channel.
    pub severity: String,
    /// Acting user identity; empty when the channel carries none.
    pub user: String,
    /// Provider or process identifier (not always a real process).
    pub process: String,
    /// Free-text details / rendered message.
    pub details: String,
    /// Source identifier (host, channel, or sensor).
    pub source: String,
    /// Numeric event-type code.
    pub event_id: u32,

    // Sysmon extended attributes (empty when not applicable)
    /// Sysmon: executable image path.
    pub image: String,
    /// Sysmon: full command line.
    pub command_line: String,
    /// Sysmon: parent image path.
    pub parent_image: String,
    /// Sysmon: destination address.
    pub destination_ip: String,
    /// Sysmon: destination port.
    pub destination_port: String,
}

impl EventRecord {
    /// Create a record with the always-present columns.
    pub fn new(time: &str, category: &str, severity: &str, user: &str) -> Self {
        Self {
            time: time.to_string(),
            category: category.to_string(),
            severity: severity.to_string(),
            user: user.to_string(),
            ..Default::default()
        }
    }

    // Builder pattern methods
    pub fn with_event_id(mut self, event_id: u32) -> Self {
        self.event_id = event_id;
        self
    }

    pub fn with_process(mut self, process: &str) -> Self {
        self.process = process.to_string();
        self
    }

    pub fn with_details(mut self, details: &str) -> Self {
        self.details = details.to_string();
        self
    }

    pub fn with_source(mut self, source: &str) -> Self {
        self.source = source.to_string();
        self
    }

    pub fn with_image(mut self, image: &str) -> Self {
        self.image = image.to_string();
        self
    }

    pub fn with_command_line(mut self, command_line: &str) -> Self {
        self.command_line = command_line.to_string();
        self
    }

    pub fn with_destination(mut self, ip: &str, port: &str) -> Self {
        self.destination_ip = ip.to_string();
        self.destination_port = port.to_string();
        self
    }

    /// Parse the record's timestamp, accepting RFC 3339 plus the common
    /// naive shapes collectors emit. Naive timestamps are read as UTC.
    /// Returns `None` when nothing matches; callers drop such events.
    pub fn parsed_time(&self) -> Option<DateTime<Utc>> {
        parse_event_time(&self.time)
    }

    /// True when the record carries no identifiable user.
    pub fn has_unknown_user(&self) -> bool {
        self.user.trim().is_empty()
    }
}

/// Permissive timestamp parsing for collector output.
pub fn parse_event_time(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Some(ts.with_timezone(&Utc));
    }

    const NAIVE_FORMATS: [&str; 3] = [
        "%Y-%m-%d %H:%M:%S%.f",
        "%Y-%m-%dT%H:%M:%S%.f",
        "%m/%d/%Y %H:%M:%S",
    ];
    for fmt in NAIVE_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, fmt) {
            return Some(naive.and_utc());
        }
    }

    None
}

// ============================================================================
// TESTS
// ============================================================================
