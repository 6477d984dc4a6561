//! Flow pattern data model.
//!
//! One pattern row per owner, overwritten wholesale on each analysis
//! run. The aggregate payload comes back from the summarizer and is
//! validated against a versioned schema at the boundary.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::session::TimeOfDay;

/// Current aggregate schema version. Replies carrying any other version
/// are treated as malformed.
pub const AGGREGATE_SCHEMA_VERSION: u32 = 1;

/// Samples at which confidence reaches 1.0.
const SAMPLES_FOR_FULL_CONFIDENCE: f64 = 20.0;

/// Tag with its observed frequency.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagFrequency {
    pub tag: String,
    pub count: u64,
}

/// Derived per-user summary of ideal flow conditions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlowFingerprint {
    pub peak_time: TimeOfDay,
    pub ideal_session_min: i64,
    pub vulnerability: String,
    pub superpower: String,
}

/// Versioned aggregate produced by the analyzer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PatternAggregate {
    pub schema_version: u32,
    pub best_times_of_day: Vec<TimeOfDay>,
    /// Day names, "sunday".."saturday".
    pub best_days: Vec<String>,
    pub common_triggers: Vec<TagFrequency>,
    pub common_breakers: Vec<TagFrequency>,
    pub optimal_duration_min: Option<i64>,
    pub fingerprint: Option<FlowFingerprint>,
}

impl Default for PatternAggregate {
    fn default() -> Self {
        Self {
            schema_version: AGGREGATE_SCHEMA_VERSION,
            best_times_of_day: Vec::new(),
            best_days: Vec::new(),
            common_triggers: Vec::new(),
            common_breakers: Vec::new(),
            optimal_duration_min: None,
            fingerprint: None,
        }
    }
}

/// Lightweight snippet merged in when a session closes, without a full
/// re-aggregation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LastSessionSnippet {
    pub time_of_day: TimeOfDay,
    pub quality: u8,
    pub duration_min: i64,
    pub at: DateTime<Utc>,
}

/// Per-owner pattern row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlowPattern {
    pub owner_id: String,
    pub aggregate: PatternAggregate,
    pub last_session: Option<LastSessionSnippet>,
    pub sample_count: u64,
    /// 0-1, monotone non-decreasing with sample count.
    pub confidence: f64,
    pub last_updated: DateTime<Utc>,
}

impl FlowPattern {
    /// Confidence for a given sample count: `min(samples / 20, 1)`.
    pub fn confidence_for(sample_count: u64) -> f64 {
        (sample_count as f64 / SAMPLES_FOR_FULL_CONFIDENCE).min(1.0)
    }
}
