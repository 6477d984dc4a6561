//! Pattern analysis and session statistics.

mod analyzer;
mod model;
mod stats;

pub use analyzer::{
    parse_aggregate, AnalysisOutcome, PatternAnalyzer, DEFAULT_WINDOW_DAYS,
    MIN_SESSIONS_FOR_ANALYSIS,
};
pub use model::{
    FlowFingerprint, FlowPattern, LastSessionSnippet, PatternAggregate, TagFrequency,
    AGGREGATE_SCHEMA_VERSION,
};
pub use stats::{compute_stats, FlowStats, TimeOfDayStats};
