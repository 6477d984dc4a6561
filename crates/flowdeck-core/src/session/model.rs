//! Flow session data model.
//!
//! A session is a bounded period the user marks as deep-focus work.
//! Duration and the time-of-day bucket are derived fields; the bucket is
//! computed from the user's local wall clock at start.

use chrono::{DateTime, Datelike, FixedOffset, Timelike, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Time-of-day bucket derived from the local start hour.
///
/// Boundaries: `[0,6)` night, `[6,12)` morning, `[12,18)` afternoon,
/// `[18,24)` evening.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimeOfDay {
    Night,
    Morning,
    Afternoon,
    Evening,
}

impl TimeOfDay {
    pub fn from_hour(hour: u32) -> Self {
        match hour {
            0..=5 => TimeOfDay::Night,
            6..=11 => TimeOfDay::Morning,
            12..=17 => TimeOfDay::Afternoon,
            _ => TimeOfDay::Evening,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TimeOfDay::Night => "night",
            TimeOfDay::Morning => "morning",
            TimeOfDay::Afternoon => "afternoon",
            TimeOfDay::Evening => "evening",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "night" => Some(TimeOfDay::Night),
            "morning" => Some(TimeOfDay::Morning),
            "afternoon" => Some(TimeOfDay::Afternoon),
            "evening" => Some(TimeOfDay::Evening),
            _ => None,
        }
    }

    /// All buckets in chronological order.
    pub fn all() -> [TimeOfDay; 4] {
        [
            TimeOfDay::Night,
            TimeOfDay::Morning,
            TimeOfDay::Afternoon,
            TimeOfDay::Evening,
        ]
    }
}

/// A logged interruption event during a session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BreakerEvent {
    /// Interruption kind tag (e.g. "slack", "meeting", "self").
    #[serde(rename = "type")]
    pub kind: String,
    /// Where the interruption came from.
    pub source: String,
    /// When it happened.
    pub at: DateTime<Utc>,
}

/// A single flow session row.
///
/// Active iff `ended_at` is `None`. Mutable only through interruption
/// logging while active; immutable after finalization.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FlowSession {
    pub id: Uuid,
    pub owner_id: String,
    /// Free-text task description supplied at start (may be empty).
    pub task_context: String,
    pub started_at: DateTime<Utc>,
    pub ended_at: Option<DateTime<Utc>>,
    /// Whole minutes, recomputed at close; never independently mutated.
    pub duration_min: Option<i64>,
    /// Operator-supplied quality score (0-100), set once at close.
    pub quality: Option<u8>,
    /// Tags describing what enabled focus.
    pub triggers: Vec<String>,
    pub breakers: Vec<BreakerEvent>,
    pub interruption_count: u32,
    pub time_of_day: TimeOfDay,
    /// Day of week, 0 = Sunday.
    pub day_of_week: u8,
}

impl FlowSession {
    /// Create a new active session stamped from the local wall clock.
    pub fn begin(owner_id: &str, task_context: &str, local_now: DateTime<FixedOffset>) -> Self {
        Self {
            id: Uuid::new_v4(),
            owner_id: owner_id.to_string(),
            task_context: task_context.to_string(),
            started_at: local_now.with_timezone(&Utc),
            ended_at: None,
            duration_min: None,
            quality: None,
            triggers: Vec::new(),
            breakers: Vec::new(),
            interruption_count: 0,
            time_of_day: TimeOfDay::from_hour(local_now.hour()),
            day_of_week: local_now.weekday().num_days_from_sunday() as u8,
        }
    }

    pub fn is_active(&self) -> bool {
        self.ended_at.is_none()
    }

    /// Whole-minute duration between two instants, clamped to >= 0.
    pub fn duration_between(start: DateTime<Utc>, end: DateTime<Utc>) -> i64 {
        let minutes = (end - start).num_milliseconds() as f64 / 60_000.0;
        (minutes.round() as i64).max(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn local(hour: u32) -> DateTime<FixedOffset> {
        FixedOffset::east_opt(0)
            .unwrap()
            .with_ymd_and_hms(2026, 3, 2, hour, 0, 0)
            .unwrap()
    }

    #[test]
    fn bucket_boundaries() {
        assert_eq!(TimeOfDay::from_hour(0), TimeOfDay::Night);
        assert_eq!(TimeOfDay::from_hour(5), TimeOfDay::Night);
        assert_eq!(TimeOfDay::from_hour(6), TimeOfDay::Morning);
        assert_eq!(TimeOfDay::from_hour(7), TimeOfDay::Morning);
        assert_eq!(TimeOfDay::from_hour(11), TimeOfDay::Morning);
        assert_eq!(TimeOfDay::from_hour(12), TimeOfDay::Afternoon);
        assert_eq!(TimeOfDay::from_hour(17), TimeOfDay::Afternoon);
        assert_eq!(TimeOfDay::from_hour(18), TimeOfDay::Evening);
        assert_eq!(TimeOfDay::from_hour(19), TimeOfDay::Evening);
        assert_eq!(TimeOfDay::from_hour(23), TimeOfDay::Evening);
    }

    #[test]
    fn bucket_string_roundtrip() {
        for bucket in TimeOfDay::all() {
            assert_eq!(TimeOfDay::from_str(bucket.as_str()), Some(bucket));
        }
        assert_eq!(TimeOfDay::from_str("noon"), None);
    }

    #[test]
    fn begin_derives_bucket_and_day() {
        // 2026-03-02 is a Monday.
        let session = FlowSession::begin("u1", "write report", local(9));
        assert!(session.is_active());
        assert_eq!(session.time_of_day, TimeOfDay::Morning);
        assert_eq!(session.day_of_week, 1);
        assert_eq!(session.interruption_count, 0);
    }

    #[test]
    fn duration_rounds_to_whole_minutes() {
        let start = Utc.with_ymd_and_hms(2026, 3, 2, 9, 0, 0).unwrap();
        assert_eq!(
            FlowSession::duration_between(start, start + Duration::milliseconds(1_500_000)),
            25
        );
        assert_eq!(
            FlowSession::duration_between(start, start + Duration::seconds(89)),
            1
        );
        assert_eq!(
            FlowSession::duration_between(start, start + Duration::seconds(91)),
            2
        );
    }

    #[test]
    fn duration_clamps_negative_to_zero() {
        let start = Utc.with_ymd_and_hms(2026, 3, 2, 9, 0, 0).unwrap();
        assert_eq!(
            FlowSession::duration_between(start, start - Duration::minutes(5)),
            0
        );
    }
}
