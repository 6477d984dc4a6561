//! Local session statistics.
//!
//! Straight aggregation over finalized sessions; no text generation
//! involved. Backs the `get_flow_stats` surface.

use serde::{Deserialize, Serialize};

use crate::session::{FlowSession, TimeOfDay};

/// Per-bucket session statistics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeOfDayStats {
    pub time_of_day: TimeOfDay,
    pub sessions: u64,
    pub avg_quality: f64,
}

/// Aggregate statistics over a window of finalized sessions.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FlowStats {
    pub total_sessions: u64,
    pub total_focus_min: i64,
    pub avg_quality: f64,
    pub avg_duration_min: f64,
    pub interruptions_per_session: f64,
    pub by_time_of_day: Vec<TimeOfDayStats>,
    /// Bucket with the highest average quality; ties go to the bucket
    /// with more sessions.
    pub best_time_of_day: Option<TimeOfDay>,
}

/// Compute stats over finalized sessions. Active sessions are ignored.
pub fn compute_stats(sessions: &[FlowSession]) -> FlowStats {
    let ended: Vec<&FlowSession> = sessions.iter().filter(|s| s.ended_at.is_some()).collect();
    if ended.is_empty() {
        return FlowStats::default();
    }

    let count = ended.len() as u64;
    let total_focus_min: i64 = ended.iter().filter_map(|s| s.duration_min).sum();
    let quality_sum: u64 = ended.iter().filter_map(|s| s.quality.map(u64::from)).sum();
    let interruptions: u64 = ended.iter().map(|s| u64::from(s.interruption_count)).sum();

    let mut by_time_of_day = Vec::with_capacity(4);
    for bucket in TimeOfDay::all() {
        let in_bucket: Vec<&&FlowSession> =
            ended.iter().filter(|s| s.time_of_day == bucket).collect();
        if in_bucket.is_empty() {
            continue;
        }
        let bucket_quality: u64 = in_bucket
            .iter()
            .filter_map(|s| s.quality.map(u64::from))
            .sum();
        by_time_of_day.push(TimeOfDayStats {
            time_of_day: bucket,
            sessions: in_bucket.len() as u64,
            avg_quality: bucket_quality as f64 / in_bucket.len() as f64,
        });
    }

    let best_time_of_day = by_time_of_day
        .iter()
        .max_by(|a, b| {
            a.avg_quality
                .total_cmp(&b.avg_quality)
                .then(a.sessions.cmp(&b.sessions))
        })
        .map(|s| s.time_of_day);

    FlowStats {
        total_sessions: count,
        total_focus_min,
        avg_quality: quality_sum as f64 / count as f64,
        avg_duration_min: total_focus_min as f64 / count as f64,
        interruptions_per_session: interruptions as f64 / count as f64,
        by_time_of_day,
        best_time_of_day,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone, Utc};
    use uuid::Uuid;

    fn ended_session(bucket: TimeOfDay, quality: u8, duration_min: i64, count: u32) -> FlowSession {
        let start = Utc.with_ymd_and_hms(2026, 3, 2, 9, 0, 0).unwrap();
        FlowSession {
            id: Uuid::new_v4(),
            owner_id: "u1".to_string(),
            task_context: String::new(),
            started_at: start,
            ended_at: Some(start + Duration::minutes(duration_min)),
            duration_min: Some(duration_min),
            quality: Some(quality),
            triggers: Vec::new(),
            breakers: Vec::new(),
            interruption_count: count,
            time_of_day: bucket,
            day_of_week: 1,
        }
    }

    #[test]
    fn empty_input_yields_default() {
        let stats = compute_stats(&[]);
        assert_eq!(stats.total_sessions, 0);
        assert!(stats.best_time_of_day.is_none());
    }

    #[test]
    fn aggregates_quality_duration_and_interruptions() {
        let sessions = vec![
            ended_session(TimeOfDay::Morning, 80, 50, 1),
            ended_session(TimeOfDay::Morning, 90, 30, 0),
            ended_session(TimeOfDay::Evening, 40, 10, 2),
        ];
        let stats = compute_stats(&sessions);
        assert_eq!(stats.total_sessions, 3);
        assert_eq!(stats.total_focus_min, 90);
        assert_eq!(stats.avg_quality, 70.0);
        assert_eq!(stats.avg_duration_min, 30.0);
        assert_eq!(stats.interruptions_per_session, 1.0);
        assert_eq!(stats.best_time_of_day, Some(TimeOfDay::Morning));
    }

    #[test]
    fn active_sessions_are_ignored() {
        let mut active = ended_session(TimeOfDay::Morning, 0, 0, 0);
        active.ended_at = None;
        active.quality = None;
        active.duration_min = None;
        let stats = compute_stats(&[active, ended_session(TimeOfDay::Night, 60, 20, 0)]);
        assert_eq!(stats.total_sessions, 1);
        assert_eq!(stats.best_time_of_day, Some(TimeOfDay::Night));
    }

    #[test]
    fn quality_tie_breaks_by_sample_count() {
        let sessions = vec![
            ended_session(TimeOfDay::Morning, 70, 30, 0),
            ended_session(TimeOfDay::Evening, 70, 30, 0),
            ended_session(TimeOfDay::Evening, 70, 30, 0),
        ];
        let stats = compute_stats(&sessions);
        assert_eq!(stats.best_time_of_day, Some(TimeOfDay::Evening));
    }
}
