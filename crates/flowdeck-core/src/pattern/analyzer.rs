//! Pattern analyzer.
//!
//! Aggregates an owner's finalized sessions by delegating the heavy
//! lifting to the text-generation collaborator, then validates and
//! persists the result. The summarizer is untrusted: a malformed or
//! failed reply degrades to an empty aggregate, never an error.

use std::sync::Arc;

use chrono::Duration;
use serde::Serialize;

use crate::clock::Clock;
use crate::error::Result;
use crate::pattern::model::{
    FlowPattern, LastSessionSnippet, PatternAggregate, AGGREGATE_SCHEMA_VERSION,
};
use crate::session::FlowSession;
use crate::storage::FlowStore;
use crate::summarizer::Summarizer;

/// Default analysis window.
pub const DEFAULT_WINDOW_DAYS: i64 = 30;

/// Minimum finalized sessions before analysis is attempted.
pub const MIN_SESSIONS_FOR_ANALYSIS: usize = 3;

const AGGREGATE_SYSTEM_PROMPT: &str = "You are given a JSON array of completed focus sessions. \
Reply with a single JSON object: {\"schema_version\":1,\"best_times_of_day\":[],\
\"best_days\":[],\"common_triggers\":[{\"tag\":\"\",\"count\":0}],\
\"common_breakers\":[{\"tag\":\"\",\"count\":0}],\"optimal_duration_min\":null,\
\"fingerprint\":{\"peak_time\":\"morning\",\"ideal_session_min\":0,\
\"vulnerability\":\"\",\"superpower\":\"\"}}. No prose.";

/// Outcome of a pattern analysis run.
///
/// Too little data is a defined outcome, not an error.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum AnalysisOutcome {
    Pattern { pattern: FlowPattern },
    InsufficientData { sample_count: usize, required: usize },
}

pub struct PatternAnalyzer {
    store: Arc<dyn FlowStore>,
    summarizer: Arc<dyn Summarizer>,
    clock: Arc<dyn Clock>,
}

impl PatternAnalyzer {
    pub fn new(
        store: Arc<dyn FlowStore>,
        summarizer: Arc<dyn Summarizer>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            store,
            summarizer,
            clock,
        }
    }

    /// Analyze the owner's sessions within the window and upsert the
    /// pattern row (full overwrite).
    pub fn analyze(&self, owner_id: &str, window_days: i64) -> Result<AnalysisOutcome> {
        let now = self.clock.now();
        let cutoff = now - Duration::days(window_days.max(1));
        let sessions = self.store.ended_sessions_since(owner_id, cutoff)?;

        if sessions.len() < MIN_SESSIONS_FOR_ANALYSIS {
            return Ok(AnalysisOutcome::InsufficientData {
                sample_count: sessions.len(),
                required: MIN_SESSIONS_FOR_ANALYSIS,
            });
        }

        let aggregate = self.summarize(&sessions);
        let pattern = FlowPattern {
            owner_id: owner_id.to_string(),
            aggregate,
            last_session: latest_snippet(&sessions),
            sample_count: sessions.len() as u64,
            confidence: FlowPattern::confidence_for(sessions.len() as u64),
            last_updated: now,
        };
        self.store.upsert_pattern(&pattern)?;
        Ok(AnalysisOutcome::Pattern { pattern })
    }

    fn summarize(&self, sessions: &[FlowSession]) -> PatternAggregate {
        let user_prompt = match serde_json::to_string(sessions) {
            Ok(json) => json,
            Err(e) => {
                log::warn!("failed to encode sessions for summarizer: {e}");
                return PatternAggregate::default();
            }
        };
        match self.summarizer.complete(AGGREGATE_SYSTEM_PROMPT, &user_prompt) {
            Ok(reply) => parse_aggregate(&reply),
            Err(e) => {
                log::warn!("summarizer failed, storing empty aggregate: {e}");
                PatternAggregate::default()
            }
        }
    }
}

/// Strict parse of the summarizer reply; anything off-schema degrades to
/// the empty aggregate.
pub fn parse_aggregate(reply: &str) -> PatternAggregate {
    match serde_json::from_str::<PatternAggregate>(reply) {
        Ok(aggregate) if aggregate.schema_version == AGGREGATE_SCHEMA_VERSION => aggregate,
        Ok(aggregate) => {
            log::warn!(
                "aggregate schema version {} unsupported, storing empty aggregate",
                aggregate.schema_version
            );
            PatternAggregate::default()
        }
        Err(e) => {
            log::warn!("malformed aggregate reply, storing empty aggregate: {e}");
            PatternAggregate::default()
        }
    }
}

fn latest_snippet(sessions: &[FlowSession]) -> Option<LastSessionSnippet> {
    sessions
        .iter()
        .filter(|s| s.ended_at.is_some())
        .max_by_key(|s| s.ended_at)
        .map(|s| LastSessionSnippet {
            time_of_day: s.time_of_day,
            quality: s.quality.unwrap_or(0),
            duration_min: s.duration_min.unwrap_or(0),
            at: s.ended_at.expect("filtered on ended_at"),
        })
}
