//! Depth/idle tracker state machine.
//!
//! Wall-clock driven, no internal threads -- the caller invokes `tick()`
//! once per second and `input()` on user activity. The async worker in
//! [`super::worker`] does the ticking for live use.
//!
//! ## State Transitions
//!
//! ```text
//! Idle <-> ActiveNoSession <-> ActiveInSession
//! ```
//!
//! Input while idle makes the tracker active immediately; the absence of
//! input for the idle timeout makes the next tick park it in `Idle`.
//! Depth and elapsed time accrue only while active in a session.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// Gauge ceiling.
pub const DEPTH_CEILING: f64 = 100.0;

/// Gauge increment per 1-second tick.
pub const DEPTH_PER_TICK: f64 = 0.5;

/// Seconds without input before the tracker parks in `Idle`.
pub const DEFAULT_IDLE_TIMEOUT_SECS: u64 = 120;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrackerState {
    Idle,
    ActiveNoSession,
    ActiveInSession,
}

/// Ephemeral per-client tracker state. Never persisted.
#[derive(Debug, Clone)]
pub struct DepthTracker {
    idle: bool,
    in_session: bool,
    depth: f64,
    elapsed_secs: u64,
    last_input_at: Option<DateTime<Utc>>,
    idle_timeout: Duration,
    depth_per_tick: f64,
}

impl Default for DepthTracker {
    fn default() -> Self {
        Self::new()
    }
}

impl DepthTracker {
    /// Create a tracker with the default idle timeout. Starts idle:
    /// nothing has been observed yet.
    pub fn new() -> Self {
        Self::with_idle_timeout(DEFAULT_IDLE_TIMEOUT_SECS)
    }

    pub fn with_idle_timeout(idle_timeout_secs: u64) -> Self {
        Self {
            idle: true,
            in_session: false,
            depth: 0.0,
            elapsed_secs: 0,
            last_input_at: None,
            idle_timeout: Duration::seconds(idle_timeout_secs as i64),
            depth_per_tick: DEPTH_PER_TICK,
        }
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn state(&self) -> TrackerState {
        if self.idle {
            TrackerState::Idle
        } else if self.in_session {
            TrackerState::ActiveInSession
        } else {
            TrackerState::ActiveNoSession
        }
    }

    pub fn depth(&self) -> f64 {
        self.depth
    }

    pub fn elapsed_secs(&self) -> u64 {
        self.elapsed_secs
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Record a user activity event (pointer, key, scroll, touch).
    /// Leaves `Idle` immediately and restarts the idle timeout.
    pub fn input(&mut self, now: DateTime<Utc>) {
        self.last_input_at = Some(now);
        self.idle = false;
    }

    /// A session began; the gauge starts from zero.
    pub fn session_started(&mut self) {
        self.in_session = true;
        self.depth = 0.0;
        self.elapsed_secs = 0;
    }

    /// The session ended; the gauge resets.
    pub fn session_ended(&mut self) {
        self.in_session = false;
        self.depth = 0.0;
        self.elapsed_secs = 0;
    }

    /// Advance one second of wall-clock time.
    ///
    /// Checks the idle timeout first; while idle nothing accrues.
    pub fn tick(&mut self, now: DateTime<Utc>) -> TrackerState {
        match self.last_input_at {
            Some(last) if now - last >= self.idle_timeout => self.idle = true,
            None => self.idle = true,
            _ => {}
        }
        if !self.idle && self.in_session {
            self.elapsed_secs += 1;
            self.depth = (self.depth + self.depth_per_tick).min(DEPTH_CEILING);
        }
        self.state()
    }
}
