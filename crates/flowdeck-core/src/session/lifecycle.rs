//! Session lifecycle manager.
//!
//! Opens and closes timed flow sessions, logs interruptions against the
//! active session, and merges a last-session snippet into the owner's
//! stored pattern on close.
//!
//! Operations on the *same* session id are serialized through a
//! per-session mutex so concurrent handlers cannot interleave a breaker
//! append with finalization. Operations on distinct sessions run
//! independently.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::clock::Clock;
use crate::error::{CoreError, Result};
use crate::pattern::LastSessionSnippet;
use crate::session::model::{BreakerEvent, FlowSession};
use crate::session::tips;
use crate::storage::FlowStore;

/// Result of starting a session.
#[derive(Debug, Clone, Serialize)]
pub struct StartOutcome {
    pub session_id: Uuid,
    pub started_at: DateTime<Utc>,
    pub tips: Vec<String>,
}

/// Result of ending a session.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct EndOutcome {
    pub duration_min: i64,
    pub quality: u8,
}

/// Lifecycle manager over a storage collaborator and an injected clock.
pub struct SessionLifecycle {
    store: Arc<dyn FlowStore>,
    clock: Arc<dyn Clock>,
    locks: Mutex<HashMap<Uuid, Arc<Mutex<()>>>>,
}

impl SessionLifecycle {
    pub fn new(store: Arc<dyn FlowStore>, clock: Arc<dyn Clock>) -> Self {
        Self {
            store,
            clock,
            locks: Mutex::new(HashMap::new()),
        }
    }

    fn session_lock(&self, id: Uuid) -> Arc<Mutex<()>> {
        let mut locks = self.locks.lock().expect("session lock table");
        locks.entry(id).or_default().clone()
    }

    /// Start a new session for `owner_id`.
    ///
    /// Always returns a session id; fails only when storage is
    /// unavailable.
    pub fn start(&self, owner_id: &str, task_context: &str) -> Result<StartOutcome> {
        let session = FlowSession::begin(owner_id, task_context, self.clock.now_local());
        self.store.insert_session(&session)?;
        let pattern = self.store.pattern(owner_id)?;
        let tips = tips::tips_for(session.time_of_day, pattern.as_ref());
        log::debug!("session {} started for {owner_id}", session.id);
        Ok(StartOutcome {
            session_id: session.id,
            started_at: session.started_at,
            tips,
        })
    }

    /// Finalize an active session.
    ///
    /// Breakers supplied at close are appended to those logged during the
    /// session. Fails with `NotFound` for unknown ids and `InvalidState`
    /// when the session was already finalized.
    pub fn end(
        &self,
        session_id: Uuid,
        quality: u8,
        triggers: Vec<String>,
        breakers: Vec<BreakerEvent>,
    ) -> Result<EndOutcome> {
        if quality > 100 {
            return Err(CoreError::InvalidArgument {
                field: "quality",
                message: format!("must be within 0-100, got {quality}"),
            });
        }

        let lock = self.session_lock(session_id);
        let _guard = lock.lock().expect("session guard");

        let mut session = self.fetch(session_id)?;
        if !session.is_active() {
            return Err(CoreError::InvalidState(format!(
                "session {session_id} is already finalized"
            )));
        }

        let now = self.clock.now();
        let duration_min = FlowSession::duration_between(session.started_at, now);
        session.ended_at = Some(now);
        session.duration_min = Some(duration_min);
        session.quality = Some(quality);
        session.triggers = triggers;
        session.breakers.extend(breakers);
        session.interruption_count = session.breakers.len() as u32;
        self.store.update_session(&session)?;

        self.merge_last_session(&session, now)?;

        // Finalized sessions take no further operations.
        self.locks
            .lock()
            .expect("session lock table")
            .remove(&session_id);

        log::debug!("session {session_id} ended: {duration_min} min, quality {quality}");
        Ok(EndOutcome {
            duration_min,
            quality,
        })
    }

    /// Append one breaker to an active session.
    pub fn log_interruption(
        &self,
        session_id: Uuid,
        kind: &str,
        source: &str,
    ) -> Result<BreakerEvent> {
        let lock = self.session_lock(session_id);
        let _guard = lock.lock().expect("session guard");

        let mut session = self.fetch(session_id)?;
        if !session.is_active() {
            return Err(CoreError::InvalidState(format!(
                "session {session_id} is not active"
            )));
        }

        let breaker = BreakerEvent {
            kind: kind.to_string(),
            source: source.to_string(),
            at: self.clock.now(),
        };
        session.breakers.push(breaker.clone());
        session.interruption_count += 1;
        self.store.update_session(&session)?;
        Ok(breaker)
    }

    fn fetch(&self, session_id: Uuid) -> Result<FlowSession> {
        self.store
            .session(session_id)?
            .ok_or(CoreError::NotFound {
                resource: "session",
                id: session_id.to_string(),
            })
    }

    /// Lightweight snippet merge into an existing pattern row. Not a
    /// re-aggregation; when the owner has no pattern yet, nothing is
    /// written.
    fn merge_last_session(&self, session: &FlowSession, now: DateTime<Utc>) -> Result<()> {
        if let Some(mut pattern) = self.store.pattern(&session.owner_id)? {
            pattern.last_session = Some(LastSessionSnippet {
                time_of_day: session.time_of_day,
                quality: session.quality.unwrap_or(0),
                duration_min: session.duration_min.unwrap_or(0),
                at: now,
            });
            pattern.last_updated = now;
            self.store.upsert_pattern(&pattern)?;
        }
        Ok(())
    }
}
