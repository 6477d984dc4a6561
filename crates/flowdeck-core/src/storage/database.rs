//! SQLite-based flow storage.
//!
//! Provides persistent storage for:
//! - Flow sessions (active and finalized)
//! - Per-owner flow patterns (upsert-keyed)
//!
//! List and aggregate fields are stored as JSON text columns;
//! timestamps are RFC3339 strings.

use std::path::PathBuf;
use std::sync::Mutex;

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use uuid::Uuid;

use crate::error::StorageError;
use crate::pattern::{FlowPattern, LastSessionSnippet, PatternAggregate};
use crate::session::{BreakerEvent, FlowSession, TimeOfDay};
use crate::storage::store::FlowStore;

use super::data_dir;

/// SQLite store behind the [`FlowStore`] contract.
///
/// The connection sits behind a mutex so the store can be shared across
/// request handlers.
pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    /// Open the database at `~/.config/flowdeck/flowdeck.db`.
    ///
    /// Creates the database file and schema if they don't exist.
    ///
    /// # Errors
    /// Returns an error if the database cannot be opened or migrated.
    pub fn open() -> Result<Self, StorageError> {
        let dir = data_dir().map_err(|e| StorageError::DataDirUnavailable(e.to_string()))?;
        let path = dir.join("flowdeck.db");
        let conn = Connection::open(&path).map_err(|source| StorageError::OpenFailed {
            path: path.clone(),
            source,
        })?;
        let store = Self {
            conn: Mutex::new(conn),
        };
        store.migrate()?;
        Ok(store)
    }

    /// Open an in-memory database (for tests).
    pub fn open_memory() -> Result<Self, StorageError> {
        let conn = Connection::open_in_memory().map_err(|source| StorageError::OpenFailed {
            path: PathBuf::from(":memory:"),
            source,
        })?;
        let store = Self {
            conn: Mutex::new(conn),
        };
        store.migrate()?;
        Ok(store)
    }

    fn migrate(&self) -> Result<(), StorageError> {
        self.conn
            .lock()
            .expect("db lock")
            .execute_batch(
                "CREATE TABLE IF NOT EXISTS flow_sessions (
                    id                 TEXT PRIMARY KEY,
                    owner_id           TEXT NOT NULL,
                    task_context       TEXT NOT NULL DEFAULT '',
                    started_at         TEXT NOT NULL,
                    ended_at           TEXT,
                    duration_min       INTEGER,
                    quality            INTEGER,
                    triggers           TEXT NOT NULL DEFAULT '[]',
                    breakers           TEXT NOT NULL DEFAULT '[]',
                    interruption_count INTEGER NOT NULL DEFAULT 0,
                    time_of_day        TEXT NOT NULL,
                    day_of_week        INTEGER NOT NULL
                );

                CREATE TABLE IF NOT EXISTS flow_patterns (
                    owner_id     TEXT PRIMARY KEY,
                    aggregate    TEXT NOT NULL,
                    last_session TEXT,
                    sample_count INTEGER NOT NULL,
                    confidence   REAL NOT NULL,
                    last_updated TEXT NOT NULL
                );

                -- Covers the analyzer's window query.
                CREATE INDEX IF NOT EXISTS idx_flow_sessions_owner_ended
                    ON flow_sessions(owner_id, ended_at);",
            )
            .map_err(|e| StorageError::MigrationFailed(e.to_string()))
    }
}

fn encode_json<T: serde::Serialize>(value: &T) -> Result<String, StorageError> {
    serde_json::to_string(value).map_err(|e| StorageError::CorruptRow(e.to_string()))
}

fn decode_json<T: serde::de::DeserializeOwned>(raw: &str) -> Result<T, StorageError> {
    serde_json::from_str(raw).map_err(|e| StorageError::CorruptRow(e.to_string()))
}

fn decode_timestamp(raw: &str) -> Result<DateTime<Utc>, StorageError> {
    DateTime::parse_from_rfc3339(raw)
        .map(|t| t.with_timezone(&Utc))
        .map_err(|e| StorageError::CorruptRow(format!("timestamp '{raw}': {e}")))
}

/// Raw column values before domain decoding.
struct SessionRow {
    id: String,
    owner_id: String,
    task_context: String,
    started_at: String,
    ended_at: Option<String>,
    duration_min: Option<i64>,
    quality: Option<i64>,
    triggers: String,
    breakers: String,
    interruption_count: i64,
    time_of_day: String,
    day_of_week: i64,
}

impl SessionRow {
    fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            owner_id: row.get(1)?,
            task_context: row.get(2)?,
            started_at: row.get(3)?,
            ended_at: row.get(4)?,
            duration_min: row.get(5)?,
            quality: row.get(6)?,
            triggers: row.get(7)?,
            breakers: row.get(8)?,
            interruption_count: row.get(9)?,
            time_of_day: row.get(10)?,
            day_of_week: row.get(11)?,
        })
    }

    fn decode(self) -> Result<FlowSession, StorageError> {
        let triggers: Vec<String> = decode_json(&self.triggers)?;
        let breakers: Vec<BreakerEvent> = decode_json(&self.breakers)?;
        Ok(FlowSession {
            id: Uuid::parse_str(&self.id)
                .map_err(|e| StorageError::CorruptRow(format!("session id: {e}")))?,
            owner_id: self.owner_id,
            task_context: self.task_context,
            started_at: decode_timestamp(&self.started_at)?,
            ended_at: self.ended_at.as_deref().map(decode_timestamp).transpose()?,
            duration_min: self.duration_min,
            quality: self
                .quality
                .map(|q| {
                    u8::try_from(q)
                        .map_err(|_| StorageError::CorruptRow(format!("quality {q} out of range")))
                })
                .transpose()?,
            triggers,
            breakers,
            interruption_count: self.interruption_count as u32,
            time_of_day: TimeOfDay::from_str(&self.time_of_day)
                .ok_or_else(|| StorageError::CorruptRow(format!("bucket '{}'", self.time_of_day)))?,
            day_of_week: self.day_of_week as u8,
        })
    }
}

const SESSION_COLUMNS: &str = "id, owner_id, task_context, started_at, ended_at, duration_min, \
quality, triggers, breakers, interruption_count, time_of_day, day_of_week";

impl FlowStore for SqliteStore {
    fn insert_session(&self, session: &FlowSession) -> Result<(), StorageError> {
        let conn = self.conn.lock().expect("db lock");
        conn.execute(
            "INSERT INTO flow_sessions (id, owner_id, task_context, started_at, ended_at,
                duration_min, quality, triggers, breakers, interruption_count,
                time_of_day, day_of_week)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)",
            params![
                session.id.to_string(),
                session.owner_id,
                session.task_context,
                session.started_at.to_rfc3339(),
                session.ended_at.map(|t| t.to_rfc3339()),
                session.duration_min,
                session.quality.map(i64::from),
                encode_json(&session.triggers)?,
                encode_json(&session.breakers)?,
                i64::from(session.interruption_count),
                session.time_of_day.as_str(),
                i64::from(session.day_of_week),
            ],
        )?;
        Ok(())
    }

    fn session(&self, id: Uuid) -> Result<Option<FlowSession>, StorageError> {
        let conn = self.conn.lock().expect("db lock");
        let row = conn
            .query_row(
                &format!("SELECT {SESSION_COLUMNS} FROM flow_sessions WHERE id = ?1"),
                params![id.to_string()],
                SessionRow::from_row,
            )
            .optional()?;
        row.map(SessionRow::decode).transpose()
    }

    fn update_session(&self, session: &FlowSession) -> Result<(), StorageError> {
        let conn = self.conn.lock().expect("db lock");
        let changed = conn.execute(
            "UPDATE flow_sessions SET ended_at = ?2, duration_min = ?3, quality = ?4,
                triggers = ?5, breakers = ?6, interruption_count = ?7
             WHERE id = ?1",
            params![
                session.id.to_string(),
                session.ended_at.map(|t| t.to_rfc3339()),
                session.duration_min,
                session.quality.map(i64::from),
                encode_json(&session.triggers)?,
                encode_json(&session.breakers)?,
                i64::from(session.interruption_count),
            ],
        )?;
        if changed == 0 {
            return Err(StorageError::QueryFailed(format!(
                "update of missing session {}",
                session.id
            )));
        }
        Ok(())
    }

    fn ended_sessions_since(
        &self,
        owner_id: &str,
        cutoff: DateTime<Utc>,
    ) -> Result<Vec<FlowSession>, StorageError> {
        let conn = self.conn.lock().expect("db lock");
        let mut stmt = conn.prepare(&format!(
            "SELECT {SESSION_COLUMNS} FROM flow_sessions
             WHERE owner_id = ?1 AND ended_at IS NOT NULL AND ended_at >= ?2
             ORDER BY ended_at ASC"
        ))?;
        let rows = stmt.query_map(
            params![owner_id, cutoff.to_rfc3339()],
            SessionRow::from_row,
        )?;
        let mut sessions = Vec::new();
        for row in rows {
            sessions.push(row?.decode()?);
        }
        Ok(sessions)
    }

    fn pattern(&self, owner_id: &str) -> Result<Option<FlowPattern>, StorageError> {
        let conn = self.conn.lock().expect("db lock");
        let row: Option<(String, Option<String>, i64, f64, String)> = conn
            .query_row(
                "SELECT aggregate, last_session, sample_count, confidence, last_updated
                 FROM flow_patterns WHERE owner_id = ?1",
                params![owner_id],
                |row| {
                    Ok((
                        row.get(0)?,
                        row.get(1)?,
                        row.get(2)?,
                        row.get(3)?,
                        row.get(4)?,
                    ))
                },
            )
            .optional()?;

        row.map(|(aggregate, last_session, sample_count, confidence, last_updated)| {
            Ok(FlowPattern {
                owner_id: owner_id.to_string(),
                aggregate: decode_json::<PatternAggregate>(&aggregate)?,
                last_session: last_session
                    .as_deref()
                    .map(decode_json::<LastSessionSnippet>)
                    .transpose()?,
                sample_count: sample_count as u64,
                confidence,
                last_updated: decode_timestamp(&last_updated)?,
            })
        })
        .transpose()
    }

    fn upsert_pattern(&self, pattern: &FlowPattern) -> Result<(), StorageError> {
        let conn = self.conn.lock().expect("db lock");
        conn.execute(
            "INSERT OR REPLACE INTO flow_patterns
                (owner_id, aggregate, last_session, sample_count, confidence, last_updated)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                pattern.owner_id,
                encode_json(&pattern.aggregate)?,
                pattern
                    .last_session
                    .as_ref()
                    .map(encode_json)
                    .transpose()?,
                pattern.sample_count as i64,
                pattern.confidence,
                pattern.last_updated.to_rfc3339(),
            ],
        )?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn sample_session(owner: &str) -> FlowSession {
        let local = chrono::FixedOffset::east_opt(0)
            .unwrap()
            .with_ymd_and_hms(2026, 3, 2, 9, 0, 0)
            .unwrap();
        FlowSession::begin(owner, "deep work", local)
    }

    #[test]
    fn insert_and_fetch_roundtrip() {
        let store = SqliteStore::open_memory().unwrap();
        let session = sample_session("u1");
        store.insert_session(&session).unwrap();

        let fetched = store.session(session.id).unwrap().unwrap();
        assert_eq!(fetched.owner_id, "u1");
        assert_eq!(fetched.task_context, "deep work");
        assert_eq!(fetched.time_of_day, TimeOfDay::Morning);
        assert!(fetched.is_active());
    }

    #[test]
    fn missing_session_is_none() {
        let store = SqliteStore::open_memory().unwrap();
        assert!(store.session(Uuid::new_v4()).unwrap().is_none());
    }

    #[test]
    fn update_persists_breakers_and_finalization() {
        let store = SqliteStore::open_memory().unwrap();
        let mut session = sample_session("u1");
        store.insert_session(&session).unwrap();

        session.breakers.push(BreakerEvent {
            kind: "slack".to_string(),
            source: "dm".to_string(),
            at: session.started_at + Duration::minutes(5),
        });
        session.interruption_count = 1;
        session.ended_at = Some(session.started_at + Duration::minutes(25));
        session.duration_min = Some(25);
        session.quality = Some(80);
        store.update_session(&session).unwrap();

        let fetched = store.session(session.id).unwrap().unwrap();
        assert!(!fetched.is_active());
        assert_eq!(fetched.duration_min, Some(25));
        assert_eq!(fetched.quality, Some(80));
        assert_eq!(fetched.breakers.len(), 1);
        assert_eq!(fetched.breakers[0].kind, "slack");
    }

    #[test]
    fn update_of_missing_session_fails() {
        let store = SqliteStore::open_memory().unwrap();
        let session = sample_session("u1");
        assert!(store.update_session(&session).is_err());
    }

    #[test]
    fn window_query_filters_active_other_owner_and_old() {
        let store = SqliteStore::open_memory().unwrap();
        let base = Utc.with_ymd_and_hms(2026, 3, 2, 9, 0, 0).unwrap();

        let mut in_window = sample_session("u1");
        in_window.ended_at = Some(base);
        in_window.duration_min = Some(25);
        store.insert_session(&in_window).unwrap();

        let mut old = sample_session("u1");
        old.ended_at = Some(base - Duration::days(40));
        store.insert_session(&old).unwrap();

        let active = sample_session("u1");
        store.insert_session(&active).unwrap();

        let mut other_owner = sample_session("u2");
        other_owner.ended_at = Some(base);
        store.insert_session(&other_owner).unwrap();

        let sessions = store
            .ended_sessions_since("u1", base - Duration::days(30))
            .unwrap();
        assert_eq!(sessions.len(), 1);
        assert_eq!(sessions[0].id, in_window.id);
    }

    #[test]
    fn pattern_upsert_overwrites_wholesale() {
        let store = SqliteStore::open_memory().unwrap();
        let now = Utc.with_ymd_and_hms(2026, 3, 2, 9, 0, 0).unwrap();

        let mut pattern = FlowPattern {
            owner_id: "u1".to_string(),
            aggregate: PatternAggregate::default(),
            last_session: None,
            sample_count: 3,
            confidence: 0.15,
            last_updated: now,
        };
        store.upsert_pattern(&pattern).unwrap();

        pattern.sample_count = 10;
        pattern.confidence = 0.5;
        store.upsert_pattern(&pattern).unwrap();

        let fetched = store.pattern("u1").unwrap().unwrap();
        assert_eq!(fetched.sample_count, 10);
        assert_eq!(fetched.confidence, 0.5);
        assert!(store.pattern("u2").unwrap().is_none());
    }
}
