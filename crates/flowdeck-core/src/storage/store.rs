//! Storage collaborator contract.
//!
//! The core issues a narrow set of operations against two logical
//! tables: `flow_sessions` and `flow_patterns` (one row per owner,
//! upsert-keyed). Implementations must be usable from multiple threads.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::error::StorageError;
use crate::pattern::FlowPattern;
use crate::session::FlowSession;

pub trait FlowStore: Send + Sync {
    /// Persist a newly started session.
    fn insert_session(&self, session: &FlowSession) -> Result<(), StorageError>;

    /// Fetch a session by id.
    fn session(&self, id: Uuid) -> Result<Option<FlowSession>, StorageError>;

    /// Write back a mutated session row (interruption append, finalize).
    fn update_session(&self, session: &FlowSession) -> Result<(), StorageError>;

    /// Finalized sessions for an owner with `ended_at >= cutoff`,
    /// oldest first.
    fn ended_sessions_since(
        &self,
        owner_id: &str,
        cutoff: DateTime<Utc>,
    ) -> Result<Vec<FlowSession>, StorageError>;

    /// The owner's pattern row, if any.
    fn pattern(&self, owner_id: &str) -> Result<Option<FlowPattern>, StorageError>;

    /// Create or wholly replace the owner's pattern row.
    fn upsert_pattern(&self, pattern: &FlowPattern) -> Result<(), StorageError>;
}
