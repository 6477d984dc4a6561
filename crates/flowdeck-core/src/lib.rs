//! # Flowdeck Core Library
//!
//! This library provides the core business logic for Flowdeck, a flow
//! session tracker. It implements a CLI-first philosophy where all
//! operations are available via a standalone CLI binary, with the HTTP
//! server being a thin dispatch layer over the same core library.
//!
//! ## Architecture
//!
//! - **Session Lifecycle**: start/end/interrupt operations over
//!   persisted flow sessions, serialized per session id
//! - **Depth Tracker**: a wall-clock-based state machine that requires
//!   the caller to periodically invoke `tick()` for gauge updates
//! - **Pattern Analyzer**: windowed aggregation of finalized sessions,
//!   delegated to a text-generation collaborator and validated at the
//!   boundary
//! - **Storage**: SQLite-based session/pattern storage and TOML-based
//!   configuration
//!
//! ## Key Components
//!
//! - [`SessionLifecycle`]: session open/close/interrupt manager
//! - [`DepthTracker`]: flow depth and idle state machine
//! - [`PatternAnalyzer`]: per-owner pattern aggregation
//! - [`SqliteStore`]: session and pattern persistence
//! - [`Clock`]: injected time source for deterministic tests

pub mod clock;
pub mod cost;
pub mod error;
pub mod pattern;
pub mod recovery;
pub mod session;
pub mod storage;
pub mod summarizer;
pub mod tracker;

pub use clock::{Clock, ManualClock, SystemClock};
pub use cost::InterruptionCost;
pub use error::{ConfigError, CoreError, Result, StorageError};
pub use pattern::{
    compute_stats, AnalysisOutcome, FlowFingerprint, FlowPattern, FlowStats, PatternAggregate,
    PatternAnalyzer,
};
pub use recovery::{recovery_path, RecoveryPath, RecoveryStep};
pub use session::{BreakerEvent, EndOutcome, FlowSession, SessionLifecycle, StartOutcome, TimeOfDay};
pub use storage::{Config, FlowStore, SqliteStore};
pub use summarizer::{HttpSummarizer, NullSummarizer, Summarizer};
pub use tracker::{detect_flow_entry, DepthTracker, FlowEntryEstimate, TrackerState, TrackerWorker};
