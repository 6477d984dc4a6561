//! Client-side depth/idle tracking.

mod detect;
mod engine;
mod worker;

pub use detect::{detect_flow_entry, FlowEntryEstimate, FLOW_ENTRY_THRESHOLD};
pub use engine::{
    DepthTracker, TrackerState, DEFAULT_IDLE_TIMEOUT_SECS, DEPTH_CEILING, DEPTH_PER_TICK,
};
pub use worker::TrackerWorker;
