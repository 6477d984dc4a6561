//! Flow-entry detection.
//!
//! Server-side estimate of the client gauge: depth accrues at the gauge
//! rate from the later of session start or the last interruption.

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, Result};
use crate::tracker::engine::{DEPTH_CEILING, DEPTH_PER_TICK};

/// Depth at which a session counts as "in flow".
pub const FLOW_ENTRY_THRESHOLD: f64 = 70.0;

/// Gauge accrual per uninterrupted minute.
const DEPTH_PER_MINUTE: f64 = DEPTH_PER_TICK * 60.0;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FlowEntryEstimate {
    pub depth: f64,
    pub in_flow: bool,
    pub threshold: f64,
}

/// Estimate whether the user has entered flow.
///
/// `minutes_since_last_interruption` is `None` when the session has had
/// no interruptions; it can never credit more time than the session has
/// been running.
pub fn detect_flow_entry(
    minutes_since_start: f64,
    minutes_since_last_interruption: Option<f64>,
) -> Result<FlowEntryEstimate> {
    if !minutes_since_start.is_finite() || minutes_since_start < 0.0 {
        return Err(CoreError::InvalidArgument {
            field: "minutes_since_start",
            message: format!("must be >= 0, got {minutes_since_start}"),
        });
    }
    if let Some(m) = minutes_since_last_interruption {
        if !m.is_finite() || m < 0.0 {
            return Err(CoreError::InvalidArgument {
                field: "minutes_since_last_interruption",
                message: format!("must be >= 0, got {m}"),
            });
        }
    }

    let uninterrupted = minutes_since_last_interruption
        .map(|m| m.min(minutes_since_start))
        .unwrap_or(minutes_since_start);
    let depth = (uninterrupted * DEPTH_PER_MINUTE).min(DEPTH_CEILING);
    Ok(FlowEntryEstimate {
        depth,
        in_flow: depth >= FLOW_ENTRY_THRESHOLD,
        threshold: FLOW_ENTRY_THRESHOLD,
    })
}
