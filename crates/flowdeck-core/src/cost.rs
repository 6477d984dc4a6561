//! Interruption-cost estimator.
//!
//! Pure arithmetic, no I/O: given the current flow depth and an hourly
//! rate, monetize the cost of breaking focus right now.

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, Result};

/// Average context-switch recovery time in minutes.
pub const BASE_RECOVERY_MINUTES: f64 = 23.0;

/// Lost time plus ramp-back-up, as a multiple of recovery time.
const PRODUCTIVITY_LOSS_FACTOR: f64 = 2.0;

/// Monetized cost of an interruption at a given flow depth.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct InterruptionCost {
    pub recovery_minutes: i64,
    pub dollar_cost: i64,
    pub productivity_loss_minutes: i64,
}

/// Estimate the cost of interrupting right now.
///
/// `flow_depth` is the 0-100 gauge reading; `hourly_rate` must be a
/// positive finite number. Out-of-range input is rejected, never clamped.
pub fn estimate(flow_depth: f64, hourly_rate: f64) -> Result<InterruptionCost> {
    if !flow_depth.is_finite() || !(0.0..=100.0).contains(&flow_depth) {
        return Err(CoreError::InvalidArgument {
            field: "flow_depth",
            message: format!("must be within 0-100, got {flow_depth}"),
        });
    }
    if !hourly_rate.is_finite() || hourly_rate <= 0.0 {
        return Err(CoreError::InvalidArgument {
            field: "hourly_rate",
            message: format!("must be positive, got {hourly_rate}"),
        });
    }

    let adjusted = BASE_RECOVERY_MINUTES * (flow_depth / 100.0);
    Ok(InterruptionCost {
        recovery_minutes: adjusted.round() as i64,
        dollar_cost: (adjusted / 60.0 * hourly_rate).round() as i64,
        productivity_loss_minutes: (adjusted * PRODUCTIVITY_LOSS_FACTOR).round() as i64,
    })
}
