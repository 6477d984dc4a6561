//! Recovery path generation.
//!
//! After an interruption, produce an ordered re-entry plan whose total
//! minutes equal the adjusted recovery estimate for the depth that was
//! lost. Step minutes use largest-remainder rounding so the plan always
//! sums to the estimate.

use serde::{Deserialize, Serialize};

use crate::cost::BASE_RECOVERY_MINUTES;
use crate::error::{CoreError, Result};

/// Fixed step plan: label and share of the total recovery time.
const STEP_PLAN: [(&str, f64); 3] = [
    ("Write down where you left off and what you were about to do", 0.2),
    ("Re-read your last change or notes to reload context", 0.3),
    ("Resume the primary task with notifications silenced", 0.5),
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecoveryStep {
    pub label: String,
    pub minutes: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecoveryPath {
    pub total_minutes: i64,
    pub steps: Vec<RecoveryStep>,
}

/// Build a recovery path for an interruption at the given flow depth.
///
/// Depth 0 needs no recovery and yields an empty path.
pub fn recovery_path(flow_depth: f64) -> Result<RecoveryPath> {
    if !flow_depth.is_finite() || !(0.0..=100.0).contains(&flow_depth) {
        return Err(CoreError::InvalidArgument {
            field: "flow_depth",
            message: format!("must be within 0-100, got {flow_depth}"),
        });
    }

    let total_minutes = (BASE_RECOVERY_MINUTES * (flow_depth / 100.0)).round() as i64;
    if total_minutes == 0 {
        return Ok(RecoveryPath {
            total_minutes: 0,
            steps: Vec::new(),
        });
    }

    // Floor each share, then hand out the remainder by largest
    // fractional part so the minutes sum exactly to the total.
    let mut raw: Vec<(usize, f64)> = STEP_PLAN
        .iter()
        .enumerate()
        .map(|(i, (_, share))| (i, total_minutes as f64 * share))
        .collect();
    let mut minutes: Vec<i64> = raw.iter().map(|(_, m)| m.floor() as i64).collect();
    let mut remainder = total_minutes - minutes.iter().sum::<i64>();

    raw.sort_by(|a, b| (b.1 - b.1.floor()).total_cmp(&(a.1 - a.1.floor())));
    for (idx, _) in raw {
        if remainder == 0 {
            break;
        }
        minutes[idx] += 1;
        remainder -= 1;
    }

    let steps = STEP_PLAN
        .iter()
        .zip(minutes)
        .filter(|(_, m)| *m > 0)
        .map(|((label, _), m)| RecoveryStep {
            label: (*label).to_string(),
            minutes: m,
        })
        .collect();

    Ok(RecoveryPath {
        total_minutes,
        steps,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_depth_yields_empty_path() {
        let path = recovery_path(0.0).unwrap();
        assert_eq!(path.total_minutes, 0);
        assert!(path.steps.is_empty());
    }

    #[test]
    fn full_depth_sums_to_full_recovery() {
        let path = recovery_path(100.0).unwrap();
        assert_eq!(path.total_minutes, 23);
        assert_eq!(path.steps.iter().map(|s| s.minutes).sum::<i64>(), 23);
        assert_eq!(path.steps.len(), 3);
    }

    #[test]
    fn step_minutes_always_sum_to_total() {
        for depth in [1.0, 9.0, 13.0, 37.5, 60.0, 82.0, 99.0] {
            let path = recovery_path(depth).unwrap();
            assert_eq!(
                path.steps.iter().map(|s| s.minutes).sum::<i64>(),
                path.total_minutes,
                "depth {depth}"
            );
        }
    }

    #[test]
    fn small_totals_drop_zero_minute_steps() {
        // depth 9 -> ~2 minutes total; only the biggest shares survive.
        let path = recovery_path(9.0).unwrap();
        assert_eq!(path.total_minutes, 2);
        assert!(path.steps.iter().all(|s| s.minutes > 0));
    }

    #[test]
    fn out_of_range_depth_rejected() {
        assert!(recovery_path(-0.1).is_err());
        assert!(recovery_path(101.0).is_err());
    }
}
