//! Flow session model and lifecycle.

mod lifecycle;
mod model;
mod tips;

pub use lifecycle::{EndOutcome, SessionLifecycle, StartOutcome};
pub use model::{BreakerEvent, FlowSession, TimeOfDay};
pub use tips::{tips_for, FOCUS_TIPS};
