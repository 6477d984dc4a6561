//! Focus tips returned when a session starts.

use crate::pattern::FlowPattern;
use crate::session::model::TimeOfDay;

/// Generic focus tips, always returned in this order.
pub const FOCUS_TIPS: [&str; 4] = [
    "Silence notifications before you start",
    "Write down the one outcome this session is for",
    "Keep water within reach so you don't break focus for it",
    "Close every tab that isn't the task",
];

/// Build the tip list for a starting session.
///
/// When the owner's stored pattern names the current bucket as one of
/// their best times, an affirming tip is appended.
pub fn tips_for(bucket: TimeOfDay, pattern: Option<&FlowPattern>) -> Vec<String> {
    let mut tips: Vec<String> = FOCUS_TIPS.iter().map(|t| (*t).to_string()).collect();
    if let Some(pattern) = pattern {
        if pattern.aggregate.best_times_of_day.contains(&bucket) {
            tips.push(format!(
                "{} is one of your best focus windows -- good timing",
                bucket.as_str()
            ));
        }
    }
    tips
}
