use chrono::Duration;
use flowdeck_core::{compute_stats, Clock, Config, FlowStore, SqliteStore, SystemClock};

pub fn run(owner: &str, window_days: Option<i64>) -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load()?;
    let window = window_days.unwrap_or(config.analysis.window_days);
    let store = SqliteStore::open()?;
    let cutoff = SystemClock.now() - Duration::days(window.max(1));
    let sessions = store.ended_sessions_since(owner, cutoff)?;
    let stats = compute_stats(&sessions);
    println!("{}", serde_json::to_string_pretty(&stats)?);
    Ok(())
}
