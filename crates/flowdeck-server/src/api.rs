//! The single flow endpoint.
//!
//! `POST /api/flow` takes `{action, user_id, data}` and dispatches to the
//! core. Success responses are `{success: true, ...result}`; failures map
//! through [`crate::error::ApiError`].

use std::sync::Arc;

use axum::extract::State;
use axum::Json;
use chrono::Duration;
use serde::Deserialize;
use serde_json::{json, Value};
use uuid::Uuid;

use flowdeck_core::{
    compute_stats, cost, recovery_path, tracker, AnalysisOutcome, BreakerEvent, Clock, CoreError,
    FlowStore, PatternAnalyzer, SessionLifecycle,
};

use crate::error::ApiError;

pub struct AppState {
    pub lifecycle: SessionLifecycle,
    pub analyzer: PatternAnalyzer,
    pub store: Arc<dyn FlowStore>,
    pub clock: Arc<dyn Clock>,
    pub window_days: i64,
}

#[derive(Debug, Deserialize)]
pub struct FlowRequest {
    pub action: FlowAction,
    pub user_id: String,
    #[serde(default)]
    pub data: Value,
}

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FlowAction {
    StartFlow,
    EndFlow,
    LogInterruption,
    AnalyzePatterns,
    DetectFlowEntry,
    CalculateInterruptionCost,
    GenerateRecoveryPath,
    GetFlowStats,
}

#[derive(Debug, Default, Deserialize)]
struct StartData {
    #[serde(default)]
    task_context: String,
}

#[derive(Debug, Deserialize)]
struct EndData {
    session_id: Uuid,
    quality: u8,
    #[serde(default)]
    triggers: Vec<String>,
    #[serde(default)]
    breakers: Vec<BreakerEvent>,
}

#[derive(Debug, Deserialize)]
struct InterruptData {
    session_id: Uuid,
    #[serde(rename = "type")]
    kind: String,
    #[serde(default = "unknown_source")]
    source: String,
}

fn unknown_source() -> String {
    "unknown".to_string()
}

#[derive(Debug, Deserialize)]
struct CostData {
    flow_depth: f64,
    hourly_rate: f64,
}

#[derive(Debug, Deserialize)]
struct DetectData {
    minutes_since_start: f64,
    #[serde(default)]
    minutes_since_last_interruption: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct RecoveryData {
    flow_depth: f64,
}

#[derive(Debug, Default, Deserialize)]
struct WindowData {
    #[serde(default)]
    window_days: Option<i64>,
}

pub async fn handle_flow(
    State(state): State<Arc<AppState>>,
    Json(req): Json<FlowRequest>,
) -> Result<Json<Value>, ApiError> {
    let action = req.action;
    let user_id = req.user_id.clone();
    // The core is synchronous (SQLite plus a runtime-handle-driven
    // summarizer), so it runs on the blocking pool.
    let result = tokio::task::spawn_blocking(move || dispatch(&state, req))
        .await
        .map_err(|e| CoreError::Custom(format!("dispatch task failed: {e}")))?;
    match &result {
        Ok(_) => log::info!("{action:?} for {user_id}: ok"),
        Err(e) => log::warn!("{action:?} for {user_id}: {e}"),
    }
    Ok(Json(result?))
}

fn dispatch(state: &AppState, req: FlowRequest) -> Result<Value, CoreError> {
    match req.action {
        FlowAction::StartFlow => {
            let data: StartData = parse_data(req.data)?;
            let outcome = state.lifecycle.start(&req.user_id, &data.task_context)?;
            Ok(json!({
                "success": true,
                "session_id": outcome.session_id,
                "started_at": outcome.started_at,
                "tips": outcome.tips,
            }))
        }
        FlowAction::EndFlow => {
            let data: EndData = parse_data(req.data)?;
            let outcome = state.lifecycle.end(
                data.session_id,
                data.quality,
                data.triggers,
                data.breakers,
            )?;
            Ok(json!({
                "success": true,
                "duration_minutes": outcome.duration_min,
                "quality_score": outcome.quality,
            }))
        }
        FlowAction::LogInterruption => {
            let data: InterruptData = parse_data(req.data)?;
            let breaker = state
                .lifecycle
                .log_interruption(data.session_id, &data.kind, &data.source)?;
            Ok(json!({"success": true, "logged": true, "breaker": breaker}))
        }
        FlowAction::AnalyzePatterns => {
            let data: WindowData = parse_data(req.data)?;
            let window = data.window_days.unwrap_or(state.window_days);
            match state.analyzer.analyze(&req.user_id, window)? {
                AnalysisOutcome::Pattern { pattern } => {
                    Ok(json!({"success": true, "patterns": pattern}))
                }
                AnalysisOutcome::InsufficientData {
                    sample_count,
                    required,
                } => Ok(json!({
                    "success": true,
                    "patterns": null,
                    "message": format!(
                        "need {required} finalized sessions for analysis, have {sample_count}"
                    ),
                })),
            }
        }
        FlowAction::DetectFlowEntry => {
            let data: DetectData = parse_data(req.data)?;
            let estimate = tracker::detect_flow_entry(
                data.minutes_since_start,
                data.minutes_since_last_interruption,
            )?;
            Ok(json!({"success": true, "flow": estimate}))
        }
        FlowAction::CalculateInterruptionCost => {
            let data: CostData = parse_data(req.data)?;
            let estimate = cost::estimate(data.flow_depth, data.hourly_rate)?;
            Ok(json!({"success": true, "cost": estimate}))
        }
        FlowAction::GenerateRecoveryPath => {
            let data: RecoveryData = parse_data(req.data)?;
            let path = recovery_path(data.flow_depth)?;
            Ok(json!({"success": true, "recovery": path}))
        }
        FlowAction::GetFlowStats => {
            let data: WindowData = parse_data(req.data)?;
            let window = data.window_days.unwrap_or(state.window_days).max(1);
            let cutoff = state.clock.now() - Duration::days(window);
            let sessions = state.store.ended_sessions_since(&req.user_id, cutoff)?;
            Ok(json!({"success": true, "stats": compute_stats(&sessions)}))
        }
    }
}

fn parse_data<T: serde::de::DeserializeOwned>(data: Value) -> Result<T, CoreError> {
    // An omitted data field arrives as null; treat it as an empty object
    // so actions without required payloads still dispatch.
    let data = if data.is_null() {
        Value::Object(Default::default())
    } else {
        data
    };
    serde_json::from_value(data).map_err(|e| CoreError::InvalidArgument {
        field: "data",
        message: e.to_string(),
    })
}
