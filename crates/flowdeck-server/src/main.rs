//! Flowdeck HTTP server.
//!
//! A thin dispatch layer over flowdeck-core: one endpoint, eight
//! actions, error kinds mapped to status codes.

use std::sync::Arc;

use axum::routing::post;
use axum::Router;

use flowdeck_core::{
    Clock, Config, FlowStore, HttpSummarizer, NullSummarizer, PatternAnalyzer, SessionLifecycle,
    SqliteStore, Summarizer, SystemClock,
};

mod api;
mod error;

use api::AppState;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = Config::load()?;
    let store: Arc<SqliteStore> = Arc::new(SqliteStore::open()?);
    let clock: Arc<dyn Clock> = Arc::new(SystemClock);

    let summarizer: Arc<dyn Summarizer> = match std::env::var(&config.summarizer.api_key_env) {
        Ok(key) => Arc::new(HttpSummarizer::new(
            &config.summarizer.endpoint,
            key,
            config.summarizer.model.clone(),
        )?),
        Err(_) => {
            log::warn!(
                "{} not set; pattern analysis will store empty aggregates",
                config.summarizer.api_key_env
            );
            Arc::new(NullSummarizer)
        }
    };

    let shared_store: Arc<dyn FlowStore> = store;
    let state = Arc::new(AppState {
        lifecycle: SessionLifecycle::new(shared_store.clone(), clock.clone()),
        analyzer: PatternAnalyzer::new(shared_store.clone(), summarizer, clock.clone()),
        store: shared_store,
        clock,
        window_days: config.analysis.window_days,
    });

    let app = Router::new()
        .route("/api/flow", post(api::handle_flow))
        .with_state(state);

    let listener = tokio::net::TcpListener::bind(&config.server.bind).await?;
    log::info!("listening on {}", config.server.bind);
    axum::serve(listener, app).await?;
    Ok(())
}
