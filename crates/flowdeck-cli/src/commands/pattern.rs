use std::sync::Arc;

use clap::Subcommand;

use flowdeck_core::{
    pattern, Config, FlowStore, HttpSummarizer, NullSummarizer, PatternAnalyzer, SqliteStore,
    Summarizer, SystemClock,
};

#[derive(Subcommand)]
pub enum PatternAction {
    /// Re-run pattern analysis for an owner
    Analyze {
        #[arg(long, default_value = "local")]
        owner: String,
        /// Window in days
        #[arg(long)]
        window_days: Option<i64>,
    },
    /// Show the stored pattern for an owner
    Show {
        #[arg(long, default_value = "local")]
        owner: String,
    },
}

pub fn run(action: PatternAction) -> Result<(), Box<dyn std::error::Error>> {
    match action {
        PatternAction::Analyze { owner, window_days } => {
            let config = Config::load()?;
            let window = window_days.unwrap_or(config.analysis.window_days);
            let store = Arc::new(SqliteStore::open()?);
            let summarizer: Arc<dyn Summarizer> =
                match std::env::var(&config.summarizer.api_key_env) {
                    Ok(key) => Arc::new(HttpSummarizer::new(
                        &config.summarizer.endpoint,
                        key,
                        config.summarizer.model.clone(),
                    )?),
                    Err(_) => {
                        eprintln!(
                            "warning: {} not set; analysis will store an empty aggregate",
                            config.summarizer.api_key_env
                        );
                        Arc::new(NullSummarizer)
                    }
                };
            let analyzer = PatternAnalyzer::new(store, summarizer, Arc::new(SystemClock));

            // The HTTP summarizer drives its request through the current
            // runtime handle, so one must exist for the duration.
            let rt = tokio::runtime::Runtime::new()?;
            let _guard = rt.enter();
            let outcome = analyzer.analyze(&owner, window)?;
            println!("{}", serde_json::to_string_pretty(&outcome)?);
            if let pattern::AnalysisOutcome::InsufficientData {
                sample_count,
                required,
            } = outcome
            {
                eprintln!("need {required} finalized sessions, have {sample_count}");
            }
        }
        PatternAction::Show { owner } => {
            let store = SqliteStore::open()?;
            match store.pattern(&owner)? {
                Some(pattern) => println!("{}", serde_json::to_string_pretty(&pattern)?),
                None => eprintln!("no pattern stored for {owner}"),
            }
        }
    }
    Ok(())
}
