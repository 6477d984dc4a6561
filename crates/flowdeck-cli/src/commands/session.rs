use std::sync::{Arc, Mutex};

use clap::Subcommand;
use tokio::io::AsyncBufReadExt;
use uuid::Uuid;

use flowdeck_core::{
    Clock, DepthTracker, FlowStore, SessionLifecycle, SqliteStore, SystemClock, TrackerWorker,
};

#[derive(Subcommand)]
pub enum SessionAction {
    /// Start a flow session
    Start {
        /// Owner id to record the session under
        #[arg(long, default_value = "local")]
        owner: String,
        /// What you are working on
        #[arg(default_value = "")]
        task: String,
    },
    /// End an active session
    End {
        id: Uuid,
        /// Quality score for the session (0-100)
        #[arg(long)]
        quality: u8,
        /// Trigger tag, repeatable
        #[arg(long = "trigger")]
        triggers: Vec<String>,
    },
    /// Log an interruption against an active session
    Interrupt {
        id: Uuid,
        /// Interruption kind (e.g. slack, meeting, self)
        #[arg(long, default_value = "other")]
        kind: String,
        /// Where it came from
        #[arg(long, default_value = "unknown")]
        source: String,
    },
    /// Show a session as JSON
    Show { id: Uuid },
    /// Live depth gauge; stdin lines count as activity, Ctrl-D exits
    Watch {
        #[arg(long, default_value_t = 120)]
        idle_timeout_secs: u64,
    },
}

pub fn run(action: SessionAction) -> Result<(), Box<dyn std::error::Error>> {
    match action {
        SessionAction::Start { owner, task } => {
            let lifecycle = open_lifecycle()?;
            let outcome = lifecycle.start(&owner, &task)?;
            println!("{}", serde_json::to_string_pretty(&outcome)?);
        }
        SessionAction::End {
            id,
            quality,
            triggers,
        } => {
            let lifecycle = open_lifecycle()?;
            let outcome = lifecycle.end(id, quality, triggers, vec![])?;
            println!("{}", serde_json::to_string_pretty(&outcome)?);
        }
        SessionAction::Interrupt { id, kind, source } => {
            let lifecycle = open_lifecycle()?;
            let breaker = lifecycle.log_interruption(id, &kind, &source)?;
            println!("{}", serde_json::to_string_pretty(&breaker)?);
        }
        SessionAction::Show { id } => {
            let store = SqliteStore::open()?;
            match store.session(id)? {
                Some(session) => println!("{}", serde_json::to_string_pretty(&session)?),
                None => {
                    eprintln!("no session {id}");
                    std::process::exit(1);
                }
            }
        }
        SessionAction::Watch { idle_timeout_secs } => watch(idle_timeout_secs)?,
    }
    Ok(())
}

fn open_lifecycle() -> Result<SessionLifecycle, Box<dyn std::error::Error>> {
    let store = Arc::new(SqliteStore::open()?);
    Ok(SessionLifecycle::new(store, Arc::new(SystemClock)))
}

fn watch(idle_timeout_secs: u64) -> Result<(), Box<dyn std::error::Error>> {
    let rt = tokio::runtime::Runtime::new()?;
    rt.block_on(async move {
        let clock: Arc<dyn Clock> = Arc::new(SystemClock);
        let tracker = {
            let mut t = DepthTracker::with_idle_timeout(idle_timeout_secs);
            t.input(clock.now());
            t.session_started();
            Arc::new(Mutex::new(t))
        };
        let worker = TrackerWorker::spawn(tracker.clone(), clock.clone());

        let mut lines = tokio::io::BufReader::new(tokio::io::stdin()).lines();
        let mut report = tokio::time::interval(std::time::Duration::from_secs(5));
        loop {
            tokio::select! {
                line = lines.next_line() => {
                    match line? {
                        Some(_) => tracker.lock().expect("tracker lock").input(clock.now()),
                        None => break,
                    }
                }
                _ = report.tick() => {
                    let t = tracker.lock().expect("tracker lock");
                    println!(
                        "state={:?} depth={:.1} elapsed={}s",
                        t.state(),
                        t.depth(),
                        t.elapsed_secs()
                    );
                }
            }
        }
        worker.shutdown().await;
        Ok(())
    })
}
