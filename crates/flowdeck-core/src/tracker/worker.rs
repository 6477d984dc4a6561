//! Async driver for the depth tracker.
//!
//! Spawns a tokio task that ticks a shared [`DepthTracker`] once per
//! second. The task stops on `shutdown()` and is aborted if the handle
//! is dropped first -- the tick timer never outlives its owner.

use std::sync::{Arc, Mutex};

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{interval, Duration, MissedTickBehavior};

use crate::clock::Clock;
use crate::tracker::engine::DepthTracker;

pub struct TrackerWorker {
    tracker: Arc<Mutex<DepthTracker>>,
    shutdown: watch::Sender<bool>,
    handle: JoinHandle<()>,
}

impl TrackerWorker {
    /// Spawn the 1-second tick loop on the current runtime.
    pub fn spawn(tracker: Arc<Mutex<DepthTracker>>, clock: Arc<dyn Clock>) -> Self {
        let (shutdown, mut stop) = watch::channel(false);
        let shared = tracker.clone();
        let handle = tokio::spawn(async move {
            let mut ticker = interval(Duration::from_secs(1));
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        shared.lock().expect("tracker lock").tick(clock.now());
                    }
                    changed = stop.changed() => {
                        if changed.is_err() || *stop.borrow() {
                            break;
                        }
                    }
                }
            }
        });
        Self {
            tracker,
            shutdown,
            handle,
        }
    }

    pub fn tracker(&self) -> Arc<Mutex<DepthTracker>> {
        self.tracker.clone()
    }

    /// Stop the tick loop and wait for the task to finish.
    pub async fn shutdown(mut self) {
        let _ = self.shutdown.send(true);
        let _ = (&mut self.handle).await;
    }
}

impl Drop for TrackerWorker {
    fn drop(&mut self) {
        self.handle.abort();
    }
}
