use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{error, info};

use crate::application::handlers::dispatch_cycle::DispatchCycle;

const TICK_INTERVAL: Duration = Duration::from_secs(2 * 60);
const CYCLE_DEADLINE: Duration = Duration::from_secs(30);

struct LoopState {
    cancel: watch::Sender<bool>,
    _handle: JoinHandle<()>,
}

/// Owns the recurring dispatch loop. `start`/`stop`/`is_running` are safe to
/// call from any number of concurrent request handlers; the lock guards only
/// the lifecycle state and is never held across an await.
pub struct Scheduler {
    cycle: Arc<DispatchCycle>,
    interval: Duration,
    state: Mutex<Option<LoopState>>,
}

impl Scheduler {
    pub fn new(cycle: Arc<DispatchCycle>) -> Arc<Self> {
        Self::with_interval(cycle, TICK_INTERVAL)
    }

    pub fn with_interval(cycle: Arc<DispatchCycle>, interval: Duration) -> Arc<Self> {
        Arc::new(Self {
            cycle,
            interval,
            state: Mutex::new(None),
        })
    }

    /// Launches the loop task and returns true, or returns false with no
    /// side effect when a loop is already running. Every start gets a fresh
    /// cancellation handle; handles are never reused across restarts.
    pub fn start(&self) -> bool {
        let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        if state.is_some() {
            return false;
        }

        let (cancel, mut cancelled) = watch::channel(false);
        let cycle = self.cycle.clone();
        let interval = self.interval;

        let handle = tokio::spawn(async move {
            info!("message scheduler started");
            run_cycle(&cycle).await;

            let mut ticker = tokio::time::interval(interval);
            // The first tick of a tokio interval resolves immediately and
            // that cycle has already run.
            ticker.tick().await;

            loop {
                tokio::select! {
                    _ = ticker.tick() => run_cycle(&cycle).await,
                    _ = cancelled.changed() => {
                        info!("message scheduler stopped");
                        return;
                    }
                }
            }
        });

        *state = Some(LoopState {
            cancel,
            _handle: handle,
        });
        true
    }

    /// Signals the loop to exit at its next tick boundary and returns true,
    /// or returns false when no loop is running. Never waits for an
    /// in-flight cycle.
    pub fn stop(&self) -> bool {
        let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        match state.take() {
            Some(running) => {
                let _ = running.cancel.send(true);
                true
            }
            None => false,
        }
    }

    pub fn is_running(&self) -> bool {
        self.state
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .is_some()
    }
}

/// Runs one dispatch cycle under the overall deadline. Cycle failures are
/// logged and never escape the loop.
async fn run_cycle(cycle: &DispatchCycle) {
    match tokio::time::timeout(CYCLE_DEADLINE, cycle.run()).await {
        Ok(Ok(report)) => {
            if report.fetched > 0 {
                info!(
                    fetched = report.fetched,
                    delivered = report.delivered,
                    skipped = report.skipped,
                    failed = report.failed,
                    "dispatch cycle finished"
                );
            }
        }
        Ok(Err(err)) => error!(error = %err, "dispatch cycle failed"),
        Err(_) => error!("dispatch cycle exceeded deadline, remaining work deferred to next tick"),
    }
}
