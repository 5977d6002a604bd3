//! Recurring evaluation. One cycle in flight at a time, each on a blocking
//! thread with a deadline; a cycle that misses its deadline is cancelled and
//! its partial state thrown away. Ticks that come due before its thread
//! returns are skipped.

use super::driver::{CycleOutcome, DriftMonitor};
use crate::error::MonitorError;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;
use tokio::sync::watch;
use tokio::time::MissedTickBehavior;
use tracing::{info, warn};

pub struct Scheduler {
    monitor: Arc<Mutex<DriftMonitor>>,
    /// Set while a cycle's blocking thread is alive, including one that
    /// already missed its deadline.
    in_flight: Arc<AtomicBool>,
    interval: Duration,
    timeout: Duration,
}

/// Clears the in-flight flag when the blocking thread finishes, panics included.
struct InFlight(Arc<AtomicBool>);

impl Drop for InFlight {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

impl Scheduler {
    pub fn new(monitor: DriftMonitor, interval: Duration, timeout: Duration) -> Self {
        Self {
            monitor: Arc::new(Mutex::new(monitor)),
            in_flight: Arc::new(AtomicBool::new(false)),
            interval,
            timeout,
        }
    }

    pub fn monitor(&self) -> Arc<Mutex<DriftMonitor>> {
        Arc::clone(&self.monitor)
    }

    /// An earlier cycle's thread has not returned yet.
    pub fn is_busy(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }

    /// Run a single cycle under the deadline. Returns `MonitorError::Busy`
    /// without starting anything while an abandoned cycle is still running.
    pub async fn tick(&self) -> Result<CycleOutcome, MonitorError> {
        if self.in_flight.swap(true, Ordering::AcqRel) {
            warn!("previous cycle still running; tick skipped");
            return Err(MonitorError::Busy);
        }
        let guard = InFlight(Arc::clone(&self.in_flight));
        let cancel = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&cancel);
        let monitor = Arc::clone(&self.monitor);
        let handle = tokio::task::spawn_blocking(move || {
            let _guard = guard;
            // Cycles commit atomically, so state behind a poisoned lock is intact.
            let mut m = monitor.lock().unwrap_or_else(PoisonError::into_inner);
            m.run_cycle_cancellable(&flag)
        });

        match tokio::time::timeout(self.timeout, handle).await {
            Ok(Ok(result)) => result,
            Ok(Err(e)) => Err(MonitorError::Task(e.to_string())),
            Err(_) => {
                cancel.store(true, Ordering::Relaxed);
                warn!(
                    timeout_secs = self.timeout.as_secs_f64(),
                    "cycle exceeded deadline; result discarded"
                );
                Err(MonitorError::Cancelled)
            }
        }
    }

    /// Tick every `interval` until `shutdown` flips to true or its sender is
    /// dropped. `on_outcome` sees every cycle, failed or not.
    pub async fn run<F>(self, mut shutdown: watch::Receiver<bool>, mut on_outcome: F)
    where
        F: FnMut(u64, &Result<CycleOutcome, MonitorError>),
    {
        let mut ticker = tokio::time::interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut cycle: u64 = 0;
        loop {
            tokio::select! {
                _ = ticker.tick() => {}
                _ = shutdown.changed() => break,
            }
            if *shutdown.borrow() {
                break;
            }
            cycle += 1;
            let outcome = self.tick().await;
            if let Err(e) = &outcome {
                warn!(cycle, error = %e, "cycle failed");
            }
            on_outcome(cycle, &outcome);
        }
        info!(cycles = cycle, "scheduler stopping");
    }
}

/// Shutdown channel flipped to true by Ctrl+C. The caller holds the sender
/// for as long as the scheduler runs, so a failed handler registration only
/// loses the signal and does not close the channel.
pub fn ctrlc_shutdown() -> (watch::Sender<bool>, watch::Receiver<bool>) {
    let (tx, rx) = watch::channel(false);
    let handler_tx = tx.clone();
    if let Err(e) = ctrlc::set_handler(move || {
        let _ = handler_tx.send(true);
    }) {
        warn!(error = %e, "could not install Ctrl+C handler; stop the process externally");
    }
    (tx, rx)
}
