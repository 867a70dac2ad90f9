//! Completion detection
//!
//! Tracks how much work is outstanding and broadcasts a stop signal to every
//! worker once none is left.
//!
//! A unit of work is counted from the moment a URL is offered to the frontier
//! (or a rate-limit retry is scheduled) until either the frontier discards it
//! as a duplicate or a worker finishes processing it. Discovered links are
//! counted before the worker that found them finishes, so the counter cannot
//! touch zero while a sublink is still on its way to the frontier.

use crate::config::CompletionStrategy;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;

/// Idle probes in a row required by the polling strategy
const IDLE_PROBES_TO_STOP: u32 = 2;

/// Shared outstanding-work counter plus the stop broadcast
#[derive(Clone)]
pub struct CompletionDetector {
    outstanding: Arc<AtomicUsize>,
    stop: Arc<watch::Sender<bool>>,
    strategy: CompletionStrategy,
}

impl CompletionDetector {
    /// Creates a detector with nothing outstanding
    pub fn new(strategy: CompletionStrategy) -> Self {
        let (stop, _) = watch::channel(false);
        Self {
            outstanding: Arc::new(AtomicUsize::new(0)),
            stop: Arc::new(stop),
            strategy,
        }
    }

    /// Counts one more unit of work
    pub fn work_added(&self) {
        self.outstanding.fetch_add(1, Ordering::SeqCst);
    }

    /// Marks one unit of work as finished
    ///
    /// With the counter strategy this is where the stop signal fires.
    pub fn work_done(&self) {
        let previous = self.outstanding.fetch_sub(1, Ordering::SeqCst);
        debug_assert!(previous > 0, "work_done called with nothing outstanding");

        if previous == 1 && self.strategy == CompletionStrategy::Counter {
            tracing::debug!("Outstanding work reached zero, stopping workers");
            self.signal_stop();
        }
    }

    /// Current number of outstanding units
    pub fn outstanding(&self) -> usize {
        self.outstanding.load(Ordering::SeqCst)
    }

    /// Broadcasts the stop signal to every subscriber
    pub fn signal_stop(&self) {
        self.stop.send_replace(true);
    }

    /// Returns true once the stop signal has been sent
    pub fn is_stopped(&self) -> bool {
        *self.stop.borrow()
    }

    /// Returns a receiver that observes the stop signal
    pub fn subscribe(&self) -> watch::Receiver<bool> {
        self.stop.subscribe()
    }

    /// Waits until the stop signal has been sent
    pub async fn wait(&self) {
        wait_for_stop(&mut self.subscribe()).await;
    }

    /// Starts the polling probe
    ///
    /// The probe reads the counter every `interval` and stops the crawl after it
    /// has seen zero on two consecutive probes. Shutdown can lag quiescence by up
    /// to two intervals.
    pub fn spawn_poller(&self, interval: Duration) -> JoinHandle<()> {
        let detector = self.clone();
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            let mut idle_probes = 0;

            loop {
                ticker.tick().await;
                if detector.is_stopped() {
                    return;
                }

                let outstanding = detector.outstanding();
                tracing::trace!("Completion probe: {} outstanding", outstanding);

                if outstanding == 0 {
                    idle_probes += 1;
                    if idle_probes >= IDLE_PROBES_TO_STOP {
                        tracing::debug!("Crawl idle for {} probes, stopping workers", idle_probes);
                        detector.signal_stop();
                        return;
                    }
                } else {
                    idle_probes = 0;
                }
            }
        })
    }
}

/// Resolves once the watched stop flag is true or its sender is gone
pub(crate) async fn wait_for_stop(stop: &mut watch::Receiver<bool>) {
    loop {
        let stopped = *stop.borrow_and_update();
        if stopped {
            return;
        }
        if stop.changed().await.is_err() {
            return;
        }
    }
}
