//! The auto-scroll driver: a bounded, cancellable loop that provokes the
//! host page into loading more data, and stops once the collector stops
//! growing.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tokio::time::sleep;
use tracing::debug;

use crate::browser::Page;
use crate::channel::{ChannelMessage, MessageBus};
use crate::collect::SharedCollector;
use crate::config::CaptureConfig;

/* ---------------- Public API ---------------- */

/// Why the driver's loop ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// The collector stopped growing for the configured streak.
    Stagnant,
    /// The iteration ceiling was reached.
    IterationLimit,
    /// The session stopped the loop (or the handle went away).
    Cancelled,
}

/// Final accounting for one driver run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScrollSummary {
    pub iterations: u32,
    pub collected: usize,
    pub reason: StopReason,
}

/// A handle for a running driver task.
pub struct ScrollHandle {
    join: JoinHandle<ScrollSummary>,
    stop_tx: Option<oneshot::Sender<()>>,
}

impl ScrollHandle {
    /// Ask the loop to stop at its next iteration boundary and wait for it.
    pub async fn stop(mut self) -> Option<ScrollSummary> {
        if let Some(tx) = self.stop_tx.take() {
            let _ = tx.send(());
        }
        self.join.await.ok()
    }

    /// Wait for the loop to end on its own.
    pub async fn join(self) -> Option<ScrollSummary> {
        // Keep stop_tx alive while waiting; dropping it would read as a
        // cancellation at the next iteration boundary.
        let ScrollHandle { join, stop_tx } = self;
        let summary = join.await.ok();
        drop(stop_tx);
        summary
    }

    /// Immediately abort the background task.
    pub fn abort(self) {
        self.join.abort();
    }

    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.join.is_finished()
    }
}

/// Drives repeated scroll-to-end passes against the host page.
pub struct ScrollDriver {
    page: Arc<dyn Page>,
    collector: SharedCollector,
    bus: MessageBus,
    pacing: Duration,
    stagnant_limit: u32,
    max_iterations: u32,
}

impl ScrollDriver {
    #[must_use]
    pub fn new(
        page: Arc<dyn Page>,
        collector: SharedCollector,
        bus: MessageBus,
        config: &CaptureConfig,
    ) -> Self {
        Self {
            page,
            collector,
            bus,
            pacing: config.pacing(),
            stagnant_limit: config.stagnant_limit(),
            max_iterations: config.max_iterations(),
        }
    }

    /// Spawn the loop. Per iteration: check for cancellation, scroll every
    /// overflowing element to its end (or the whole document when none
    /// exist), wait out the pacing interval, then compare the collector's
    /// count against the last observation to update the stagnation streak.
    #[must_use]
    pub fn start(self) -> ScrollHandle {
        let (stop_tx, mut stop_rx) = oneshot::channel::<()>();

        let join = tokio::spawn(async move {
            let mut iterations = 0u32;
            let mut stagnant = 0u32;
            let mut last_count = self.collector.read().await.len();

            let reason = loop {
                if iterations >= self.max_iterations {
                    break StopReason::IterationLimit;
                }
                // Cancellation is observed only at the iteration boundary;
                // a closed channel means the handle is gone and counts too.
                match stop_rx.try_recv() {
                    Ok(()) | Err(oneshot::error::TryRecvError::Closed) => {
                        break StopReason::Cancelled;
                    }
                    Err(oneshot::error::TryRecvError::Empty) => {}
                }

                if self.page.scroll_overflowing_to_end() == 0 {
                    self.page.scroll_document_to_end();
                }
                sleep(self.pacing).await;
                iterations += 1;

                let count = self.collector.read().await.len();
                if count == last_count {
                    stagnant += 1;
                } else {
                    stagnant = 0;
                    last_count = count;
                }
                self.bus.post(ChannelMessage::Status {
                    msg: format!("auto-scrolling, {count} items collected"),
                });
                if stagnant >= self.stagnant_limit {
                    self.bus.post(ChannelMessage::Status {
                        msg: "no new items arriving".into(),
                    });
                    break StopReason::Stagnant;
                }
            };

            let collected = self.collector.read().await.len();
            debug!(iterations, collected, ?reason, "scroll driver finished");
            ScrollSummary {
                iterations,
                collected,
                reason,
            }
        });

        ScrollHandle {
            join,
            stop_tx: Some(stop_tx),
        }
    }
}
