//! The capture session: the privileged controller that owns the collector,
//! commands the hook over the bus, and paces the scroll driver.

use std::sync::Arc;

use serde_json::Value;
use tokio::sync::{RwLock, broadcast};
use tokio::task::JoinHandle;
use tracing::debug;

use crate::browser::{Page, PageContext};
use crate::channel::{ChannelMessage, Command, MessageBus};
use crate::collect::{Collector, SharedCollector};
use crate::config::CaptureConfig;
use crate::core::PagetapError;
use crate::export::{self, ExportFile};
use crate::hook::{Hook, HookHandle};
use crate::scroll::{ScrollDriver, ScrollHandle, ScrollSummary};

/* ---------------- Builder ---------------- */

/// Builder for a [`CaptureSession`].
#[derive(Default)]
pub struct SessionBuilder {
    page: Option<Arc<dyn Page>>,
    config: Option<CaptureConfig>,
}

impl SessionBuilder {
    /// The host page the scroll driver will work against.
    #[must_use]
    pub fn page(mut self, page: Arc<dyn Page>) -> Self {
        self.page = Some(page);
        self
    }

    /// Use a non-default configuration.
    #[must_use]
    pub fn config(mut self, config: CaptureConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Assemble the session: bus, shared collector, and the payload pump
    /// that feeds reported records into the collector.
    ///
    /// # Errors
    ///
    /// Returns an error if no page was supplied.
    pub fn build(self) -> Result<CaptureSession, PagetapError> {
        let page = self
            .page
            .ok_or_else(|| PagetapError::Config("session requires a page".into()))?;
        let config = Arc::new(self.config.unwrap_or_default());
        let bus = MessageBus::new(config.bus_capacity());
        let collector: SharedCollector = Arc::new(RwLock::new(Collector::new(&config)));
        let pump = tokio::spawn(run_payload_pump(
            bus.clone(),
            bus.subscribe(),
            collector.clone(),
        ));
        Ok(CaptureSession {
            config,
            bus,
            collector,
            page,
            pump,
            driver: None,
        })
    }
}

/// Feeds `Payload` messages into the collector and reports acceptance
/// counts. Dedup makes this safe under duplicate or reordered delivery.
async fn run_payload_pump(
    bus: MessageBus,
    mut rx: broadcast::Receiver<ChannelMessage>,
    collector: SharedCollector,
) {
    loop {
        match rx.recv().await {
            Ok(ChannelMessage::Payload { payload }) => {
                let (accepted, total) = {
                    let mut guard = collector.write().await;
                    let mut accepted = 0usize;
                    for record in payload {
                        if guard.push(record) {
                            accepted += 1;
                        }
                    }
                    (accepted, guard.len())
                };
                if accepted > 0 {
                    bus.post(ChannelMessage::Status {
                        msg: format!("captured +{accepted} (total {total})"),
                    });
                }
            }
            Ok(_) => {}
            Err(broadcast::error::RecvError::Lagged(skipped)) => {
                debug!(skipped, "payload pump lagged behind the bus");
            }
            Err(broadcast::error::RecvError::Closed) => break,
        }
    }
}

/* ---------------- Session ---------------- */

/// One capture session over a host page.
///
/// Stopping a session never discards accumulated data; only [`clear`]
/// (or dropping the session) does.
///
/// [`clear`]: CaptureSession::clear
pub struct CaptureSession {
    config: Arc<CaptureConfig>,
    bus: MessageBus,
    collector: SharedCollector,
    page: Arc<dyn Page>,
    pump: JoinHandle<()>,
    driver: Option<ScrollHandle>,
}

impl CaptureSession {
    /// Create a new builder.
    #[must_use]
    pub fn builder() -> SessionBuilder {
        SessionBuilder::default()
    }

    /// Install the interception hook into a page context. Idempotent; done
    /// eagerly so requests issued right after page load are already seen.
    pub fn install(&self, ctx: &mut PageContext) -> HookHandle {
        Hook::install(ctx, self.config.clone(), self.bus.clone())
    }

    /// Begin capturing: command the hook to start and spawn the scroll
    /// driver. Idempotent while a driver is still running, beyond
    /// re-asserting the verbose flag.
    pub fn start(&mut self, verbose: bool) {
        self.bus.post(ChannelMessage::Cmd {
            cmd: Command::Start,
            verbose,
        });
        let driver_running = self.driver.as_ref().is_some_and(|d| !d.is_finished());
        if !driver_running {
            let driver = ScrollDriver::new(
                self.page.clone(),
                self.collector.clone(),
                self.bus.clone(),
                &self.config,
            );
            self.driver = Some(driver.start());
            debug!("capture session started");
        }
    }

    /// Stop capturing: command the hook to stop and cancel the driver.
    /// Accumulated data survives.
    pub async fn stop(&mut self) -> Option<ScrollSummary> {
        self.bus.post(ChannelMessage::Cmd {
            cmd: Command::Stop,
            verbose: false,
        });
        match self.driver.take() {
            Some(handle) => handle.stop().await,
            None => None,
        }
    }

    /// Number of accumulated records.
    pub async fn len(&self) -> usize {
        self.collector.read().await.len()
    }

    /// Owned copy of the accumulated records, in first-seen order.
    pub async fn snapshot(&self) -> Vec<Value> {
        self.collector.read().await.snapshot()
    }

    /// Drop everything collected so far.
    pub async fn clear(&self) {
        self.collector.write().await.clear();
        self.bus.post(ChannelMessage::Status {
            msg: "collected items cleared".into(),
        });
    }

    /// Encode the current contents as a JSON Lines export.
    ///
    /// An empty collector is a valid terminal state, reported as a status
    /// and `Ok(None)` rather than an error.
    ///
    /// # Errors
    ///
    /// Returns an error only if a record fails to serialize.
    pub async fn export(&self, prefix: &str) -> Result<Option<ExportFile>, PagetapError> {
        let items = self.collector.read().await.snapshot();
        if items.is_empty() {
            self.bus.post(ChannelMessage::Status {
                msg: "no items captured".into(),
            });
            return Ok(None);
        }
        let content = export::to_jsonl(&items)?;
        let name = export::export_filename(prefix, "jsonl");
        self.bus.post(ChannelMessage::Status {
            msg: format!("exported {} items", items.len()),
        });
        Ok(Some(ExportFile { name, content }))
    }

    /// Subscribe to the control/report bus, e.g. for a status panel.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<ChannelMessage> {
        self.bus.subscribe()
    }

    /// The shared collector, for embedders that read it directly.
    #[must_use]
    pub fn collector(&self) -> SharedCollector {
        self.collector.clone()
    }
}

impl Drop for CaptureSession {
    fn drop(&mut self) {
        self.pump.abort();
        if let Some(driver) = self.driver.take() {
            driver.abort();
        }
    }
}
