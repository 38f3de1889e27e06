//! The interception hook: tap wrappers around the page's network primitives.
//!
//! The non-negotiable contract here is non-invasiveness. Every wrapper
//! forwards to the original primitive and hands its result back untouched;
//! observation is a side channel. A capture-side failure must never break
//! the host page's own network handling, so the whole capture path is built
//! from infallible steps and the report post ignores delivery errors.

mod taps;

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use tokio::sync::broadcast;
use tracing::debug;

use crate::browser::{Fetch, PageContext, PollRequest, PushStream, Socket};
use crate::channel::{ChannelMessage, Command, MessageBus};
use crate::config::CaptureConfig;
use crate::decode::decode_body;
use crate::extract::extract_records;

/// Process-wide (per page context) runtime flags, toggled only by channel
/// commands.
#[derive(Debug)]
struct HookState {
    capturing: AtomicBool,
    verbose: AtomicBool,
}

struct HookShared {
    state: HookState,
    config: Arc<CaptureConfig>,
    bus: MessageBus,
}

/// Cheap handle to an installed hook; clones share one runtime state.
#[derive(Clone)]
pub struct HookHandle {
    shared: Arc<HookShared>,
}

/// Installer for the page-context hook.
pub struct Hook;

impl Hook {
    /// Install the interception hook into a page context.
    ///
    /// Idempotent: the context's sentinel prevents double installation,
    /// which would double-wrap the primitives and double-report. The fetch
    /// slot is wrapped in place; per-instance primitives are routed through
    /// the returned handle's `tap_*` methods as the page creates them.
    pub fn install(
        ctx: &mut PageContext,
        config: Arc<CaptureConfig>,
        bus: MessageBus,
    ) -> HookHandle {
        if let Some(existing) = ctx.hook() {
            return existing.clone();
        }
        let handle = HookHandle {
            shared: Arc::new(HookShared {
                state: HookState {
                    capturing: AtomicBool::new(false),
                    verbose: AtomicBool::new(false),
                },
                config,
                bus: bus.clone(),
            }),
        };
        ctx.set_fetch(handle.tap_fetch(ctx.fetch()));
        let command_task = tokio::spawn(run_command_listener(handle.clone(), bus.subscribe()));
        ctx.set_hook(handle.clone(), command_task);
        handle.post_status("hook installed");
        handle
    }
}

async fn run_command_listener(
    handle: HookHandle,
    mut rx: broadcast::Receiver<ChannelMessage>,
) {
    loop {
        match rx.recv().await {
            Ok(ChannelMessage::Cmd { cmd, verbose }) => handle.apply_command(cmd, verbose),
            Ok(_) => {}
            Err(broadcast::error::RecvError::Lagged(_)) => {}
            Err(broadcast::error::RecvError::Closed) => break,
        }
    }
}

impl HookHandle {
    #[must_use]
    pub fn capturing(&self) -> bool {
        self.shared.state.capturing.load(Ordering::Relaxed)
    }

    #[must_use]
    pub fn verbose(&self) -> bool {
        self.shared.state.verbose.load(Ordering::Relaxed)
    }

    fn apply_command(&self, cmd: Command, verbose: bool) {
        match cmd {
            Command::Start => {
                self.shared.state.capturing.store(true, Ordering::Relaxed);
                self.shared.state.verbose.store(verbose, Ordering::Relaxed);
                self.post_status("hook active, capturing");
            }
            Command::Stop => {
                self.shared.state.capturing.store(false, Ordering::Relaxed);
                self.post_status("hook stopped");
            }
        }
    }

    fn post_status(&self, msg: &str) {
        self.shared
            .bus
            .post(ChannelMessage::Status { msg: msg.into() });
    }

    /// Observe one response body. The entire path is contained: not
    /// capturing, unmatched URL, undecodable body and empty extraction all
    /// fall through silently; a failed report post is discarded.
    pub(crate) fn capture_body(&self, url: &str, body: &str) {
        if !self.capturing() || !self.shared.config.matcher().matches(url) {
            return;
        }
        let Some(decoded) = decode_body(body) else {
            if self.verbose() {
                debug!(url, "captured body did not decode");
            }
            return;
        };
        let records = extract_records(&decoded, self.shared.config.wrapper_keys());
        if records.is_empty() {
            return;
        }
        if self.verbose() {
            debug!(url, count = records.len(), "captured records");
        }
        self.shared
            .bus
            .post(ChannelMessage::Payload { payload: records });
    }

    /* ---------------- The four tap families ---------------- */

    /// Wrap a request/response primitive. The wrapper forwards every call
    /// and observes matching responses on a cheap body clone.
    #[must_use]
    pub fn tap_fetch(&self, inner: Arc<dyn Fetch>) -> Arc<dyn Fetch> {
        Arc::new(taps::TappedFetch::new(inner, self.clone()))
    }

    /// Attach a capture listener to a long-poll request instance.
    pub fn tap_poll(&self, poll: &mut dyn PollRequest) {
        let url = poll.url().to_string();
        let hook = self.clone();
        poll.on_load(Box::new(move |body| hook.capture_body(&url, body)));
    }

    /// Attach a capture listener to a server-push stream, but only when its
    /// URL matches at open time.
    pub fn tap_stream(&self, stream: &mut dyn PushStream) {
        if !self.shared.config.matcher().matches(stream.url()) {
            return;
        }
        let url = stream.url().to_string();
        let hook = self.clone();
        stream.on_message(Box::new(move |data| hook.capture_body(&url, data)));
    }

    /// Wrap a socket so message-type listeners run after a capture step.
    /// All other listener kinds and socket behavior pass through unmodified.
    #[must_use]
    pub fn tap_socket(&self, socket: Box<dyn Socket>) -> Box<dyn Socket> {
        Box::new(taps::TappedSocket::new(socket, self.clone()))
    }
}
