//! Browser collaborator seams.
//!
//! The engine observes a host page through these traits; it never owns a
//! network stack of its own. A real embedding backs them with the page's
//! actual primitives, tests back them with in-process mocks.

use std::sync::Arc;

use futures::future::BoxFuture;
use thiserror::Error;
use tokio::task::JoinHandle;

use crate::hook::HookHandle;

/// A failure inside the host's own network call. Forwarded to the host
/// caller untouched; never produced by the capture side.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("page network error: {0}")]
pub struct PageError(pub String);

/// A request as the host page issues it.
#[derive(Debug, Clone)]
pub struct PageRequest {
    pub url: String,
    pub method: String,
}

impl PageRequest {
    pub fn get(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            method: "GET".into(),
        }
    }
}

/// A response as delivered to the host page. The body is reference-counted
/// so observing a clone never consumes the host's copy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageResponse {
    url: String,
    status: u16,
    body: Arc<str>,
}

impl PageResponse {
    pub fn new(url: impl Into<String>, status: u16, body: impl Into<Arc<str>>) -> Self {
        Self {
            url: url.into(),
            status,
            body: body.into(),
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }
    pub fn status(&self) -> u16 {
        self.status
    }
    pub fn body_text(&self) -> &str {
        &self.body
    }
}

/* ---------------- The four network primitive families ---------------- */

/// Request/response primitive (the page's `fetch` analog).
pub trait Fetch: Send + Sync {
    fn send(&self, request: PageRequest) -> BoxFuture<'static, Result<PageResponse, PageError>>;
}

/// Listener invoked with a completed response body.
pub type LoadListener = Box<dyn FnMut(&str) + Send>;

/// Long-poll style request instance (XHR analog). `on_load` adds a listener;
/// existing listeners are never replaced.
pub trait PollRequest: Send {
    fn url(&self) -> &str;
    fn on_load(&mut self, listener: LoadListener);
}

/// Listener invoked with one pushed message payload.
pub type MessageListener = Box<dyn FnMut(&str) + Send>;

/// Server-push stream instance (server-sent-events analog).
pub trait PushStream: Send {
    fn url(&self) -> &str;
    fn on_message(&mut self, listener: MessageListener);
}

/// Event classes a socket can deliver.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SocketEventKind {
    Open,
    Message,
    Error,
    Close,
}

/// One socket event, with the payload for message and error events.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SocketEvent {
    Open,
    Message(String),
    Error(String),
    Close,
}

impl SocketEvent {
    #[must_use]
    pub fn kind(&self) -> SocketEventKind {
        match self {
            SocketEvent::Open => SocketEventKind::Open,
            SocketEvent::Message(_) => SocketEventKind::Message,
            SocketEvent::Error(_) => SocketEventKind::Error,
            SocketEvent::Close => SocketEventKind::Close,
        }
    }
}

pub type SocketListener = Box<dyn FnMut(&SocketEvent) + Send>;

/// Bidirectional socket instance (WebSocket analog).
pub trait Socket: Send {
    fn url(&self) -> &str;
    fn add_listener(&mut self, kind: SocketEventKind, listener: SocketListener);
}

/* ---------------- DOM scroll capability ---------------- */

/// The slice of the DOM the scroll driver needs.
pub trait Page: Send + Sync {
    /// Scroll every element whose content overflows its visible area to its
    /// end. Returns how many elements were scrolled.
    fn scroll_overflowing_to_end(&self) -> usize;

    /// Scroll the whole document to the bottom.
    fn scroll_document_to_end(&self);
}

/* ---------------- Page context ---------------- */

/// The per-page execution context the hook installs into: the fetch slot the
/// host "calls", the install sentinel, and the hook's command-listener task.
///
/// Dropping the context tears the command task down; hook state never
/// outlives the page it was installed into.
pub struct PageContext {
    fetch: Arc<dyn Fetch>,
    hook: Option<HookHandle>,
    command_task: Option<JoinHandle<()>>,
}

impl PageContext {
    pub fn new(fetch: Arc<dyn Fetch>) -> Self {
        Self {
            fetch,
            hook: None,
            command_task: None,
        }
    }

    /// The current fetch primitive. After hook install this is the tapped
    /// wrapper; the host keeps calling through this slot unaware.
    #[must_use]
    pub fn fetch(&self) -> Arc<dyn Fetch> {
        self.fetch.clone()
    }

    /// The installed hook, if any. Doubles as the install sentinel.
    #[must_use]
    pub fn hook(&self) -> Option<&HookHandle> {
        self.hook.as_ref()
    }

    pub(crate) fn set_fetch(&mut self, fetch: Arc<dyn Fetch>) {
        self.fetch = fetch;
    }

    pub(crate) fn set_hook(&mut self, hook: HookHandle, command_task: JoinHandle<()>) {
        self.hook = Some(hook);
        self.command_task = Some(command_task);
    }
}

impl Drop for PageContext {
    fn drop(&mut self) {
        if let Some(task) = self.command_task.take() {
            task.abort();
        }
    }
}
