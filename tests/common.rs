#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use futures::FutureExt;
use futures::future::BoxFuture;
use serde_json::json;

use pagetap::{
    Fetch, LoadListener, MessageListener, Page, PageError, PageRequest, PageResponse, PollRequest,
    PushStream, SharedCollector, Socket, SocketEvent, SocketEventKind, SocketListener,
};

/// A response body carrying two id-keyed records under a `logs` wrapper.
pub const LOGS_BODY: &str = r#"{"logs":[{"id":"a","level":"info"},{"id":"b","level":"warn"}]}"#;

/// A URL the default pattern set matches.
pub const MATCHING_URL: &str = "https://host.test/api/logs?page=1";

/// A URL the default pattern set does not match.
pub const OTHER_URL: &str = "https://host.test/api/profile";

/* ---------------- Fetch mocks ---------------- */

/// Returns the same canned body for every request, counting calls.
pub struct StaticFetch {
    body: String,
    status: u16,
    pub calls: AtomicUsize,
}

impl StaticFetch {
    pub fn new(body: impl Into<String>) -> Self {
        Self {
            body: body.into(),
            status: 200,
            calls: AtomicUsize::new(0),
        }
    }
}

impl Fetch for StaticFetch {
    fn send(&self, request: PageRequest) -> BoxFuture<'static, Result<PageResponse, PageError>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let response = PageResponse::new(request.url, self.status, self.body.clone());
        async move { Ok(response) }.boxed()
    }
}

/// Fails every request, for error passthrough checks.
pub struct FailingFetch;

impl Fetch for FailingFetch {
    fn send(&self, _request: PageRequest) -> BoxFuture<'static, Result<PageResponse, PageError>> {
        async move { Err(PageError("connection reset".into())) }.boxed()
    }
}

/* ---------------- Event-driven primitive mocks ---------------- */

pub struct MockPoll {
    url: String,
    listeners: Vec<LoadListener>,
}

impl MockPoll {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            listeners: Vec::new(),
        }
    }

    pub fn complete(&mut self, body: &str) {
        for listener in &mut self.listeners {
            listener(body);
        }
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }
}

impl PollRequest for MockPoll {
    fn url(&self) -> &str {
        &self.url
    }

    fn on_load(&mut self, listener: LoadListener) {
        self.listeners.push(listener);
    }
}

pub struct MockStream {
    url: String,
    listeners: Vec<MessageListener>,
}

impl MockStream {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            listeners: Vec::new(),
        }
    }

    pub fn emit(&mut self, data: &str) {
        for listener in &mut self.listeners {
            listener(data);
        }
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }
}

impl PushStream for MockStream {
    fn url(&self) -> &str {
        &self.url
    }

    fn on_message(&mut self, listener: MessageListener) {
        self.listeners.push(listener);
    }
}

/// Listener storage is shared between clones so tests can keep a driver
/// handle after moving a clone into the tap wrapper.
#[derive(Clone)]
pub struct MockSocket {
    url: String,
    listeners: Arc<Mutex<Vec<(SocketEventKind, SocketListener)>>>,
}

impl MockSocket {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            listeners: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn fire(&self, event: &SocketEvent) {
        let mut listeners = self.listeners.lock().unwrap();
        for (kind, listener) in listeners.iter_mut() {
            if *kind == event.kind() {
                listener(event);
            }
        }
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.lock().unwrap().len()
    }
}

impl Socket for MockSocket {
    fn url(&self) -> &str {
        &self.url
    }

    fn add_listener(&mut self, kind: SocketEventKind, listener: SocketListener) {
        self.listeners.lock().unwrap().push((kind, listener));
    }
}

/* ---------------- Page mock ---------------- */

struct Growth {
    remaining: usize,
    next_id: usize,
    collector: Option<SharedCollector>,
}

/// Scriptable page: a fixed number of overflowing elements, optionally
/// feeding one fresh record into the collector per scroll pass.
pub struct MockPage {
    overflowing: usize,
    pub element_passes: AtomicUsize,
    pub document_scrolls: AtomicUsize,
    growth: Mutex<Growth>,
}

impl MockPage {
    /// No overflowing elements, never grows the collector.
    pub fn stagnant() -> Self {
        Self::new(0)
    }

    pub fn new(overflowing: usize) -> Self {
        Self {
            overflowing,
            element_passes: AtomicUsize::new(0),
            document_scrolls: AtomicUsize::new(0),
            growth: Mutex::new(Growth {
                remaining: 0,
                next_id: 0,
                collector: None,
            }),
        }
    }

    /// Feed `records` fresh records into the collector, one per scroll pass.
    pub fn grow(overflowing: usize, records: usize, collector: SharedCollector) -> Self {
        let page = Self::new(overflowing);
        {
            let mut growth = page.growth.lock().unwrap();
            growth.remaining = records;
            growth.collector = Some(collector);
        }
        page
    }
}

impl Page for MockPage {
    fn scroll_overflowing_to_end(&self) -> usize {
        self.element_passes.fetch_add(1, Ordering::SeqCst);
        let mut growth = self.growth.lock().unwrap();
        if growth.remaining > 0
            && let Some(collector) = growth.collector.clone()
            && let Ok(mut guard) = collector.try_write()
        {
            let id = format!("gen-{}", growth.next_id);
            guard.push(json!({ "id": id }));
            growth.next_id += 1;
            growth.remaining -= 1;
        }
        self.overflowing
    }

    fn scroll_document_to_end(&self) {
        self.document_scrolls.fetch_add(1, Ordering::SeqCst);
    }
}
