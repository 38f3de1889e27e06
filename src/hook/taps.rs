use std::sync::Arc;

use futures::FutureExt;
use futures::future::BoxFuture;

use super::HookHandle;
use crate::browser::{
    Fetch, PageError, PageRequest, PageResponse, Socket, SocketEvent, SocketEventKind,
    SocketListener,
};

/// Forwarding `Fetch` wrapper. The host's result, success or error, passes
/// through byte-identical; observation reads a clone of the body.
pub(super) struct TappedFetch {
    inner: Arc<dyn Fetch>,
    hook: HookHandle,
}

impl TappedFetch {
    pub(super) fn new(inner: Arc<dyn Fetch>, hook: HookHandle) -> Self {
        Self { inner, hook }
    }
}

impl Fetch for TappedFetch {
    fn send(&self, request: PageRequest) -> BoxFuture<'static, Result<PageResponse, PageError>> {
        let inner = self.inner.clone();
        let hook = self.hook.clone();
        let url = request.url.clone();
        async move {
            let result = inner.send(request).await;
            if let Ok(response) = &result {
                hook.capture_body(&url, response.body_text());
            }
            result
        }
        .boxed()
    }
}

/// Forwarding `Socket` wrapper. Message listeners are decorated so the
/// capture step runs before the host's own listener; every other listener
/// kind is registered untouched.
pub(super) struct TappedSocket {
    inner: Box<dyn Socket>,
    hook: HookHandle,
}

impl TappedSocket {
    pub(super) fn new(inner: Box<dyn Socket>, hook: HookHandle) -> Self {
        Self { inner, hook }
    }
}

impl Socket for TappedSocket {
    fn url(&self) -> &str {
        self.inner.url()
    }

    fn add_listener(&mut self, kind: SocketEventKind, mut listener: SocketListener) {
        if kind != SocketEventKind::Message {
            self.inner.add_listener(kind, listener);
            return;
        }
        let hook = self.hook.clone();
        let url = self.inner.url().to_string();
        let wrapped: SocketListener = Box::new(move |event| {
            if let SocketEvent::Message(data) = event {
                hook.capture_body(&url, data);
            }
            listener(event);
        });
        self.inner.add_listener(kind, wrapped);
    }
}
