//! pagetap: in-page network capture engine.
//!
//! Observes a host page's own traffic through tap wrappers around the four
//! browser network primitives, extracts record collections from whatever
//! shape the responses happen to carry, deduplicates them, and exports the
//! result as JSON Lines.
//!
//! The engine has no contract with the page it observes: response shapes
//! are heuristics, the control channel gives no delivery guarantees, and no
//! capture-side failure is ever allowed to disturb the host's own network
//! handling.

pub mod browser;
pub mod channel;
pub mod collect;
pub mod config;
pub(crate) mod core;
pub mod decode;
pub mod export;
pub mod extract;
pub mod hook;
pub mod scroll;
pub mod session;

pub use browser::{
    Fetch, LoadListener, MessageListener, Page, PageContext, PageError, PageRequest, PageResponse,
    PollRequest, PushStream, Socket, SocketEvent, SocketEventKind, SocketListener,
};
pub use channel::{ChannelMessage, Command, MessageBus};
pub use collect::{Collector, SharedCollector};
pub use config::{CaptureConfig, CaptureConfigBuilder, UrlMatcher};
pub use crate::core::PagetapError;
pub use decode::decode_body;
pub use export::{ExportFile, export_filename, to_jsonl};
pub use extract::extract_records;
pub use hook::{Hook, HookHandle};
pub use scroll::{ScrollDriver, ScrollHandle, ScrollSummary, StopReason};
pub use session::{CaptureSession, SessionBuilder};
