//! The control/report channel crossing the isolation boundary.
//!
//! Hook and controller cannot call into each other; they share only this
//! broadcast bus. Delivery is fire-and-forget with no acks, no correlation
//! ids and no ordering guarantee, which is why the collector's dedup is a
//! correctness requirement and not a convenience.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::sync::broadcast;

/// Controller-to-hook commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Command {
    Start,
    Stop,
}

/// Everything that travels over the bus, in the documented wire shape:
///
/// - `{"type":"cmd","cmd":"start"|"stop","verbose":bool}`
/// - `{"type":"payload","payload":[...]}`
/// - `{"type":"status","msg":"..."}`
///
/// `Status` text is purely informational and never drives control decisions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ChannelMessage {
    Cmd {
        cmd: Command,
        #[serde(default)]
        verbose: bool,
    },
    Payload {
        payload: Vec<Value>,
    },
    Status {
        msg: String,
    },
}

/// Broadcast bus over the page's document-level messaging primitive.
#[derive(Debug, Clone)]
pub struct MessageBus {
    tx: broadcast::Sender<ChannelMessage>,
}

impl MessageBus {
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let (tx, _rx) = broadcast::channel(capacity);
        Self { tx }
    }

    /// Fire-and-forget broadcast. Posting with no listeners is not an error.
    pub fn post(&self, msg: ChannelMessage) {
        let _ = self.tx.send(msg);
    }

    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<ChannelMessage> {
        self.tx.subscribe()
    }
}
