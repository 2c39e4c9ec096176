// Event channel adapters
// JSON lines on a writer (CLI) and a tokio mpsc channel (embedding hosts)
use std::io::Write;
use std::sync::Mutex;

use serde_json::json;
use tokio::sync::mpsc;
use tracing::{debug, warn};

use ping_probe_core::port::EventChannel;

/// Writes one `{"event": ..., "payload": ...}` JSON object per line
pub struct JsonLinesEventChannel<W: Write + Send> {
    writer: Mutex<W>,
}

impl<W: Write + Send> JsonLinesEventChannel<W> {
    pub fn new(writer: W) -> Self {
        Self {
            writer: Mutex::new(writer),
        }
    }

    /// Give back the underlying writer
    pub fn into_inner(self) -> W {
        self.writer
            .into_inner()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl JsonLinesEventChannel<std::io::Stdout> {
    pub fn stdout() -> Self {
        Self::new(std::io::stdout())
    }
}

impl<W: Write + Send> EventChannel for JsonLinesEventChannel<W> {
    fn emit(&self, event_name: &str, payload: serde_json::Value) {
        let line = json!({ "event": event_name, "payload": payload });

        // Lines from concurrent probes must not interleave
        let mut writer = self
            .writer
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());

        let written = writeln!(writer, "{}", line).and_then(|_| writer.flush());
        if let Err(e) = written {
            warn!(event = %event_name, error = %e, "Failed to write event");
        }
    }
}

/// Event as forwarded through [`MpscEventChannel`]
#[derive(Debug, Clone, PartialEq)]
pub struct ChannelEvent {
    pub name: String,
    pub payload: serde_json::Value,
}

/// Forwards events to a tokio unbounded channel
#[derive(Clone)]
pub struct MpscEventChannel {
    tx: mpsc::UnboundedSender<ChannelEvent>,
}

/// Create an event channel and the receiver that observes it
pub fn mpsc_event_channel() -> (MpscEventChannel, mpsc::UnboundedReceiver<ChannelEvent>) {
    let (tx, rx) = mpsc::unbounded_channel();
    (MpscEventChannel { tx }, rx)
}

impl EventChannel for MpscEventChannel {
    fn emit(&self, event_name: &str, payload: serde_json::Value) {
        let event = ChannelEvent {
            name: event_name.to_string(),
            payload,
        };
        if self.tx.send(event).is_err() {
            debug!(event = %event_name, "Event receiver dropped, discarding event");
        }
    }
}
