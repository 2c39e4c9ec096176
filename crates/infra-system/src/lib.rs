// Ping Probe Infrastructure - System Adapters
// Implements: ProcessLauncher, AddressClassifier, EventChannel

pub mod address_classifier;
pub mod event_channel;
pub mod process_launcher;

pub use address_classifier::PrivateRangeClassifier;
pub use event_channel::{mpsc_event_channel, ChannelEvent, JsonLinesEventChannel, MpscEventChannel};
pub use process_launcher::{TokioProcessLauncher, DEFAULT_LINE_BUFFER_WRAPPER};
