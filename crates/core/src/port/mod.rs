// Port Layer - Interfaces for external collaborators

pub mod address_classifier;
pub mod event_channel;
pub mod process_launcher;

// Re-exports
pub use address_classifier::AddressClassifier;
pub use event_channel::EventChannel;
pub use process_launcher::{
    ExecutionError, ProbeProcess, ProcessExit, ProcessLauncher, TerminationSignal,
};
