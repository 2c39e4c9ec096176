// Domain Layer - Probe options, parsed results and lifecycle state

pub mod error;
pub mod options;
pub mod outcome;
pub mod result;
pub mod state;

// Re-exports
pub use error::DomainError;
pub use options::ProbeOptions;
pub use outcome::{OutcomeStats, OutcomeTiming, ProbeOutcome};
pub use result::{ParsedProbeResult, SummaryStats, TimingSample};
pub use state::ProbeState;
