// Application Layer - Probe supervision and reporting use cases

pub mod command;
pub mod constants;
pub mod reporter;
pub mod supervisor;
pub mod validator;

// Re-exports
pub use command::{MeasurementCommand, PingCommand};
pub use reporter::ProgressReporter;
pub use supervisor::{build_args, ProbeSupervisor};
pub use validator::PartialResultValidator;
