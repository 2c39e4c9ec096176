// Ping Probe Core - Parsing, Policy & Supervision
// NO infrastructure dependencies (processes, sockets, IP policy tables live in adapters)

pub mod application;
pub mod domain;
pub mod error;
pub mod parser;
pub mod port;

pub use error::{AppError, Result};

pub const VERSION: &str = env!("CARGO_PKG_VERSION");
