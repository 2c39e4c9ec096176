// Process Launcher Port
// Abstraction over spawning the probe binary and streaming its stdout

use async_trait::async_trait;
use thiserror::Error;

/// Exit information of a finished probe process
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProcessExit {
    pub success: bool,
    /// None when terminated by a signal
    pub code: Option<i32>,
}

/// Signal used to stop a running probe
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TerminationSignal {
    /// SIGTERM
    Terminate,
    /// SIGKILL
    Kill,
}

/// Execution errors
#[derive(Error, Debug)]
pub enum ExecutionError {
    #[error("Spawn failed: {0}")]
    SpawnFailed(String),

    #[error("Process killed: {0}")]
    Killed(String),

    #[error("IO error: {0}")]
    IoError(String),
}

/// Handle to one running probe process
#[async_trait]
pub trait ProbeProcess: Send {
    /// Next chunk of stdout, `Ok(None)` once the stream is closed
    async fn next_chunk(&mut self) -> Result<Option<String>, ExecutionError>;

    /// Deliver `signal` to the process without waiting for it to exit
    fn terminate(&mut self, signal: TerminationSignal) -> Result<(), ExecutionError>;

    /// Wait for the process to exit and release its handle
    async fn wait(&mut self) -> Result<ProcessExit, ExecutionError>;
}

/// Process Launcher trait
///
/// Implementations:
/// - TokioProcessLauncher (infra-system): spawns the binary under a
///   line-buffering wrapper
#[async_trait]
pub trait ProcessLauncher: Send + Sync {
    /// Start `binary` with `args`
    ///
    /// # Errors
    /// - ExecutionError::SpawnFailed if the process cannot be started
    async fn spawn(
        &self,
        binary: &str,
        args: &[String],
    ) -> Result<Box<dyn ProbeProcess>, ExecutionError>;
}

// ============================================================================
// Mock Implementations for Testing
// ============================================================================

pub mod mocks {
    use super::*;
    use std::collections::VecDeque;
    use std::sync::{Arc, Mutex};

    /// What the scripted process observed during a run
    #[derive(Debug, Default, Clone)]
    pub struct ScriptLog {
        pub spawned: Vec<(String, Vec<String>)>,
        pub chunks_delivered: usize,
        pub signals: Vec<TerminationSignal>,
        pub waited: bool,
    }

    /// Launcher whose processes replay a fixed list of stdout chunks
    #[derive(Clone)]
    pub struct ScriptedProcessLauncher {
        chunks: Vec<String>,
        exit: ProcessExit,
        spawn_error: Option<String>,
        read_error_after: Option<usize>,
        ignore_terminate: bool,
        log: Arc<Mutex<ScriptLog>>,
    }

    impl ScriptedProcessLauncher {
        pub fn new<I, S>(chunks: I, exit: ProcessExit) -> Self
        where
            I: IntoIterator<Item = S>,
            S: Into<String>,
        {
            Self {
                chunks: chunks.into_iter().map(Into::into).collect(),
                exit,
                spawn_error: None,
                read_error_after: None,
                ignore_terminate: false,
                log: Arc::new(Mutex::new(ScriptLog::default())),
            }
        }

        /// Process that exits with status 0 after `chunks`
        pub fn succeeding<I, S>(chunks: I) -> Self
        where
            I: IntoIterator<Item = S>,
            S: Into<String>,
        {
            Self::new(
                chunks,
                ProcessExit {
                    success: true,
                    code: Some(0),
                },
            )
        }

        /// Process that exits with `code` after `chunks`
        pub fn failing<I, S>(chunks: I, code: i32) -> Self
        where
            I: IntoIterator<Item = S>,
            S: Into<String>,
        {
            Self::new(
                chunks,
                ProcessExit {
                    success: false,
                    code: Some(code),
                },
            )
        }

        /// Spawning fails with `message`
        pub fn unspawnable(message: impl Into<String>) -> Self {
            let mut launcher = Self::succeeding(Vec::<String>::new());
            launcher.spawn_error = Some(message.into());
            launcher
        }

        /// Reading stdout fails after `n` chunks
        pub fn with_read_error_after(mut self, n: usize) -> Self {
            self.read_error_after = Some(n);
            self
        }

        /// SIGTERM is recorded but the process keeps running until SIGKILL
        pub fn ignoring_terminate(mut self) -> Self {
            self.ignore_terminate = true;
            self
        }

        pub fn log(&self) -> ScriptLog {
            self.log.lock().unwrap().clone()
        }
    }

    struct ScriptedProcess {
        chunks: VecDeque<String>,
        exit: ProcessExit,
        read_error_after: Option<usize>,
        ignore_terminate: bool,
        killed: bool,
        log: Arc<Mutex<ScriptLog>>,
    }

    #[async_trait]
    impl ProbeProcess for ScriptedProcess {
        async fn next_chunk(&mut self) -> Result<Option<String>, ExecutionError> {
            if self.killed {
                return Ok(None);
            }
            let mut log = self.log.lock().unwrap();
            if self.read_error_after == Some(log.chunks_delivered) {
                return Err(ExecutionError::IoError("scripted read failure".to_string()));
            }
            let chunk = self.chunks.pop_front();
            if chunk.is_some() {
                log.chunks_delivered += 1;
            }
            Ok(chunk)
        }

        fn terminate(&mut self, signal: TerminationSignal) -> Result<(), ExecutionError> {
            if signal == TerminationSignal::Kill || !self.ignore_terminate {
                self.killed = true;
            }
            self.log.lock().unwrap().signals.push(signal);
            Ok(())
        }

        async fn wait(&mut self) -> Result<ProcessExit, ExecutionError> {
            self.log.lock().unwrap().waited = true;
            let terminated = self
                .log
                .lock()
                .unwrap()
                .signals
                .contains(&TerminationSignal::Terminate);
            if terminated && !self.killed {
                // Stalls until the caller gives up and escalates
                std::future::pending::<()>().await;
            }
            if self.killed {
                return Ok(ProcessExit {
                    success: false,
                    code: None,
                });
            }
            Ok(self.exit)
        }
    }

    #[async_trait]
    impl ProcessLauncher for ScriptedProcessLauncher {
        async fn spawn(
            &self,
            binary: &str,
            args: &[String],
        ) -> Result<Box<dyn ProbeProcess>, ExecutionError> {
            self.log
                .lock()
                .unwrap()
                .spawned
                .push((binary.to_string(), args.to_vec()));

            if let Some(message) = &self.spawn_error {
                return Err(ExecutionError::SpawnFailed(message.clone()));
            }

            Ok(Box::new(ScriptedProcess {
                chunks: self.chunks.iter().cloned().collect(),
                exit: self.exit,
                read_error_after: self.read_error_after,
                ignore_terminate: self.ignore_terminate,
                killed: false,
                log: Arc::clone(&self.log),
            }))
        }
    }
}
