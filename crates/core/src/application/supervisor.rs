// Probe Process Supervisor
// Owns one ping subprocess and its output buffer for the probe's lifetime

use std::sync::Arc;
use std::time::{Duration, Instant};

use tracing::{debug, error, info, warn};

use crate::application::constants::{
    GRACEFUL_SHUTDOWN_TIMEOUT_MS, PACKET_INTERVAL_SECS, PRIVATE_IP_MESSAGE,
};
use crate::application::reporter::ProgressReporter;
use crate::application::validator::PartialResultValidator;
use crate::domain::{ParsedProbeResult, ProbeOptions, ProbeOutcome, ProbeState};
use crate::error::Result;
use crate::parser;
use crate::port::{AddressClassifier, ProbeProcess, ProcessLauncher, TerminationSignal};

/// Build `ping` arguments: packet count, fixed interval, target last
pub fn build_args(options: &ProbeOptions) -> Vec<String> {
    vec![
        "-c".to_string(),
        options.packet_count().to_string(),
        "-i".to_string(),
        PACKET_INTERVAL_SECS.to_string(),
        options.target().to_string(),
    ]
}

/// Captured stdout without its final line terminator
fn strip_final_newline(output: &str) -> &str {
    output
        .strip_suffix("\r\n")
        .or_else(|| output.strip_suffix('\n'))
        .unwrap_or(output)
}

/// Supervises a single probe run
///
/// Single-use: `run` consumes the supervisor. State goes
/// Idle -> Running -> {Aborted | Completed | CompletedWithProcessError}.
pub struct ProbeSupervisor {
    launcher: Arc<dyn ProcessLauncher>,
    validator: PartialResultValidator,
    binary: String,
    state: ProbeState,
    buffer: String,
}

impl ProbeSupervisor {
    pub fn new(
        launcher: Arc<dyn ProcessLauncher>,
        classifier: Arc<dyn AddressClassifier>,
        binary: impl Into<String>,
    ) -> Self {
        Self {
            launcher,
            validator: PartialResultValidator::new(classifier),
            binary: binary.into(),
            state: ProbeState::Idle,
            buffer: String::new(),
        }
    }

    /// Run the probe to completion and emit its events through `reporter`
    ///
    /// Always emits exactly one result event, whatever happens to the
    /// process. Returns the terminal state.
    pub async fn run(
        mut self,
        options: &ProbeOptions,
        mut reporter: ProgressReporter,
    ) -> ProbeState {
        let started = Instant::now();

        let result = match self.supervise(options, &mut reporter).await {
            Ok(result) => result,
            Err(e) => {
                error!(host = %options.target(), error = %e, "Probe supervision failed");
                if !self.state.is_terminal() {
                    self.state = ProbeState::CompletedWithProcessError;
                }
                ParsedProbeResult::raw_only(strip_final_newline(&self.buffer))
            }
        };

        info!(
            host = %options.target(),
            state = %self.state,
            timings = result.timings.len(),
            duration = ?started.elapsed(),
            "Probe finished"
        );

        reporter.result(ProbeOutcome::from(result));
        self.state
    }

    async fn supervise(
        &mut self,
        options: &ProbeOptions,
        reporter: &mut ProgressReporter,
    ) -> Result<ParsedProbeResult> {
        self.state.start()?;

        let args = build_args(options);
        info!(binary = %self.binary, args = ?args, "Starting ping probe");

        let mut process = match self.launcher.spawn(&self.binary, &args).await {
            Ok(process) => process,
            Err(e) => {
                warn!(binary = %self.binary, error = %e, "Failed to launch probe process");
                self.state.fail()?;
                return Ok(ParsedProbeResult::raw_only(""));
            }
        };

        loop {
            match process.next_chunk().await {
                Ok(Some(chunk)) => {
                    self.buffer.push_str(&chunk);
                    debug!(
                        chunk_len = chunk.len(),
                        buffered = self.buffer.len(),
                        "Received probe output"
                    );

                    if self.validator.should_abort(&self.buffer) {
                        return self.abort(process.as_mut(), reporter).await;
                    }
                    reporter.progress(&self.buffer);
                }
                Ok(None) => break,
                Err(e) => {
                    warn!(error = %e, "Failed to read probe output, stopping process");
                    stop_gracefully(process.as_mut()).await;
                    self.state.fail()?;
                    return Ok(ParsedProbeResult::raw_only(strip_final_newline(&self.buffer)));
                }
            }
        }

        let output = strip_final_newline(&self.buffer);
        match process.wait().await {
            Ok(exit) if exit.success => {
                self.state.complete()?;
                Ok(parser::parse(output))
            }
            Ok(exit) => {
                warn!(exit_code = ?exit.code, "Probe process exited with failure");
                self.state.fail()?;
                Ok(ParsedProbeResult::raw_only(output))
            }
            Err(e) => {
                warn!(error = %e, "Failed to wait for probe process");
                self.state.fail()?;
                Ok(ParsedProbeResult::raw_only(output))
            }
        }
    }

    /// Running -> Aborted: silence progress, SIGKILL the process, reap it
    async fn abort(
        &mut self,
        process: &mut dyn ProbeProcess,
        reporter: &mut ProgressReporter,
    ) -> Result<ParsedProbeResult> {
        reporter.suppress_progress();
        self.state.abort()?;

        warn!(binary = %self.binary, "Probe resolved to a private address, killing process");
        if let Err(e) = process.terminate(TerminationSignal::Kill) {
            warn!(error = %e, "Failed to kill probe process");
        }
        if let Err(e) = process.wait().await {
            warn!(error = %e, "Failed to reap probe process");
        }

        Ok(ParsedProbeResult::raw_only(PRIVATE_IP_MESSAGE))
    }
}

/// SIGTERM, then SIGKILL if the process outlives the grace period
async fn stop_gracefully(process: &mut dyn ProbeProcess) {
    if let Err(e) = process.terminate(TerminationSignal::Terminate) {
        warn!(error = %e, "Failed to terminate probe process");
    }

    let grace = Duration::from_millis(GRACEFUL_SHUTDOWN_TIMEOUT_MS);
    match tokio::time::timeout(grace, process.wait()).await {
        Ok(Ok(exit)) => debug!(exit_code = ?exit.code, "Probe process exited after SIGTERM"),
        Ok(Err(e)) => warn!(error = %e, "Failed to reap probe process"),
        Err(_) => {
            warn!(grace_ms = GRACEFUL_SHUTDOWN_TIMEOUT_MS, "Probe ignored SIGTERM, killing");
            if let Err(e) = process.terminate(TerminationSignal::Kill) {
                warn!(error = %e, "Failed to kill probe process");
            }
            if let Err(e) = process.wait().await {
                warn!(error = %e, "Failed to reap probe process");
            }
        }
    }
}
