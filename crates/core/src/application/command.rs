// Measurement commands - entry points invoked per measurement request

use std::sync::Arc;

use async_trait::async_trait;
use tracing::warn;

use crate::application::constants::DEFAULT_PING_BINARY;
use crate::application::reporter::ProgressReporter;
use crate::application::supervisor::ProbeSupervisor;
use crate::domain::options::PING_COMMAND_TYPE;
use crate::domain::{ProbeOptions, ProbeState};
use crate::error::{AppError, Result};
use crate::port::{AddressClassifier, EventChannel, ProcessLauncher};

/// Contract shared by every probe type
#[async_trait]
pub trait MeasurementCommand: Send + Sync {
    /// Validate `options`, run the probe and stream its events to `channel`
    ///
    /// # Errors
    /// - AppError::InvalidOptions if `options` are rejected; nothing is
    ///   spawned or emitted in that case
    async fn run(
        &self,
        channel: Arc<dyn EventChannel>,
        measurement_id: &str,
        test_id: &str,
        options: &serde_json::Value,
    ) -> Result<()>;
}

/// ICMP ping command
pub struct PingCommand {
    launcher: Arc<dyn ProcessLauncher>,
    classifier: Arc<dyn AddressClassifier>,
    binary: String,
}

impl PingCommand {
    pub fn new(launcher: Arc<dyn ProcessLauncher>, classifier: Arc<dyn AddressClassifier>) -> Self {
        Self {
            launcher,
            classifier,
            binary: DEFAULT_PING_BINARY.to_string(),
        }
    }

    /// Override the probe binary (default: `ping`)
    pub fn with_binary(mut self, binary: impl Into<String>) -> Self {
        self.binary = binary.into();
        self
    }

    /// Run a probe with already validated options
    pub async fn probe(
        &self,
        channel: Arc<dyn EventChannel>,
        measurement_id: &str,
        test_id: &str,
        options: &ProbeOptions,
    ) -> ProbeState {
        let reporter = ProgressReporter::new(channel, test_id, measurement_id);
        let supervisor = ProbeSupervisor::new(
            Arc::clone(&self.launcher),
            Arc::clone(&self.classifier),
            self.binary.clone(),
        );
        supervisor.run(options, reporter).await
    }
}

#[async_trait]
impl MeasurementCommand for PingCommand {
    async fn run(
        &self,
        channel: Arc<dyn EventChannel>,
        measurement_id: &str,
        test_id: &str,
        options: &serde_json::Value,
    ) -> Result<()> {
        let options = ProbeOptions::from_value(options).map_err(|e| {
            warn!(measurement_id = %measurement_id, error = %e, "Rejected ping options");
            AppError::InvalidOptions {
                command: PING_COMMAND_TYPE.to_string(),
                reason: e.to_string(),
            }
        })?;

        self.probe(channel, measurement_id, test_id, &options).await;
        Ok(())
    }
}
