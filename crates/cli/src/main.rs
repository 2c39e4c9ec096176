//! Ping Probe - Command-line runner
//! Runs one ping probe per target and prints measurement events as JSON lines

mod logging;

use anyhow::Result;
use clap::Parser;
use colored::Colorize;
use futures::future;
use serde_json::json;
use std::sync::Arc;
use tracing::{error, info, warn};

use ping_probe_core::application::constants::DEFAULT_PING_BINARY;
use ping_probe_core::application::{MeasurementCommand, PingCommand};
use ping_probe_core::domain::options::{DEFAULT_PACKET_COUNT, PING_COMMAND_TYPE};
use ping_probe_core::port::EventChannel;
use ping_probe_infra_system::{
    JsonLinesEventChannel, PrivateRangeClassifier, TokioProcessLauncher,
    DEFAULT_LINE_BUFFER_WRAPPER,
};

use logging::LogFormat;

const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Environment passed through to the probe process
const ENV_ALLOWLIST: [&str; 3] = ["PATH", "HOME", "USER"];

#[derive(Parser)]
#[command(name = "ping-probe")]
#[command(about = "Run ICMP ping probes and stream progress/result events", long_about = None)]
#[command(version)]
struct Cli {
    /// Hostnames or IP addresses to probe (run concurrently)
    #[arg(required = true)]
    targets: Vec<String>,

    /// Echo requests per target (1-16)
    #[arg(short = 'c', long, env = "PING_PROBE_PACKETS", default_value_t = DEFAULT_PACKET_COUNT)]
    packets: u8,

    /// Probe binary
    #[arg(long, env = "PING_PROBE_BINARY", default_value = DEFAULT_PING_BINARY)]
    binary: String,

    /// Line-buffering wrapper (empty string runs the binary directly)
    #[arg(long, env = "PING_PROBE_WRAPPER", default_value = DEFAULT_LINE_BUFFER_WRAPPER)]
    wrapper: String,

    /// Measurement id attached to every event (default: random UUID)
    #[arg(long)]
    measurement_id: Option<String>,

    /// Test id attached to every event (default: random UUID per target)
    #[arg(long)]
    test_id: Option<String>,

    /// Log output format
    #[arg(long, env = "PING_PROBE_LOG_FORMAT", value_enum, default_value_t = LogFormat::Pretty)]
    log_format: LogFormat,
}

fn new_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // 1. Initialize logging
    logging::init(cli.log_format)?;
    info!("Ping Probe v{} starting...", VERSION);

    // 2. Setup dependencies (DI wiring)
    let launcher = Arc::new(TokioProcessLauncher::new(
        Some(cli.wrapper.clone()),
        ENV_ALLOWLIST.iter().map(|v| v.to_string()).collect(),
    ));
    let classifier = Arc::new(PrivateRangeClassifier::new());
    let command: Arc<dyn MeasurementCommand> =
        Arc::new(PingCommand::new(launcher, classifier).with_binary(cli.binary.clone()));
    let channel: Arc<dyn EventChannel> = Arc::new(JsonLinesEventChannel::stdout());

    let measurement_id = cli.measurement_id.clone().unwrap_or_else(new_id);
    info!(
        measurement_id = %measurement_id,
        targets = cli.targets.len(),
        packets = cli.packets,
        "Starting probes"
    );

    // 3. One isolated task per target
    let runs = cli.targets.iter().map(|target| {
        let command = Arc::clone(&command);
        let channel = Arc::clone(&channel);
        let measurement_id = measurement_id.clone();
        let test_id = cli.test_id.clone().unwrap_or_else(new_id);
        let target = target.clone();
        let options = json!({
            "type": PING_COMMAND_TYPE,
            "target": target,
            "packets": cli.packets,
        });

        tokio::spawn(async move {
            let result = command
                .run(channel, &measurement_id, &test_id, &options)
                .await;
            (target, result)
        })
    });

    // 4. Wait for all probes or Ctrl+C
    let mut failures = 0usize;
    tokio::select! {
        outcomes = future::join_all(runs) => {
            for outcome in outcomes {
                match outcome {
                    Ok((_, Ok(()))) => {}
                    Ok((target, Err(e))) => {
                        failures += 1;
                        eprintln!("{} {}: {}", "✗".red().bold(), target, e);
                    }
                    Err(e) => {
                        failures += 1;
                        error!(error = %e, "Probe task failed");
                    }
                }
            }
        }
        _ = tokio::signal::ctrl_c() => {
            warn!("Interrupted, stopping probes");
            return Ok(());
        }
    }

    if failures > 0 {
        anyhow::bail!("{} of {} probes were rejected", failures, cli.targets.len());
    }

    info!("All probes finished");
    Ok(())
}
