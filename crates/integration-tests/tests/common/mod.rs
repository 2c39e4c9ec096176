// Shared helpers: fake ping scripts run through `sh`
#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::sync::Arc;

use ping_probe_core::application::PingCommand;
use ping_probe_core::port::EventChannel;
use ping_probe_infra_system::{
    mpsc_event_channel, ChannelEvent, PrivateRangeClassifier, TokioProcessLauncher,
};

/// Write a shell script standing in for `ping`
///
/// Arguments arrive as `-c <count> -i <interval> <target>`, so the
/// target is `$5`.
pub fn fake_ping(name: &str, body: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("ping-probe-it-{}", std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();

    let path = dir.join(name);
    std::fs::write(&path, format!("#!/bin/sh\n{}\n", body)).unwrap();
    path
}

/// Ping command whose binary is `script`, interpreted by `sh`
///
/// Running the script through the wrapper slot avoids exec'ing a file that
/// was just written.
pub fn ping_command(script: &Path) -> PingCommand {
    let launcher = TokioProcessLauncher::new(Some("sh".to_string()), vec!["PATH".to_string()]);
    PingCommand::new(Arc::new(launcher), Arc::new(PrivateRangeClassifier::new()))
        .with_binary(script.to_string_lossy().into_owned())
}

/// Run `options` through `command` and collect every emitted event
pub async fn run_collecting(
    command: &PingCommand,
    test_id: &str,
    options: serde_json::Value,
) -> Vec<ChannelEvent> {
    use ping_probe_core::application::MeasurementCommand;

    let (channel, mut rx) = mpsc_event_channel();
    let channel: Arc<dyn EventChannel> = Arc::new(channel);

    command
        .run(channel, "measurement-1", test_id, &options)
        .await
        .unwrap();

    let mut events = Vec::new();
    while let Some(event) = rx.recv().await {
        events.push(event);
    }
    events
}
