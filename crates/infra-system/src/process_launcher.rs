// Probe process launcher
// reason: tokio for async process management, nix for signal delivery
use async_trait::async_trait;
use std::collections::HashMap;
use std::process::Stdio;
use tokio::io::AsyncReadExt;
use tokio::process::{Child, ChildStdout, Command};
use tracing::{debug, info};

use ping_probe_core::port::process_launcher::{
    ExecutionError, ProbeProcess, ProcessExit, ProcessLauncher, TerminationSignal,
};

/// Wrapper that forces line buffering on the probe's stdout
pub const DEFAULT_LINE_BUFFER_WRAPPER: &str = "unbuffer";

/// Size of a single stdout read
const READ_BUFFER_SIZE: usize = 4096;

/// Launches probe binaries as tokio child processes
///
/// The child runs in its own process group with a filtered environment and
/// `LC_ALL=C`, so output is always in the format the parser expects.
pub struct TokioProcessLauncher {
    wrapper: Option<String>,
    env_allowlist: Vec<String>,
}

impl TokioProcessLauncher {
    /// Create a new launcher
    ///
    /// # Arguments
    /// * `wrapper` - Line-buffering wrapper run in front of the binary (None: run directly)
    /// * `env_allowlist` - Environment variables passed through to the child
    ///
    /// # Example
    /// ```ignore
    /// let launcher = TokioProcessLauncher::new(
    ///     Some(DEFAULT_LINE_BUFFER_WRAPPER.to_string()),
    ///     vec!["PATH".to_string()],
    /// );
    /// ```
    pub fn new(wrapper: Option<String>, env_allowlist: Vec<String>) -> Self {
        Self {
            wrapper: wrapper.filter(|w| !w.trim().is_empty()),
            env_allowlist,
        }
    }

    /// Filter the current environment to the allowlist
    fn filter_env(&self, env: impl Iterator<Item = (String, String)>) -> HashMap<String, String> {
        env.filter(|(k, _)| self.env_allowlist.contains(k)).collect()
    }

    fn build_command(&self, binary: &str, args: &[String]) -> Command {
        let mut command = match &self.wrapper {
            Some(wrapper) => {
                let mut command = Command::new(wrapper);
                command.arg(binary);
                command
            }
            None => Command::new(binary),
        };

        command
            .args(args)
            .env_clear()
            .envs(self.filter_env(std::env::vars()))
            .env("LC_ALL", "C")
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .kill_on_drop(true);

        #[cfg(unix)]
        command.process_group(0);

        command
    }
}

#[async_trait]
impl ProcessLauncher for TokioProcessLauncher {
    async fn spawn(
        &self,
        binary: &str,
        args: &[String],
    ) -> Result<Box<dyn ProbeProcess>, ExecutionError> {
        let mut child = self
            .build_command(binary, args)
            .spawn()
            .map_err(|e| ExecutionError::SpawnFailed(format!("{}: {}", binary, e)))?;

        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| ExecutionError::SpawnFailed("stdout was not captured".to_string()))?;

        info!(
            pid = ?child.id(),
            binary = %binary,
            wrapper = ?self.wrapper,
            "Spawned probe process"
        );

        Ok(Box::new(TokioProbeProcess {
            child,
            stdout: Some(stdout),
            pending: Vec::new(),
        }))
    }
}

/// Running probe process
pub struct TokioProbeProcess {
    child: Child,
    stdout: Option<ChildStdout>,
    /// Bytes of an incomplete UTF-8 sequence carried to the next read
    pending: Vec<u8>,
}

/// Split off everything decodable from `pending`
///
/// Invalid bytes become U+FFFD. A truncated multi-byte sequence at the end
/// stays pending until the next read completes it.
fn take_decodable(pending: &mut Vec<u8>) -> Option<String> {
    let mut decoded = String::new();

    loop {
        match std::str::from_utf8(pending) {
            Ok(valid) => {
                decoded.push_str(valid);
                pending.clear();
                break;
            }
            Err(e) => {
                let end = match e.error_len() {
                    Some(invalid_len) => e.valid_up_to() + invalid_len,
                    None => e.valid_up_to(),
                };
                let rest = pending.split_off(end);
                decoded.push_str(&String::from_utf8_lossy(pending));
                *pending = rest;

                if e.error_len().is_none() {
                    break;
                }
            }
        }
    }

    (!decoded.is_empty()).then_some(decoded)
}

#[async_trait]
impl ProbeProcess for TokioProbeProcess {
    async fn next_chunk(&mut self) -> Result<Option<String>, ExecutionError> {
        let Some(stdout) = self.stdout.as_mut() else {
            return Ok(None);
        };

        let mut buf = [0u8; READ_BUFFER_SIZE];
        loop {
            let n = stdout
                .read(&mut buf)
                .await
                .map_err(|e| ExecutionError::IoError(e.to_string()))?;

            if n == 0 {
                self.stdout = None;
                if self.pending.is_empty() {
                    return Ok(None);
                }
                let tail = String::from_utf8_lossy(&self.pending).into_owned();
                self.pending.clear();
                return Ok(Some(tail));
            }

            self.pending.extend_from_slice(&buf[..n]);
            if let Some(chunk) = take_decodable(&mut self.pending) {
                return Ok(Some(chunk));
            }
        }
    }

    fn terminate(&mut self, signal: TerminationSignal) -> Result<(), ExecutionError> {
        let Some(pid) = self.child.id() else {
            debug!("Probe process already reaped, nothing to signal");
            return Ok(());
        };

        #[cfg(unix)]
        {
            use nix::sys::signal::{killpg, Signal};
            use nix::unistd::Pid;

            let signal = match signal {
                TerminationSignal::Terminate => Signal::SIGTERM,
                TerminationSignal::Kill => Signal::SIGKILL,
            };

            // The child leads its own process group; signal the whole group
            info!(pid = %pid, signal = ?signal, "Signalling probe process group");
            killpg(Pid::from_raw(pid as i32), signal)
                .map_err(|e| ExecutionError::Killed(format!("{:?} failed: {}", signal, e)))
        }

        #[cfg(not(unix))]
        {
            info!(pid = %pid, signal = ?signal, "Killing probe process");
            self.child
                .start_kill()
                .map_err(|e| ExecutionError::Killed(e.to_string()))
        }
    }

    async fn wait(&mut self) -> Result<ProcessExit, ExecutionError> {
        self.stdout = None;

        let status = self
            .child
            .wait()
            .await
            .map_err(|e| ExecutionError::IoError(e.to_string()))?;

        debug!(status = %status, "Probe process exited");

        Ok(ProcessExit {
            success: status.success(),
            code: status.code(),
        })
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    fn direct_launcher() -> TokioProcessLauncher {
        TokioProcessLauncher::new(None, vec!["PATH".to_string()])
    }

    async fn drain(process: &mut Box<dyn ProbeProcess>) -> String {
        let mut output = String::new();
        while let Some(chunk) = process.next_chunk().await.unwrap() {
            output.push_str(&chunk);
        }
        output
    }

    #[tokio::test]
    async fn test_streams_stdout_and_exit_status() {
        let launcher = direct_launcher();
        let args = vec!["-c".to_string(), "printf 'a\\nb\\n'; exit 3".to_string()];

        let mut process = launcher.spawn("sh", &args).await.unwrap();
        let output = drain(&mut process).await;
        let exit = process.wait().await.unwrap();

        assert_eq!(output, "a\nb\n");
        assert_eq!(
            exit,
            ProcessExit {
                success: false,
                code: Some(3)
            }
        );
    }

    #[tokio::test]
    async fn test_child_sees_only_allowlisted_env() {
        let launcher = direct_launcher();
        let args = vec!["-c".to_string(), "echo \"$LC_ALL:${HOME:-unset}\"".to_string()];

        let mut process = launcher.spawn("sh", &args).await.unwrap();
        let output = drain(&mut process).await;
        tokio_test::assert_ok!(process.wait().await);

        assert_eq!(output, "C:unset\n");
    }

    #[tokio::test]
    async fn test_kill_stops_long_running_process() {
        let launcher = direct_launcher();
        let args = vec!["-c".to_string(), "echo started; sleep 30".to_string()];

        let mut process = launcher.spawn("sh", &args).await.unwrap();
        let first = process.next_chunk().await.unwrap();
        assert_eq!(first.as_deref(), Some("started\n"));

        process.terminate(TerminationSignal::Kill).unwrap();
        let exit = tokio::time::timeout(std::time::Duration::from_secs(5), process.wait())
            .await
            .expect("killed process should exit promptly")
            .unwrap();

        assert!(!exit.success);
        assert_eq!(exit.code, None);
    }

    #[tokio::test]
    async fn test_missing_binary_fails_to_spawn() {
        let launcher = direct_launcher();

        let result = launcher.spawn("/nonexistent/ping-binary", &[]).await;

        assert!(matches!(result, Err(ExecutionError::SpawnFailed(_))));
    }

    #[test]
    fn test_wrapper_prepends_binary() {
        let launcher = TokioProcessLauncher::new(Some("unbuffer".to_string()), vec![]);
        let command = launcher.build_command("ping", &["-c".to_string(), "1".to_string()]);
        let std_command = command.as_std();

        assert_eq!(std_command.get_program(), "unbuffer");
        let args: Vec<_> = std_command.get_args().collect();
        assert_eq!(args, vec!["ping", "-c", "1"]);
    }

    #[test]
    fn test_blank_wrapper_is_disabled() {
        let launcher = TokioProcessLauncher::new(Some("  ".to_string()), vec![]);
        assert!(launcher.wrapper.is_none());
    }

    #[test]
    fn test_take_decodable_keeps_truncated_sequence() {
        // "é" is 0xC3 0xA9
        let mut pending = vec![b'o', b'k', 0xC3];
        assert_eq!(take_decodable(&mut pending).as_deref(), Some("ok"));
        assert_eq!(pending, vec![0xC3]);

        assert_eq!(take_decodable(&mut pending), None);

        pending.push(0xA9);
        assert_eq!(take_decodable(&mut pending).as_deref(), Some("é"));
        assert!(pending.is_empty());
    }

    #[test]
    fn test_take_decodable_invalid_byte_keeps_split_tail() {
        let mut pending = vec![b'a', 0xFF, b'b', 0xC3];
        assert_eq!(take_decodable(&mut pending).as_deref(), Some("a\u{FFFD}b"));
        assert_eq!(pending, vec![0xC3]);

        pending.push(0xA9);
        assert_eq!(take_decodable(&mut pending).as_deref(), Some("é"));
    }
}
