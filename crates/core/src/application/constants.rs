// Probe constants (no magic values)

/// Probe binary spawned by default
pub const DEFAULT_PING_BINARY: &str = "ping";

/// Inter-packet interval passed to `ping -i` (200ms)
pub const PACKET_INTERVAL_SECS: &str = "0.2";

/// Raw output reported when the target resolves to a private address
pub const PRIVATE_IP_MESSAGE: &str = "Private IP ranges are not allowed";

/// Event carrying the accumulated output so far
pub const PROGRESS_EVENT: &str = "probe:measurement:progress";

/// Terminal event carrying the normalized outcome
pub const RESULT_EVENT: &str = "probe:measurement:result";

/// Time a probe gets to exit after SIGTERM before it is killed (1 second)
pub const GRACEFUL_SHUTDOWN_TIMEOUT_MS: u64 = 1000;
