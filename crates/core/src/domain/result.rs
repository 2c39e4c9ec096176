// Parsed Probe Result - structured view of raw ping output

/// One echo reply
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimingSample {
    pub ttl: u32,
    pub round_trip_ms: f64,
}

/// Summary section of the ping output
///
/// Every field is `None` when its source line was missing or unparseable.
/// A missing value is never reported as zero.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SummaryStats {
    pub min: Option<f64>,
    pub avg: Option<f64>,
    pub max: Option<f64>,
    pub loss_percent: Option<f64>,
}

/// Result of parsing (possibly partial) ping output
///
/// Produced fresh by every parse call and never mutated afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedProbeResult {
    pub raw_output: String,
    pub resolved_hostname: Option<String>,
    pub resolved_address: Option<String>,
    /// Replies in output order, not deduplicated
    pub timings: Vec<TimingSample>,
    pub stats: Option<SummaryStats>,
}

impl ParsedProbeResult {
    /// Result carrying only raw text (unparseable output, failures, policy message)
    pub fn raw_only(raw_output: impl Into<String>) -> Self {
        Self {
            raw_output: raw_output.into(),
            resolved_hostname: None,
            resolved_address: None,
            timings: Vec::new(),
            stats: None,
        }
    }
}
