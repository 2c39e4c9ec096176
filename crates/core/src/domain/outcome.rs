// Probe Outcome - normalized, externally reported shape of a result

use serde::Serialize;

use crate::domain::result::{ParsedProbeResult, SummaryStats, TimingSample};

/// Reported reply timing
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct OutcomeTiming {
    pub ttl: u32,
    pub rtt: f64,
}

/// Reported summary statistics; absent values serialize as `null`
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct OutcomeStats {
    pub min: Option<f64>,
    pub max: Option<f64>,
    pub avg: Option<f64>,
    pub loss: Option<f64>,
}

/// Terminal result payload
///
/// Every field is always present in the serialized form: optional values
/// become `null`, `timings` is an (possibly empty) array and `stats` is
/// always an object.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProbeOutcome {
    pub raw_output: String,
    pub resolved_hostname: Option<String>,
    pub resolved_address: Option<String>,
    pub timings: Vec<OutcomeTiming>,
    pub stats: OutcomeStats,
}

impl From<TimingSample> for OutcomeTiming {
    fn from(sample: TimingSample) -> Self {
        Self {
            ttl: sample.ttl,
            rtt: sample.round_trip_ms,
        }
    }
}

impl From<SummaryStats> for OutcomeStats {
    fn from(stats: SummaryStats) -> Self {
        Self {
            min: stats.min,
            max: stats.max,
            avg: stats.avg,
            loss: stats.loss_percent,
        }
    }
}

impl From<ParsedProbeResult> for ProbeOutcome {
    fn from(result: ParsedProbeResult) -> Self {
        Self {
            raw_output: result.raw_output,
            resolved_hostname: result.resolved_hostname.filter(|h| !h.is_empty()),
            resolved_address: result.resolved_address.filter(|a| !a.is_empty()),
            timings: result.timings.into_iter().map(OutcomeTiming::from).collect(),
            stats: result.stats.map(OutcomeStats::from).unwrap_or_default(),
        }
    }
}
