// Output Parser - raw ping text to ParsedProbeResult
//
// Pure and total: unparseable input degrades to a result with only
// `raw_output` set.

pub mod line;

use crate::domain::{ParsedProbeResult, SummaryStats};
use line::{LineKind, Section};

/// Parse (possibly partial) ping output
pub fn parse(raw_output: &str) -> ParsedProbeResult {
    let mut lines = raw_output.split('\n').map(|l| l.strip_suffix('\r').unwrap_or(l));

    let Some(address) = lines.next().and_then(line::parse_header) else {
        return ParsedProbeResult::raw_only(raw_output);
    };

    let mut timings = Vec::new();
    let mut resolved_hostname = None;
    let mut stats: Option<SummaryStats> = None;
    let mut section = Section::Replies;

    for (idx, text) in lines.enumerate() {
        if idx == 0 {
            resolved_hostname = line::parse_resolved_hostname(text).map(str::to_string);
        }

        let kind = line::classify(text, section);
        match &kind {
            LineKind::Reply(sample) => timings.push(*sample),
            LineKind::SummaryMarker => stats = Some(SummaryStats::default()),
            LineKind::SummaryPackets { loss_percent } => {
                if let Some(stats) = stats.as_mut() {
                    stats.loss_percent = *loss_percent;
                }
            }
            LineKind::SummaryRtt(rtt) => {
                if let Some(stats) = stats.as_mut() {
                    stats.min = rtt.min;
                    stats.avg = rtt.avg;
                    stats.max = rtt.max;
                }
            }
            LineKind::Blank | LineKind::Other => {}
        }
        section = section.advance(&kind);
    }

    ParsedProbeResult {
        raw_output: raw_output.to_string(),
        resolved_hostname,
        resolved_address: Some(address.to_string()),
        timings,
        stats,
    }
}
