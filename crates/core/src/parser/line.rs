// Line classification and per-line extraction for ping output
//
// Every function here is total: malformed input yields `None` (or an
// all-`None` value), never an error.

use crate::domain::TimingSample;

/// min/avg/max from the rtt summary line
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct RttSummary {
    pub min: Option<f64>,
    pub avg: Option<f64>,
    pub max: Option<f64>,
}

/// Where the classifier currently is in the output
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Section {
    Replies,
    /// Next line is the packet summary
    PacketSummary,
    /// Next line is the rtt summary
    RttSummary,
    Trailer,
}

#[derive(Debug, Clone, PartialEq)]
pub enum LineKind {
    Reply(TimingSample),
    Blank,
    SummaryMarker,
    SummaryPackets { loss_percent: Option<f64> },
    SummaryRtt(RttSummary),
    Other,
}

impl Section {
    /// Section that follows a line of `kind`
    pub fn advance(self, kind: &LineKind) -> Section {
        match (self, kind) {
            (Section::Replies, LineKind::SummaryMarker) => Section::PacketSummary,
            (Section::PacketSummary, _) => Section::RttSummary,
            (Section::RttSummary, _) => Section::Trailer,
            (section, _) => section,
        }
    }
}

/// Classify a non-header line given the current section
pub fn classify(line: &str, section: Section) -> LineKind {
    match section {
        Section::PacketSummary => LineKind::SummaryPackets {
            loss_percent: parse_packet_loss(line),
        },
        Section::RttSummary => LineKind::SummaryRtt(parse_rtt_summary(line)),
        Section::Replies | Section::Trailer => {
            if line.trim().is_empty() {
                LineKind::Blank
            } else if section == Section::Replies && is_summary_marker(line) {
                LineKind::SummaryMarker
            } else if let Some(sample) = parse_reply(line) {
                LineKind::Reply(sample)
            } else {
                LineKind::Other
            }
        }
    }
}

/// Address from the `PING <host> (<address>)...` header
pub fn parse_header(line: &str) -> Option<&str> {
    let rest = line.strip_prefix("PING")?;
    let rest = rest.strip_prefix(|c: char| c.is_whitespace())?;

    for (open, _) in rest.match_indices('(') {
        let before = &rest[..open];
        let Some(separator) = before.chars().next_back() else {
            continue;
        };
        if !separator.is_whitespace() {
            continue;
        }

        let after = &rest[open + 1..];
        let close = after.find(')')?;
        if close == 0 {
            continue;
        }

        return Some(&after[..close]);
    }

    None
}

/// Token right after `from` on the first reply line, up to the next whitespace
pub fn parse_resolved_hostname(line: &str) -> Option<&str> {
    for (idx, keyword) in line.match_indices("from") {
        let rest = &line[idx + keyword.len()..];
        let Some(separator) = rest.chars().next() else {
            continue;
        };
        if !separator.is_whitespace() {
            continue;
        }

        let rest = &rest[separator.len_utf8()..];
        let end = rest.find(char::is_whitespace)?;
        return Some(&rest[..end]).filter(|token| !token.is_empty());
    }

    None
}

/// `<n> bytes from <peer>: [icmp_]seq=<n> ttl=<ttl> time=<ms> ms`
pub fn parse_reply(line: &str) -> Option<TimingSample> {
    let (count, rest) = line.split_once(' ')?;
    parse_integer(count)?;
    let rest = rest.strip_prefix("bytes from ")?;

    let (_, after_seq) = keyed_token(rest, "seq=").or_else(|| keyed_token(rest, "icmp_seq="))?;
    let (ttl, _) = keyed_token(after_seq, "ttl=")?;
    let (time, after_time) = keyed_token(after_seq, "time=")?;
    if !after_time.starts_with(" ms") {
        return None;
    }

    Some(TimingSample {
        ttl: parse_integer(ttl)?,
        round_trip_ms: parse_decimal(time)?,
    })
}

/// `--- <name> statistics ---`
pub fn is_summary_marker(line: &str) -> bool {
    line.starts_with("--- ") && line.contains(" statistics ---")
}

/// Percentage right before `% packet loss`
pub fn parse_packet_loss(line: &str) -> Option<f64> {
    let idx = line.find("% packet loss")?;
    let token = line[..idx]
        .rsplit(|c: char| c.is_whitespace() || c == ',')
        .next()?;
    parse_decimal(token)
}

/// `round-trip|rtt <labels> = <min>/<avg>/<max>[/<dev>] ms`
pub fn parse_rtt_summary(line: &str) -> RttSummary {
    let rest = line
        .strip_prefix("round-trip")
        .or_else(|| line.strip_prefix("rtt"))
        .filter(|rest| rest.starts_with(char::is_whitespace));
    let Some((_, values)) = rest.and_then(|rest| rest.split_once('=')) else {
        return RttSummary::default();
    };

    let token = values.split_whitespace().next().unwrap_or_default();
    let mut parts = token.split('/').map(parse_decimal);

    RttSummary {
        min: parts.next().flatten(),
        avg: parts.next().flatten(),
        max: parts.next().flatten(),
    }
}

/// Value of a `key=value` token that starts at a word boundary,
/// plus the remainder of the line after the value
fn keyed_token<'a>(line: &'a str, key: &str) -> Option<(&'a str, &'a str)> {
    let (idx, _) = line
        .match_indices(key)
        .find(|(idx, _)| *idx == 0 || line[..*idx].ends_with(char::is_whitespace))?;
    let value = &line[idx + key.len()..];
    let end = value.find(char::is_whitespace).unwrap_or(value.len());
    Some((&value[..end], &value[end..]))
}

fn parse_integer(token: &str) -> Option<u32> {
    if token.is_empty() || !token.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    token.parse().ok()
}

// Plain decimal only: rejects signs, exponents, "inf" and "NaN"
fn parse_decimal(token: &str) -> Option<f64> {
    let well_formed = token.bytes().any(|b| b.is_ascii_digit())
        && token.bytes().all(|b| b.is_ascii_digit() || b == b'.');
    if !well_formed {
        return None;
    }
    token.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_header_bsd_and_linux() {
        assert_eq!(
            parse_header("PING google.com (142.250.75.14): 56 data bytes"),
            Some("142.250.75.14")
        );
        assert_eq!(
            parse_header("PING example.org (93.184.216.34) 56(84) bytes of data."),
            Some("93.184.216.34")
        );
        // Parentheses inside the host name are skipped
        assert_eq!(
            parse_header("PING odd(name) (10.0.0.1): 56 data bytes"),
            Some("10.0.0.1")
        );
    }

    #[test]
    fn test_header_rejects_other_lines() {
        assert_eq!(parse_header("ping: cannot resolve nowhere: Unknown host"), None);
        assert_eq!(parse_header("PING nowhere"), None);
        assert_eq!(parse_header("PING host ()"), None);
        assert_eq!(parse_header(""), None);
    }

    #[test]
    fn test_reply_linux_with_reverse_dns() {
        let line = "64 bytes from lhr25s34-in-f14.1e100.net (142.250.75.14): icmp_seq=1 ttl=117 time=16.8 ms";
        assert_eq!(
            parse_reply(line),
            Some(TimingSample {
                ttl: 117,
                round_trip_ms: 16.8
            })
        );
    }

    #[test]
    fn test_reply_bsd() {
        let line = "64 bytes from 142.250.75.14: icmp_seq=0 ttl=117 time=16.807 ms";
        assert_eq!(
            parse_reply(line),
            Some(TimingSample {
                ttl: 117,
                round_trip_ms: 16.807
            })
        );
        let busybox = "64 bytes from 10.0.0.1: seq=3 ttl=64 time=0.412 ms";
        assert_eq!(parse_reply(busybox).map(|s| s.ttl), Some(64));
    }

    #[test]
    fn test_reply_rejects_non_replies() {
        assert_eq!(parse_reply("Request timeout for icmp_seq 4"), None);
        assert_eq!(
            parse_reply("From 10.0.0.1 icmp_seq=1 Destination Host Unreachable"),
            None
        );
        assert_eq!(
            parse_reply("64 bytes from 1.1.1.1: icmp_seq=1 ttl=x time=3.1 ms"),
            None
        );
        assert_eq!(
            parse_reply("64 bytes from 1.1.1.1: icmp_seq=1 ttl=55 time=3.1"),
            None
        );
    }

    #[test]
    fn test_resolved_hostname_is_next_token() {
        assert_eq!(
            parse_resolved_hostname("64 bytes from 142.250.75.14: icmp_seq=0 ttl=117"),
            Some("142.250.75.14:")
        );
        assert_eq!(
            parse_resolved_hostname("64 bytes from dns.google (8.8.8.8): icmp_seq=1"),
            Some("dns.google")
        );
        assert_eq!(parse_resolved_hostname("Request timeout for icmp_seq 0"), None);
        assert_eq!(parse_resolved_hostname("64 bytes from host"), None);
    }

    #[test]
    fn test_packet_loss() {
        assert_eq!(
            parse_packet_loss("1 packets transmitted, 1 packets received, 0.0% packet loss"),
            Some(0.0)
        );
        assert_eq!(
            parse_packet_loss("4 packets transmitted, 3 received, 25% packet loss, time 3004ms"),
            Some(25.0)
        );
        assert_eq!(parse_packet_loss("3 packets transmitted, 0 received"), None);
        assert_eq!(parse_packet_loss("x, abc% packet loss"), None);
    }

    #[test]
    fn test_rtt_summary() {
        assert_eq!(
            parse_rtt_summary("round-trip min/avg/max/stddev = 15.885/17.207/20.132/1.202 ms"),
            RttSummary {
                min: Some(15.885),
                avg: Some(17.207),
                max: Some(20.132)
            }
        );
        assert_eq!(
            parse_rtt_summary("rtt min/avg/max/mdev = 0.041/0.052/0.066/0.010 ms"),
            RttSummary {
                min: Some(0.041),
                avg: Some(0.052),
                max: Some(0.066)
            }
        );
    }

    #[test]
    fn test_rtt_summary_degrades_per_field() {
        assert_eq!(
            parse_rtt_summary("rtt min/avg/max/mdev = 1.5/oops/2.5/0.1 ms"),
            RttSummary {
                min: Some(1.5),
                avg: None,
                max: Some(2.5)
            }
        );
        assert_eq!(
            parse_rtt_summary("rtt min/avg/max/mdev = inf/NaN/-1 ms"),
            RttSummary::default()
        );
        assert_eq!(parse_rtt_summary("no summary here"), RttSummary::default());
        assert_eq!(parse_rtt_summary("rttx = 1/2/3"), RttSummary::default());
    }

    #[test]
    fn test_section_walk() {
        let mut section = Section::Replies;
        for kind in [
            LineKind::Blank,
            LineKind::SummaryMarker,
            LineKind::SummaryPackets { loss_percent: None },
            LineKind::SummaryRtt(RttSummary::default()),
        ] {
            section = section.advance(&kind);
        }
        assert_eq!(section, Section::Trailer);
    }

    #[test]
    fn test_classify_summary_slots() {
        assert_eq!(
            classify("--- a statistics ---", Section::Replies),
            LineKind::SummaryMarker
        );
        assert_eq!(
            classify("", Section::PacketSummary),
            LineKind::SummaryPackets { loss_percent: None }
        );
        assert_eq!(classify("   ", Section::Replies), LineKind::Blank);
        assert_eq!(
            classify("--- a statistics ---", Section::Trailer),
            LineKind::Other
        );
    }
}
