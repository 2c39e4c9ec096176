// Probe Options - validated, immutable input of one ping invocation

use serde::Deserialize;

use crate::domain::error::{DomainError, Result};

/// Default number of echo requests
pub const DEFAULT_PACKET_COUNT: u8 = 3;

/// Inclusive bounds for the packet count
pub const MIN_PACKET_COUNT: u8 = 1;
pub const MAX_PACKET_COUNT: u8 = 16;

/// Command type accepted in the raw options payload
pub const PING_COMMAND_TYPE: &str = "ping";

/// Options for a single ping probe.
///
/// Construct through [`ProbeOptions::new`] or [`ProbeOptions::from_value`];
/// both enforce a non-empty target and a packet count within
/// `MIN_PACKET_COUNT..=MAX_PACKET_COUNT`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeOptions {
    target: String,
    packet_count: u8,
}

/// Wire shape of the options as sent by the caller
#[derive(Debug, Deserialize)]
struct RawPingOptions {
    #[serde(rename = "type")]
    kind: Option<String>,
    target: Option<String>,
    packets: Option<i64>,
}

impl ProbeOptions {
    pub fn new(target: impl Into<String>, packet_count: u8) -> Result<Self> {
        let target = target.into();
        if target.trim().is_empty() {
            return Err(DomainError::ValidationError(
                "target must be a non-empty hostname or IP address".to_string(),
            ));
        }
        if !(MIN_PACKET_COUNT..=MAX_PACKET_COUNT).contains(&packet_count) {
            return Err(DomainError::ValidationError(format!(
                "packets must be between {} and {}, got {}",
                MIN_PACKET_COUNT, MAX_PACKET_COUNT, packet_count
            )));
        }
        Ok(Self {
            target,
            packet_count,
        })
    }

    /// Validate caller-supplied JSON options
    ///
    /// Accepts `{ "type"?: "ping", "target": string, "packets"?: 1..=16 }`.
    /// A missing `packets` falls back to [`DEFAULT_PACKET_COUNT`].
    pub fn from_value(value: &serde_json::Value) -> Result<Self> {
        let raw: RawPingOptions = serde_json::from_value(value.clone())
            .map_err(|e| DomainError::ValidationError(e.to_string()))?;

        if let Some(kind) = raw.kind.as_deref() {
            if kind != PING_COMMAND_TYPE {
                return Err(DomainError::ValidationError(format!(
                    "type must be '{}', got '{}'",
                    PING_COMMAND_TYPE, kind
                )));
            }
        }

        let target = raw
            .target
            .ok_or_else(|| DomainError::ValidationError("target is required".to_string()))?;

        let packet_count = match raw.packets {
            None => DEFAULT_PACKET_COUNT,
            Some(n) => u8::try_from(n)
                .ok()
                .filter(|n| (MIN_PACKET_COUNT..=MAX_PACKET_COUNT).contains(n))
                .ok_or_else(|| {
                    DomainError::ValidationError(format!(
                        "packets must be between {} and {}, got {}",
                        MIN_PACKET_COUNT, MAX_PACKET_COUNT, n
                    ))
                })?,
        };

        Self::new(target, packet_count)
    }

    pub fn target(&self) -> &str {
        &self.target
    }

    pub fn packet_count(&self) -> u8 {
        self.packet_count
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_defaults_packet_count() {
        let options = ProbeOptions::from_value(&json!({"type": "ping", "target": "example.com"}))
            .unwrap();

        assert_eq!(options.target(), "example.com");
        assert_eq!(options.packet_count(), DEFAULT_PACKET_COUNT);
    }

    #[test]
    fn test_accepts_bounds() {
        tokio_test::assert_ok!(ProbeOptions::from_value(&json!({"target": "a", "packets": 1})));
        tokio_test::assert_ok!(ProbeOptions::from_value(&json!({"target": "a", "packets": 16})));
    }

    #[test]
    fn test_rejects_out_of_range_packets() {
        for packets in [0, 17, -1, 300] {
            let result = ProbeOptions::from_value(&json!({"target": "a", "packets": packets}));
            assert!(
                matches!(result, Err(DomainError::ValidationError(_))),
                "packets={} should be rejected",
                packets
            );
        }
    }

    #[test]
    fn test_rejects_missing_or_empty_target() {
        assert!(ProbeOptions::from_value(&json!({"packets": 2})).is_err());
        assert!(ProbeOptions::from_value(&json!({"target": "  "})).is_err());
        assert!(ProbeOptions::new("", 3).is_err());
    }

    #[test]
    fn test_rejects_other_command_type() {
        let result = ProbeOptions::from_value(&json!({"type": "traceroute", "target": "a"}));
        assert!(result.is_err());
    }

    #[test]
    fn test_rejects_non_integer_packets() {
        let result = ProbeOptions::from_value(&json!({"target": "a", "packets": "three"}));
        tokio_test::assert_err!(result);
    }
}
