// Progress/Result Reporter
// Maps supervisor events onto the external progress/result protocol

use std::sync::Arc;

use serde::Serialize;
use tracing::error;

use crate::application::constants::{PROGRESS_EVENT, RESULT_EVENT};
use crate::domain::ProbeOutcome;
use crate::port::EventChannel;

/// Envelope shared by every emitted event
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct MeasurementEvent<'a, T: Serialize> {
    test_id: &'a str,
    measurement_id: &'a str,
    result: T,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ProgressPayload<'a> {
    raw_output: &'a str,
}

/// Emits zero or more progress events followed by exactly one result event
///
/// `result` consumes the reporter, so nothing can be emitted after it.
pub struct ProgressReporter {
    channel: Arc<dyn EventChannel>,
    test_id: String,
    measurement_id: String,
    progress_suppressed: bool,
}

impl ProgressReporter {
    pub fn new(
        channel: Arc<dyn EventChannel>,
        test_id: impl Into<String>,
        measurement_id: impl Into<String>,
    ) -> Self {
        Self {
            channel,
            test_id: test_id.into(),
            measurement_id: measurement_id.into(),
            progress_suppressed: false,
        }
    }

    /// Report the accumulated raw output so far
    pub fn progress(&self, raw_output: &str) {
        if self.progress_suppressed {
            return;
        }
        self.emit(PROGRESS_EVENT, ProgressPayload { raw_output });
    }

    /// Drop every later progress call (used once the probe is aborted)
    pub fn suppress_progress(&mut self) {
        self.progress_suppressed = true;
    }

    /// Report the terminal outcome
    pub fn result(self, outcome: ProbeOutcome) {
        self.emit(RESULT_EVENT, outcome);
    }

    fn emit<T: Serialize>(&self, event_name: &str, result: T) {
        let event = MeasurementEvent {
            test_id: &self.test_id,
            measurement_id: &self.measurement_id,
            result,
        };

        match serde_json::to_value(&event) {
            Ok(payload) => self.channel.emit(event_name, payload),
            Err(e) => error!(
                event = %event_name,
                measurement_id = %self.measurement_id,
                error = %e,
                "Failed to serialize measurement event"
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ParsedProbeResult;
    use crate::port::event_channel::mocks::RecordingEventChannel;
    use serde_json::json;

    #[test]
    fn test_progress_then_result_carry_ids() {
        let channel = Arc::new(RecordingEventChannel::new());
        let reporter = ProgressReporter::new(channel.clone(), "t-1", "m-1");

        reporter.progress("PING a (1.1.1.1)");
        reporter.result(ProbeOutcome::from(ParsedProbeResult::raw_only("done")));

        let events = channel.events();
        assert_eq!(events.len(), 2);
        assert_eq!(
            events[0],
            (
                PROGRESS_EVENT.to_string(),
                json!({
                    "testId": "t-1",
                    "measurementId": "m-1",
                    "result": {"rawOutput": "PING a (1.1.1.1)"}
                })
            )
        );
        assert_eq!(events[1].0, RESULT_EVENT);
        assert_eq!(events[1].1["testId"], "t-1");
        assert_eq!(events[1].1["measurementId"], "m-1");
        assert_eq!(events[1].1["result"]["rawOutput"], "done");
        assert_eq!(events[1].1["result"]["stats"]["loss"], json!(null));
    }

    #[test]
    fn test_suppressed_progress_is_dropped() {
        let channel = Arc::new(RecordingEventChannel::new());
        let mut reporter = ProgressReporter::new(channel.clone(), "t", "m");

        reporter.suppress_progress();
        reporter.progress("late chunk");
        reporter.result(ProbeOutcome::from(ParsedProbeResult::raw_only("x")));

        assert_eq!(channel.event_names(), vec![RESULT_EVENT.to_string()]);
    }
}
