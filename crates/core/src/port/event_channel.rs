// Event Channel Port
// Outbound transport for progress/result events (socket, stream, queue...)

/// Fire-and-forget event sink
///
/// Events emitted through one channel for one probe must be delivered in
/// emission order.
pub trait EventChannel: Send + Sync {
    fn emit(&self, event_name: &str, payload: serde_json::Value);
}

// ============================================================================
// Mock Implementations for Testing
// ============================================================================

pub mod mocks {
    use super::*;
    use std::sync::Mutex;

    /// Records every emitted event in order
    #[derive(Debug, Default)]
    pub struct RecordingEventChannel {
        events: Mutex<Vec<(String, serde_json::Value)>>,
    }

    impl RecordingEventChannel {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn events(&self) -> Vec<(String, serde_json::Value)> {
            self.events.lock().unwrap().clone()
        }

        pub fn event_names(&self) -> Vec<String> {
            self.events().into_iter().map(|(name, _)| name).collect()
        }
    }

    impl EventChannel for RecordingEventChannel {
        fn emit(&self, event_name: &str, payload: serde_json::Value) {
            self.events
                .lock()
                .unwrap()
                .push((event_name.to_string(), payload));
        }
    }
}
