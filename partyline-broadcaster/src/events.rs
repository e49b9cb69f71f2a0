//! Events pushed to subscriber channels

use partyline_protocol::{HostEvent, Snapshot, EVENT_HOST, EVENT_STATE};

/// A single message on a subscriber channel.
///
/// `State` carries a whole-state replacement, `Host` the edge-triggered
/// connectivity transition, and `KeepAlive` a no-op heartbeat that exists
/// only to defeat idle-connection timeouts in intermediary equipment.
#[derive(Debug, Clone)]
pub enum StreamEvent {
    State(Snapshot),
    Host(HostEvent),
    KeepAlive,
}

impl StreamEvent {
    /// Named-event label on the wire, or `None` for the heartbeat (sent as
    /// an SSE comment).
    pub fn name(&self) -> Option<&'static str> {
        match self {
            StreamEvent::State(_) => Some(EVENT_STATE),
            StreamEvent::Host(_) => Some(EVENT_HOST),
            StreamEvent::KeepAlive => None,
        }
    }

    /// JSON payload for named events; `None` for the heartbeat.
    pub fn payload_json(&self) -> serde_json::Result<Option<String>> {
        Ok(match self {
            StreamEvent::State(snapshot) => Some(serde_json::to_string(snapshot)?),
            StreamEvent::Host(event) => Some(serde_json::to_string(event)?),
            StreamEvent::KeepAlive => None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_state_event_serialization() {
        let event = StreamEvent::State(Snapshot {
            bpm: Some(120.0),
            beat_timestamp: Some(1_000),
            message_id: 3,
            host_connected: true,
            server_time: 2_000,
        });
        assert_eq!(event.name(), Some("state"));
        let payload = event.payload_json().unwrap().unwrap();
        assert!(payload.contains("\"messageId\":3"));
        assert!(payload.contains("\"beatTimestamp\":1000"));
    }

    #[test]
    fn test_host_event_serialization() {
        let event = StreamEvent::Host(HostEvent { connected: false });
        assert_eq!(event.name(), Some("host"));
        let payload = event.payload_json().unwrap().unwrap();
        assert_eq!(payload, r#"{"connected":false}"#);
    }

    #[test]
    fn test_keep_alive_has_no_payload() {
        let event = StreamEvent::KeepAlive;
        assert_eq!(event.name(), None);
        assert!(event.payload_json().unwrap().is_none());
    }
}
