//! Sync gateway: validates wire commands and applies them to the party state
//!
//! The gateway is the only mutation path into the broadcaster. Mutations
//! are serialized by the broadcaster's internal lock; snapshot reads and
//! subscriptions proceed concurrently and never observe a torn state.

use std::sync::Arc;

use thiserror::Error;
use tokio::sync::mpsc;

use partyline_broadcaster::{BroadcasterError, PartyBroadcaster, StreamEvent};
use partyline_protocol::{Snapshot, SyncCommand};

#[derive(Error, Debug)]
pub enum GatewayError {
    /// Malformed mutation body (unparseable JSON or unknown command).
    #[error("Invalid request: {0}")]
    InvalidRequest(#[from] serde_json::Error),

    /// Well-formed command carrying a semantically invalid value.
    #[error("Invalid value: {0}")]
    InvalidValue(#[from] BroadcasterError),
}

pub struct SyncGateway {
    broadcaster: Arc<PartyBroadcaster>,
}

impl SyncGateway {
    pub fn new(broadcaster: Arc<PartyBroadcaster>) -> Self {
        Self { broadcaster }
    }

    /// Parse a raw mutation body into a command.
    pub fn parse(body: &[u8]) -> Result<SyncCommand, GatewayError> {
        Ok(serde_json::from_slice(body)?)
    }

    /// Apply a command. Returns the snapshot the broadcaster published, or
    /// `None` when the command was a redundant host heartbeat (accepted,
    /// nothing changed, nothing broadcast).
    pub async fn apply(&self, command: SyncCommand) -> Result<Option<Snapshot>, GatewayError> {
        match command {
            SyncCommand::Update { bpm } => Ok(Some(self.broadcaster.set_tempo(bpm).await?)),
            SyncCommand::Clear => Ok(Some(self.broadcaster.clear_tempo().await)),
            SyncCommand::HostStatus { connected } => {
                Ok(self.broadcaster.set_host_connected(connected).await)
            }
        }
    }

    /// Register a subscriber channel; its first event is the current
    /// snapshot.
    pub async fn subscribe(&self) -> mpsc::UnboundedReceiver<StreamEvent> {
        self.broadcaster.subscribe().await
    }

    /// Point-in-time snapshot read.
    pub async fn snapshot(&self) -> Snapshot {
        self.broadcaster.snapshot().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gateway() -> SyncGateway {
        SyncGateway::new(Arc::new(PartyBroadcaster::new()))
    }

    #[test]
    fn test_parse_rejects_malformed_body() {
        assert!(matches!(
            SyncGateway::parse(b"not json"),
            Err(GatewayError::InvalidRequest(_))
        ));
        assert!(matches!(
            SyncGateway::parse(br#"{"type":"sync-reverse"}"#),
            Err(GatewayError::InvalidRequest(_))
        ));
    }

    #[tokio::test]
    async fn test_update_applies_and_returns_snapshot() {
        let gateway = gateway();
        let command = SyncGateway::parse(br#"{"type":"sync-update","bpm":126.0}"#).unwrap();
        let snapshot = gateway.apply(command).await.unwrap().unwrap();
        assert_eq!(snapshot.bpm, Some(126.0));
        assert_eq!(snapshot.message_id, 1);
    }

    #[tokio::test]
    async fn test_invalid_bpm_maps_to_invalid_value() {
        let gateway = gateway();
        let result = gateway.apply(SyncCommand::Update { bpm: -5.0 }).await;
        assert!(matches!(result, Err(GatewayError::InvalidValue(_))));
        assert_eq!(gateway.snapshot().await.message_id, 0);
    }

    #[tokio::test]
    async fn test_redundant_host_status_is_accepted_but_silent() {
        let gateway = gateway();
        let first = gateway
            .apply(SyncCommand::HostStatus { connected: true })
            .await
            .unwrap();
        assert!(first.is_some());

        let repeat = gateway
            .apply(SyncCommand::HostStatus { connected: true })
            .await
            .unwrap();
        assert!(repeat.is_none());
    }

    #[tokio::test]
    async fn test_clear_after_update() {
        let gateway = gateway();
        gateway
            .apply(SyncCommand::Update { bpm: 140.0 })
            .await
            .unwrap();
        let snapshot = gateway.apply(SyncCommand::Clear).await.unwrap().unwrap();
        assert_eq!(snapshot.bpm, None);
        assert_eq!(snapshot.beat_timestamp, None);
        assert_eq!(snapshot.message_id, 2);
    }
}
