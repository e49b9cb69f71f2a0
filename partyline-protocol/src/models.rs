//! Data models for the party sync wire protocol

use serde::{Deserialize, Serialize};

/// Immutable copy of the shared party state plus the server-clock instant
/// it was produced at.
///
/// `message_id` is the state version: it increases by exactly one per
/// accepted mutation, so clients can detect stale or out-of-order
/// deliveries. `bpm` and `beat_timestamp` are both present or both absent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    /// Shared tempo in beats per minute, or `None` when no tempo is set.
    pub bpm: Option<f64>,
    /// Server-clock instant (Unix ms) of a known beat boundary.
    pub beat_timestamp: Option<i64>,
    /// Monotonically increasing state version.
    pub message_id: u64,
    /// Last-known host liveness flag.
    pub host_connected: bool,
    /// Wall-clock instant (Unix ms) this snapshot was produced.
    pub server_time: i64,
}

impl Snapshot {
    /// True when a tempo (and therefore a beat grid) is currently set.
    pub fn has_tempo(&self) -> bool {
        self.bpm.is_some()
    }
}

/// Edge-triggered host connectivity event, emitted only on transitions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HostEvent {
    pub connected: bool,
}

/// Mutation command posted by the host control surface.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum SyncCommand {
    /// Set the shared tempo; the beat origin becomes the server's "now".
    #[serde(rename = "sync-update")]
    Update { bpm: f64 },

    /// Clear the shared tempo and beat origin together.
    #[serde(rename = "sync-clear")]
    Clear,

    /// Host liveness heartbeat; only transitions are broadcast.
    #[serde(rename = "host-status")]
    HostStatus { connected: bool },
}
