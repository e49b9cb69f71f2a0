//! Authoritative party state and its mutation rules
//!
//! The store is pure data: the current server time is always passed in as
//! an explicit millisecond argument, so every rule can be exercised in
//! tests without a real clock.

use partyline_protocol::Snapshot;

use crate::error::{BroadcasterError, Result};

/// Single authoritative copy of the shared party state.
///
/// Invariants:
/// - `bpm` and `beat_origin_ms` are both present or both absent;
/// - `version` increases by exactly one per accepted mutation and is
///   never reused.
#[derive(Debug)]
pub struct StateStore {
    bpm: Option<f64>,
    beat_origin_ms: Option<i64>,
    version: u64,
    host_connected: bool,
}

impl StateStore {
    pub fn new() -> Self {
        Self {
            bpm: None,
            beat_origin_ms: None,
            version: 0,
            host_connected: false,
        }
    }

    /// Set the shared tempo. The beat origin becomes `now_ms`, marking a
    /// beat boundary on the server clock.
    ///
    /// Rejects non-finite or non-positive BPM values without touching the
    /// state.
    pub fn set_tempo(&mut self, bpm: f64, now_ms: i64) -> Result<Snapshot> {
        if !bpm.is_finite() || bpm <= 0.0 {
            return Err(BroadcasterError::InvalidBpm(bpm));
        }
        self.bpm = Some(bpm);
        self.beat_origin_ms = Some(now_ms);
        self.version += 1;
        Ok(self.snapshot(now_ms))
    }

    /// Clear the tempo and beat origin together.
    pub fn clear_tempo(&mut self, now_ms: i64) -> Snapshot {
        self.bpm = None;
        self.beat_origin_ms = None;
        self.version += 1;
        self.snapshot(now_ms)
    }

    /// Update the host liveness flag. Edge-triggered: returns a snapshot
    /// only when the flag actually changed, so redundant heartbeats
    /// produce no version bump and no broadcast.
    pub fn set_host_connected(&mut self, connected: bool, now_ms: i64) -> Option<Snapshot> {
        if self.host_connected == connected {
            return None;
        }
        self.host_connected = connected;
        self.version += 1;
        Some(self.snapshot(now_ms))
    }

    /// Read-only point-in-time snapshot stamped with `now_ms`.
    pub fn snapshot(&self, now_ms: i64) -> Snapshot {
        Snapshot {
            bpm: self.bpm,
            beat_timestamp: self.beat_origin_ms,
            message_id: self.version,
            host_connected: self.host_connected,
            server_time: now_ms,
        }
    }
}

impl Default for StateStore {
    fn default() -> Self {
        Self::new()
    }
}
