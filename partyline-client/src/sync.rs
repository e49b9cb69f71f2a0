//! Clock-offset estimation and per-guest sync state

use partyline_protocol::{HostEvent, Snapshot};

use crate::align;

/// Estimates the offset between the local clock and the server clock from
/// received snapshots.
///
/// `offset_ms` approximates (server clock − local clock) at receipt time.
/// One-way push latency is accepted as noise; the estimate is refreshed on
/// every snapshot, so drift self-corrects without a resync protocol.
#[derive(Debug, Default)]
pub struct ClockSync {
    offset_ms: Option<i64>,
}

impl ClockSync {
    pub fn new() -> Self {
        Self { offset_ms: None }
    }

    /// Fold in a snapshot's server timestamp, observed at `local_now_ms`.
    pub fn observe(&mut self, server_time_ms: i64, local_now_ms: i64) {
        self.offset_ms = Some(server_time_ms - local_now_ms);
    }

    /// Current offset estimate, or `None` before the first snapshot.
    pub fn offset_ms(&self) -> Option<i64> {
        self.offset_ms
    }
}

/// Per-guest view of the party: last-received snapshot, clock offset, and
/// local receipt time.
///
/// Ephemeral by design — discard and rebuild on reconnect; the first
/// snapshot of the new subscription repopulates everything.
#[derive(Debug, Default)]
pub struct SyncTracker {
    snapshot: Option<Snapshot>,
    clock: ClockSync,
    last_received_ms: Option<i64>,
}

impl SyncTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply a received snapshot. Returns `false` (and changes nothing)
    /// when the snapshot's version is older than the one already held,
    /// which can happen briefly around a reconnect.
    pub fn apply_snapshot(&mut self, snapshot: Snapshot, local_now_ms: i64) -> bool {
        if let Some(current) = &self.snapshot {
            if snapshot.message_id < current.message_id {
                tracing::debug!(
                    "Ignoring stale snapshot {} (have {})",
                    snapshot.message_id,
                    current.message_id
                );
                return false;
            }
        }
        self.clock.observe(snapshot.server_time, local_now_ms);
        self.last_received_ms = Some(local_now_ms);
        self.snapshot = Some(snapshot);
        true
    }

    /// Fold an edge-triggered host connectivity event into the held state.
    pub fn apply_host_event(&mut self, event: HostEvent) {
        if let Some(snapshot) = &mut self.snapshot {
            snapshot.host_connected = event.connected;
        }
    }

    pub fn snapshot(&self) -> Option<&Snapshot> {
        self.snapshot.as_ref()
    }

    pub fn offset_ms(&self) -> Option<i64> {
        self.clock.offset_ms()
    }

    /// Local timestamp of the last applied snapshot.
    pub fn last_received_ms(&self) -> Option<i64> {
        self.last_received_ms
    }

    pub fn host_connected(&self) -> bool {
        self.snapshot.as_ref().is_some_and(|s| s.host_connected)
    }

    /// Phase-correct playback delay for "now", or `None` while no tempo
    /// or no clock offset is available ("no estimate", not a fault).
    pub fn recommended_delay_ms(&self, local_now_ms: i64) -> Option<f64> {
        let snapshot = self.snapshot.as_ref()?;
        let (bpm, beat_origin_ms) = snapshot.bpm.zip(snapshot.beat_timestamp)?;
        let offset_ms = self.clock.offset_ms()?;
        Some(align::recommended_delay_ms(
            bpm,
            beat_origin_ms,
            offset_ms,
            local_now_ms,
        ))
    }
}
