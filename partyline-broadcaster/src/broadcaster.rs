use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, Mutex};
use tokio::task::JoinHandle;

use partyline_protocol::{HostEvent, Snapshot};

use crate::error::{BroadcasterError, Result};
use crate::events::StreamEvent;
use crate::state::StateStore;
use crate::subscriber::{SubscriberChannel, SubscriberSet};

/// Default heartbeat cadence; long enough to stay quiet, short enough to
/// defeat common idle-connection timeouts.
pub const DEFAULT_KEEP_ALIVE: Duration = Duration::from_secs(15);

/// Party state broadcaster for guest clients.
///
/// Holds the authoritative [`StateStore`] and the subscriber channel set
/// behind one lock, so every mutation and its fan-out are a single atomic
/// step: subscribers observe snapshots in version order and readers never
/// see a torn state.
pub struct PartyBroadcaster {
    inner: Arc<Mutex<Inner>>,
    keep_alive: Duration,
    keepalive_task: Arc<Mutex<Option<JoinHandle<()>>>>,
}

struct Inner {
    store: StateStore,
    subscribers: SubscriberSet,
}

impl PartyBroadcaster {
    /// Create a new broadcaster with the default keep-alive cadence.
    pub fn new() -> Self {
        Self::with_keep_alive(DEFAULT_KEEP_ALIVE)
    }

    pub fn with_keep_alive(keep_alive: Duration) -> Self {
        Self {
            inner: Arc::new(Mutex::new(Inner {
                store: StateStore::new(),
                subscribers: SubscriberSet::new(),
            })),
            keep_alive,
            keepalive_task: Arc::new(Mutex::new(None)),
        }
    }

    /// Start the periodic keep-alive task.
    pub async fn start(&self) -> Result<()> {
        let mut task_slot = self.keepalive_task.lock().await;
        if task_slot.is_some() {
            return Err(BroadcasterError::AlreadyRunning);
        }

        let inner = Arc::clone(&self.inner);
        let keep_alive = self.keep_alive;

        let task = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(keep_alive);
            // interval fires immediately; the first heartbeat should not.
            ticker.tick().await;
            loop {
                ticker.tick().await;
                let mut inner = inner.lock().await;
                if !inner.subscribers.is_empty() {
                    inner.subscribers.broadcast(&StreamEvent::KeepAlive);
                }
            }
        });

        *task_slot = Some(task);
        tracing::info!("Party broadcaster started (keep-alive every {:?})", keep_alive);
        Ok(())
    }

    /// Stop the keep-alive task and close every subscriber channel,
    /// ending each guest's stream cleanly.
    pub async fn stop(&self) -> Result<()> {
        let task = self
            .keepalive_task
            .lock()
            .await
            .take()
            .ok_or(BroadcasterError::NotStarted)?;
        task.abort();

        let mut inner = self.inner.lock().await;
        let dropped = inner.subscribers.len();
        inner.subscribers.clear();

        tracing::info!("Party broadcaster stopped ({} subscribers closed)", dropped);
        Ok(())
    }

    /// Register a new subscriber. The current snapshot is queued as the
    /// channel's first event, so a guest joining mid-party is never stale.
    pub async fn subscribe(&self) -> mpsc::UnboundedReceiver<StreamEvent> {
        let mut inner = self.inner.lock().await;
        let catch_up = StreamEvent::State(inner.store.snapshot(Self::now_ms()));
        let (channel, rx) = SubscriberChannel::create(inner.subscribers.allocate_id());
        // rx is held right here, so the catch-up send cannot fail.
        let _ = channel.send(catch_up);
        inner.subscribers.push(channel);
        rx
    }

    /// Set the shared tempo and broadcast the resulting snapshot.
    pub async fn set_tempo(&self, bpm: f64) -> Result<Snapshot> {
        let mut inner = self.inner.lock().await;
        let snapshot = inner.store.set_tempo(bpm, Self::now_ms())?;
        inner.subscribers.broadcast(&StreamEvent::State(snapshot.clone()));
        tracing::info!("Tempo set to {:.2} BPM (version {})", bpm, snapshot.message_id);
        Ok(snapshot)
    }

    /// Clear the shared tempo and broadcast the resulting snapshot.
    pub async fn clear_tempo(&self) -> Snapshot {
        let mut inner = self.inner.lock().await;
        let snapshot = inner.store.clear_tempo(Self::now_ms());
        inner.subscribers.broadcast(&StreamEvent::State(snapshot.clone()));
        tracing::info!("Tempo cleared (version {})", snapshot.message_id);
        snapshot
    }

    /// Update host liveness. Broadcasts an edge-triggered `host` event and
    /// returns the new snapshot only when the flag actually changed.
    pub async fn set_host_connected(&self, connected: bool) -> Option<Snapshot> {
        let mut inner = self.inner.lock().await;
        let snapshot = inner.store.set_host_connected(connected, Self::now_ms())?;
        inner
            .subscribers
            .broadcast(&StreamEvent::Host(HostEvent { connected }));
        tracing::info!("Host {}", if connected { "connected" } else { "disconnected" });
        Some(snapshot)
    }

    /// Point-in-time snapshot read; never blocks on subscriber IO.
    pub async fn snapshot(&self) -> Snapshot {
        let inner = self.inner.lock().await;
        inner.store.snapshot(Self::now_ms())
    }

    /// Current number of live subscriber channels.
    pub async fn subscriber_count(&self) -> usize {
        self.inner.lock().await.subscribers.len()
    }

    fn now_ms() -> i64 {
        chrono::Utc::now().timestamp_millis()
    }
}

impl Default for PartyBroadcaster {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for PartyBroadcaster {
    fn drop(&mut self) {
        if let Ok(mut task_slot) = self.keepalive_task.try_lock() {
            if let Some(task) = task_slot.take() {
                task.abort();
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_broadcaster_create() {
        let broadcaster = PartyBroadcaster::new();
        assert_eq!(broadcaster.subscriber_count().await, 0);
        let snapshot = broadcaster.snapshot().await;
        assert_eq!(snapshot.message_id, 0);
        assert_eq!(snapshot.bpm, None);
    }

    #[tokio::test]
    async fn test_subscribe_receives_current_snapshot_first() {
        let broadcaster = PartyBroadcaster::new();
        broadcaster.set_tempo(132.0).await.unwrap();

        let mut rx = broadcaster.subscribe().await;
        let first = rx.recv().await.unwrap();
        match first {
            StreamEvent::State(snapshot) => {
                assert_eq!(snapshot.bpm, Some(132.0));
                assert_eq!(snapshot.message_id, 1);
            }
            other => panic!("expected state event, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_lifecycle_guards() {
        let broadcaster = PartyBroadcaster::with_keep_alive(Duration::from_secs(60));
        assert!(matches!(
            broadcaster.stop().await,
            Err(BroadcasterError::NotStarted)
        ));
        broadcaster.start().await.unwrap();
        assert!(matches!(
            broadcaster.start().await,
            Err(BroadcasterError::AlreadyRunning)
        ));
        broadcaster.stop().await.unwrap();
    }

    #[tokio::test]
    async fn test_invalid_tempo_broadcasts_nothing() {
        let broadcaster = PartyBroadcaster::new();
        let mut rx = broadcaster.subscribe().await;
        let _ = rx.recv().await.unwrap(); // catch-up snapshot

        assert!(broadcaster.set_tempo(f64::NAN).await.is_err());
        assert!(rx.try_recv().is_err());
    }
}
