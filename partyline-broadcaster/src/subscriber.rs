//! Subscriber channel registry

use tokio::sync::mpsc;

use crate::events::StreamEvent;

/// One connected guest: an open output sink and nothing else.
///
/// The sender side is unbounded, so a publish never blocks on a slow
/// consumer; a guest that stops draining its stream is detected on the
/// next failed send and dropped.
pub struct SubscriberChannel {
    id: u64,
    tx: mpsc::UnboundedSender<StreamEvent>,
}

impl SubscriberChannel {
    /// Create a channel with its receiving end.
    pub fn create(id: u64) -> (Self, mpsc::UnboundedReceiver<StreamEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { id, tx }, rx)
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    /// Queue an event for this subscriber. Fails once the receiving side
    /// has been dropped (client disconnected).
    pub fn send(
        &self,
        event: StreamEvent,
    ) -> std::result::Result<(), mpsc::error::SendError<StreamEvent>> {
        self.tx.send(event)
    }
}

/// The set of live subscriber channels, owned by the broadcaster.
pub struct SubscriberSet {
    channels: Vec<SubscriberChannel>,
    next_id: u64,
}

impl SubscriberSet {
    pub fn new() -> Self {
        Self {
            channels: Vec::new(),
            next_id: 0,
        }
    }

    /// Hand out the next subscriber id.
    pub fn allocate_id(&mut self) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    /// Register a channel (after any catch-up data has been queued on it).
    pub fn push(&mut self, channel: SubscriberChannel) {
        let id = channel.id();
        self.channels.push(channel);
        tracing::info!("Subscriber {} connected. Total: {}", id, self.channels.len());
    }

    /// Write `event` to every live channel, removing any channel whose
    /// write fails. Removal is silent toward the publisher and the other
    /// subscribers.
    pub fn broadcast(&mut self, event: &StreamEvent) {
        let mut dead_indices = Vec::new();

        for (idx, channel) in self.channels.iter().enumerate() {
            if channel.send(event.clone()).is_err() {
                tracing::debug!("Write to subscriber {} failed", channel.id);
                dead_indices.push(idx);
            }
        }

        // Remove dead channels in reverse order
        for idx in dead_indices.iter().rev() {
            let channel = self.channels.remove(*idx);
            tracing::info!(
                "Removed subscriber {}. Remaining: {}",
                channel.id,
                self.channels.len()
            );
        }
    }

    /// Drop every channel, ending each subscriber's stream.
    pub fn clear(&mut self) {
        self.channels.clear();
    }

    pub fn len(&self) -> usize {
        self.channels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.channels.is_empty()
    }
}

impl Default for SubscriberSet {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn add(set: &mut SubscriberSet) -> mpsc::UnboundedReceiver<StreamEvent> {
        let id = set.allocate_id();
        let (channel, rx) = SubscriberChannel::create(id);
        set.push(channel);
        rx
    }

    #[test]
    fn test_broadcast_removes_dead_channel_only() {
        let mut set = SubscriberSet::new();
        let mut rx_a = add(&mut set);
        let rx_b = add(&mut set);
        drop(rx_b);

        set.broadcast(&StreamEvent::KeepAlive);
        assert_eq!(set.len(), 1);

        // The live channel received the event untouched by the removal.
        assert!(matches!(rx_a.try_recv(), Ok(StreamEvent::KeepAlive)));
    }

    #[test]
    fn test_clear_ends_streams() {
        let mut set = SubscriberSet::new();
        let mut rx = add(&mut set);
        set.clear();
        assert!(set.is_empty());
        assert!(matches!(
            rx.try_recv(),
            Err(mpsc::error::TryRecvError::Disconnected)
        ));
    }
}
