//! Party state broadcaster for Partyline guests
//!
//! This crate holds the authoritative party state (tempo, beat origin,
//! host connectivity, version) and fans every accepted mutation out to all
//! subscribed guest channels as whole-state snapshots. State lives in
//! memory only and resets on restart.
//!
//! # Features
//!
//! - Single-writer mutation path: version increments and broadcasts are
//!   strictly ordered
//! - Whole-state snapshot replacement on every change (never diffs)
//! - Catch-up snapshot queued for every new subscriber
//! - Edge-triggered `host` events (transitions only, not heartbeats)
//! - Periodic keep-alive writes; channels that fail a write are dropped
//!
//! # Example Usage
//!
//! ```no_run
//! use partyline_broadcaster::PartyBroadcaster;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let broadcaster = PartyBroadcaster::new();
//!     broadcaster.start().await?;
//!
//!     // A guest joins and immediately receives the current snapshot.
//!     let mut events = broadcaster.subscribe().await;
//!
//!     // The host sets a tempo; every subscriber gets the new snapshot.
//!     broadcaster.set_tempo(128.0).await?;
//!     let _event = events.recv().await;
//!
//!     broadcaster.stop().await?;
//!     Ok(())
//! }
//! ```

pub mod broadcaster;
pub mod error;
pub mod events;
pub mod state;
pub mod subscriber;

// Re-exports
pub use broadcaster::{PartyBroadcaster, DEFAULT_KEEP_ALIVE};
pub use error::{BroadcasterError, Result};
pub use events::StreamEvent;
pub use state::StateStore;
pub use subscriber::{SubscriberChannel, SubscriberSet};
