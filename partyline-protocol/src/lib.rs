//! Wire types shared between the Partyline server and guest clients
//!
//! The sync channel speaks JSON: guests receive whole-state [`Snapshot`]
//! replacements (never diffs) plus edge-triggered [`HostEvent`]s, and the
//! host posts [`SyncCommand`]s to mutate the shared party state.

pub mod models;

pub use models::{HostEvent, Snapshot, SyncCommand};

/// SSE event name carrying a full [`Snapshot`].
pub const EVENT_STATE: &str = "state";

/// SSE event name carrying a [`HostEvent`] connectivity transition.
pub const EVENT_HOST: &str = "host";
