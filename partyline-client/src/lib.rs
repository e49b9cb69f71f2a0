//! Guest-side sync engine for Partyline
//!
//! Everything a guest player needs to stay on the host's beat grid:
//! clock-offset estimation from pushed snapshots, phase-correct playback
//! delay computation, and tap-tempo BPM estimation. The actual audio path
//! (WHEP playback, delay node) lives outside this crate; it consumes the
//! numbers produced here.
//!
//! All components are synchronous state machines driven by message receipt
//! and user input. Clocks are never read internally — callers pass the
//! current local time in milliseconds — so every computation is
//! deterministic and testable.

pub mod align;
pub mod sync;
pub mod tap;

// Re-exports
pub use align::{beat_duration_ms, clamp_delay, recommended_delay_ms, MAX_DELAY_MS};
pub use sync::{ClockSync, SyncTracker};
pub use tap::{TapTempo, DEFAULT_TAP_WINDOW};
