//! Tap-tempo BPM estimation

use std::collections::VecDeque;

/// Default number of taps kept; the host control surface uses 12.
pub const DEFAULT_TAP_WINDOW: usize = 10;

/// Smoothed BPM estimate from the mean interval between the most recent
/// N taps.
///
/// The tap history is a fixed-size ring: the oldest tap is dropped on
/// overflow. A non-finite intermediate result (zero mean interval from a
/// double-fire) leaves the previously displayed estimate in place rather
/// than showing a nonsensical number.
#[derive(Debug)]
pub struct TapTempo {
    taps: VecDeque<f64>,
    capacity: usize,
    estimate: Option<f64>,
}

impl TapTempo {
    pub fn new() -> Self {
        Self::with_window(DEFAULT_TAP_WINDOW)
    }

    /// `capacity` is clamped to at least 2 taps (one interval).
    pub fn with_window(capacity: usize) -> Self {
        Self {
            taps: VecDeque::new(),
            capacity: capacity.max(2),
            estimate: None,
        }
    }

    /// Record a tap at `now_ms` and return the current estimate.
    pub fn tap(&mut self, now_ms: f64) -> Option<f64> {
        self.taps.push_back(now_ms);
        while self.taps.len() > self.capacity {
            self.taps.pop_front();
        }

        if self.taps.len() < 2 {
            self.estimate = None;
            return None;
        }

        let intervals: Vec<f64> = self
            .taps
            .iter()
            .zip(self.taps.iter().skip(1))
            .map(|(a, b)| b - a)
            .collect();
        let mean = intervals.iter().sum::<f64>() / intervals.len() as f64;
        let bpm = 60_000.0 / mean;

        if bpm.is_finite() {
            self.estimate = Some(bpm);
        } else {
            tracing::debug!("Discarding non-finite tap estimate (mean interval {mean} ms)");
        }
        self.estimate
    }

    /// Current estimate without recording a tap.
    pub fn estimate_bpm(&self) -> Option<f64> {
        self.estimate
    }

    pub fn tap_count(&self) -> usize {
        self.taps.len()
    }

    /// Empty the tap history and reset the displayed estimate.
    pub fn clear(&mut self) {
        self.taps.clear();
        self.estimate = None;
    }
}

impl Default for TapTempo {
    fn default() -> Self {
        Self::new()
    }
}
