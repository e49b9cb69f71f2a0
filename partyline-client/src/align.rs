//! Beat-alignment delay computation
//!
//! Given the shared beat grid (tempo + beat origin on the server clock)
//! and the estimated clock offset, computes the extra output delay that
//! makes the next perceived beat land on a boundary of the host's grid.

/// Largest delay the playback engine can apply. Recommendations beyond
/// this window mean the stream is more than one window out of phase and
/// only partial correction is possible.
pub const MAX_DELAY_MS: f64 = 2000.0;

/// Duration of one beat in milliseconds.
pub fn beat_duration_ms(bpm: f64) -> f64 {
    60_000.0 / bpm
}

/// Phase-correct playback delay in milliseconds.
///
/// `offset_ms` is the ClockSync estimate of (server clock − local clock).
/// The elapsed-in-beat term is normalized into `[0, beat_duration)` even
/// when the local clock reads earlier than the beat origin, so the result
/// is always in `(0, beat_duration]`.
pub fn recommended_delay_ms(
    bpm: f64,
    beat_origin_ms: i64,
    offset_ms: i64,
    local_now_ms: i64,
) -> f64 {
    let beat_duration = beat_duration_ms(bpm);
    let now_on_server = local_now_ms + offset_ms;
    let elapsed = ((now_on_server - beat_origin_ms) as f64).rem_euclid(beat_duration);
    beat_duration - elapsed
}

/// Clamp a recommendation into the engine's supported delay window.
pub fn clamp_delay(delay_ms: f64) -> f64 {
    delay_ms.clamp(0.0, MAX_DELAY_MS)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recommended_delay_reference_case() {
        // 120 BPM -> 500 ms beats; 1250 ms after the origin is 250 ms into
        // the third beat, so 250 ms of delay reaches the next boundary.
        let delay = recommended_delay_ms(120.0, 0, 0, 1250);
        assert!((delay - 250.0).abs() < 1e-9);
    }

    #[test]
    fn test_offset_shifts_local_clock_onto_server_grid() {
        // Local clock runs 1000 ms behind the server.
        let delay = recommended_delay_ms(120.0, 0, 1000, 250);
        assert!((delay - 250.0).abs() < 1e-9);
    }

    #[test]
    fn test_elapsed_normalized_for_times_before_origin() {
        // 100 ms before the origin is 400 ms into the "previous" beat.
        let delay = recommended_delay_ms(120.0, 0, 0, -100);
        assert!((delay - 100.0).abs() < 1e-9);
    }

    #[test]
    fn test_on_boundary_recommends_full_beat() {
        let delay = recommended_delay_ms(120.0, 0, 0, 1000);
        assert!((delay - 500.0).abs() < 1e-9);
    }

    #[test]
    fn test_clamp_delay_window() {
        assert_eq!(clamp_delay(-5.0), 0.0);
        assert_eq!(clamp_delay(300.0), 300.0);
        assert_eq!(clamp_delay(2500.0), MAX_DELAY_MS);
    }
}
