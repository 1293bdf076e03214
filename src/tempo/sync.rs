//! Beat synchronization math.
//!
//! A loop whose native frames add up to `native_total_ms` is stretched or compressed so that one
//! pass lasts exactly `beats` beats at `bpm`. Every surface (playback, export, HTTP, CLI) goes
//! through these functions.

use crate::foundation::core::{Beats, Bpm};

/// Shortest frame delay the exporter will write.
pub const MIN_FRAME_MS: u32 = 20;

const MS_PER_MINUTE: f64 = 60_000.0;

/// Wall-clock length of `beats` beats at `bpm`, in milliseconds.
pub fn target_duration_ms(bpm: f64, beats: f64) -> f64 {
    (beats / bpm) * MS_PER_MINUTE
}

/// Ratio of native loop length to tempo-synced loop length.
///
/// Values above `1.0` play faster than authored. Any non-positive or non-finite input means there
/// is nothing to sync against and yields native speed (`1.0`).
pub fn compute_speed_multiplier(bpm: f64, beats: f64, native_total_ms: f64) -> f64 {
    let usable = |v: f64| v.is_finite() && v > 0.0;
    if !(usable(bpm) && usable(beats) && usable(native_total_ms)) {
        return 1.0;
    }
    native_total_ms / target_duration_ms(bpm, beats)
}

/// Display duration of one frame after tempo adjustment, never below `minimum_ms`.
pub fn adjusted_frame_duration(native_ms: u32, speed_multiplier: f64, minimum_ms: u32) -> u32 {
    let mult = if speed_multiplier.is_finite() && speed_multiplier > 0.0 {
        speed_multiplier
    } else {
        1.0
    };
    let scaled = (f64::from(native_ms) / mult).round();
    // `as` saturates on overflow, which is the behavior we want for absurdly slow tempos.
    (scaled as u32).max(minimum_ms)
}

/// Unfloored, unrounded adjusted duration used by the playback clock.
pub(crate) fn scaled_frame_duration(native_ms: u32, speed_multiplier: f64) -> f64 {
    if speed_multiplier.is_finite() && speed_multiplier > 0.0 {
        f64::from(native_ms) / speed_multiplier
    } else {
        f64::from(native_ms)
    }
}

/// Complete timing result for one loop at one tempo.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct SyncPlan {
    pub bpm: Bpm,
    pub beats: Beats,
    pub native_total_ms: u64,
    pub target_duration_ms: f64,
    pub speed_multiplier: f64,
    /// Per-frame delays after adjustment, floored at `min_frame_ms`.
    pub frame_durations_ms: Vec<u32>,
    pub min_frame_ms: u32,
}

impl SyncPlan {
    /// Compute the plan for a loop with the given native frame durations.
    pub fn new(bpm: Bpm, beats: Beats, native_durations_ms: &[u32], min_frame_ms: u32) -> Self {
        let native_total_ms: u64 = native_durations_ms.iter().map(|&d| u64::from(d)).sum();
        let speed_multiplier =
            compute_speed_multiplier(bpm.as_f64(), beats.get(), native_total_ms as f64);
        let frame_durations_ms = native_durations_ms
            .iter()
            .map(|&d| adjusted_frame_duration(d, speed_multiplier, min_frame_ms))
            .collect();

        Self {
            bpm,
            beats,
            native_total_ms,
            target_duration_ms: target_duration_ms(bpm.as_f64(), beats.get()),
            speed_multiplier,
            frame_durations_ms,
            min_frame_ms,
        }
    }

    /// Sum of the adjusted frame durations.
    ///
    /// Differs from `target_duration_ms` by rounding and by any frames that hit the floor.
    pub fn adjusted_total_ms(&self) -> u64 {
        self.frame_durations_ms.iter().map(|&d| u64::from(d)).sum()
    }

    /// Conventional output filename, e.g. `synced_120bpm_2beats.gif`.
    pub fn export_file_name(&self) -> String {
        format!("synced_{}bpm_{}beats.gif", self.bpm, self.beats)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/tempo/sync.rs"]
mod tests;
