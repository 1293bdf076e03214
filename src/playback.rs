//! Frame clock for tempo-synced playback.

use crate::loops::model::Loop;
use crate::tempo::sync::scaled_frame_duration;

/// Tracks which frame of a loop is on screen.
///
/// Uses the unfloored adjusted durations so the visible loop length matches the tempo exactly,
/// even when individual frames are shorter than the export floor.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Player {
    frame: usize,
    /// Time already spent on `frame`, in milliseconds.
    elapsed_ms: f64,
}

impl Player {
    /// A clock parked on the first frame.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current_frame(&self) -> usize {
        self.frame
    }

    /// Return to the first frame.
    pub fn rewind(&mut self) {
        *self = Self::default();
    }

    /// Advance by `dt_ms` of wall time at `speed_multiplier`. Returns `true` if the frame changed.
    pub fn advance(&mut self, dt_ms: f64, l: &Loop, speed_multiplier: f64) -> bool {
        let frames = l.frames();
        if frames.is_empty() || !dt_ms.is_finite() || dt_ms <= 0.0 {
            return false;
        }
        if self.frame >= frames.len() {
            self.rewind();
        }

        let start = self.frame;
        let mut remaining = self.elapsed_ms + dt_ms;

        // Skip whole loops up front so huge steps stay O(frames).
        let loop_ms = l.native_total_ms() as f64
            / if speed_multiplier.is_finite() && speed_multiplier > 0.0 {
                speed_multiplier
            } else {
                1.0
            };
        if loop_ms > 0.0 && remaining >= 2.0 * loop_ms {
            remaining %= loop_ms;
            remaining += loop_ms;
        }

        loop {
            let dur = scaled_frame_duration(frames[self.frame].native_ms, speed_multiplier);
            if dur <= 0.0 || remaining < dur {
                break;
            }
            remaining -= dur;
            self.frame = (self.frame + 1) % frames.len();
        }
        self.elapsed_ms = remaining;

        self.frame != start
    }
}
