use image::RgbaImage;

use crate::foundation::core::{Beats, Bpm};
use crate::foundation::error::{GifBeatError, GifBeatResult};
use crate::tempo::sync::SyncPlan;

/// One fully composited frame and how long it is shown at native speed.
#[derive(Clone, Debug)]
pub struct LoopFrame {
    pub image: RgbaImage,
    pub native_ms: u32,
}

/// A decoded animation loop and the number of beats it is meant to span.
#[derive(Clone, Debug)]
pub struct Loop {
    name: String,
    width: u32,
    height: u32,
    frames: Vec<LoopFrame>,
    /// Mutable: set from the filename on load, then by the user.
    pub beats: Beats,
}

impl Loop {
    /// Validate and assemble a loop. All frames must share the first frame's dimensions.
    pub fn new(name: impl Into<String>, frames: Vec<LoopFrame>, beats: Beats) -> GifBeatResult<Self> {
        let first = frames
            .first()
            .ok_or_else(|| GifBeatError::validation("a loop needs at least one frame"))?;
        let (width, height) = first.image.dimensions();
        if width == 0 || height == 0 {
            return Err(GifBeatError::validation("loop frames must be non-empty images"));
        }
        if let Some((i, f)) = frames
            .iter()
            .enumerate()
            .find(|(_, f)| f.image.dimensions() != (width, height))
        {
            return Err(GifBeatError::validation(format!(
                "frame {i} is {}x{}, expected {width}x{height}",
                f.image.width(),
                f.image.height()
            )));
        }

        Ok(Self {
            name: name.into(),
            width,
            height,
            frames,
            beats,
        })
    }

    /// File name the loop was loaded from.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Canvas width in pixels.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Canvas height in pixels.
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Frames in display order.
    pub fn frames(&self) -> &[LoopFrame] {
        &self.frames
    }

    /// Number of frames; never zero.
    pub fn frame_count(&self) -> usize {
        self.frames.len()
    }

    /// Authored delay of every frame, in milliseconds.
    pub fn native_durations_ms(&self) -> Vec<u32> {
        self.frames.iter().map(|f| f.native_ms).collect()
    }

    /// Sum of native frame durations.
    pub fn native_total_ms(&self) -> u64 {
        self.frames.iter().map(|f| u64::from(f.native_ms)).sum()
    }

    /// Timing of this loop at `bpm`, using the loop's own beat count.
    pub fn sync_plan(&self, bpm: Bpm, min_frame_ms: u32) -> SyncPlan {
        SyncPlan::new(bpm, self.beats, &self.native_durations_ms(), min_frame_ms)
    }
}
