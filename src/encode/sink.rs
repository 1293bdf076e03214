use image::RgbaImage;

use crate::foundation::error::{GifBeatError, GifBeatResult};
use crate::loops::model::Loop;
use crate::tempo::sync::SyncPlan;

/// Configuration provided to a [`FrameSink`] before any frame is pushed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SinkConfig {
    /// Output width in pixels.
    pub width: u32,
    /// Output height in pixels.
    pub height: u32,
    /// Number of frames that will follow.
    pub frame_count: usize,
}

/// Sink contract for consuming tempo-adjusted frames in loop order.
///
/// Ordering contract: `push_frame` is called with strictly increasing indices starting at 0.
pub trait FrameSink {
    /// Called once before any frames are pushed.
    fn begin(&mut self, cfg: SinkConfig) -> GifBeatResult<()>;
    /// Push one frame together with its display duration.
    fn push_frame(&mut self, idx: usize, frame: &RgbaImage, delay_ms: u32) -> GifBeatResult<()>;
    /// Called once after the last frame is pushed.
    fn end(&mut self) -> GifBeatResult<()>;
}

/// Stream every frame of `l` into `sink` with the delays computed by `plan`.
#[tracing::instrument(skip_all, fields(name = l.name(), bpm = %plan.bpm, beats = %plan.beats))]
pub fn export_loop(l: &Loop, plan: &SyncPlan, sink: &mut dyn FrameSink) -> GifBeatResult<()> {
    if plan.frame_durations_ms.len() != l.frame_count() {
        return Err(GifBeatError::validation(format!(
            "sync plan has {} frame delays for a {}-frame loop",
            plan.frame_durations_ms.len(),
            l.frame_count()
        )));
    }

    sink.begin(SinkConfig {
        width: l.width(),
        height: l.height(),
        frame_count: l.frame_count(),
    })?;
    for (idx, (frame, &delay_ms)) in l
        .frames()
        .iter()
        .zip(&plan.frame_durations_ms)
        .enumerate()
    {
        sink.push_frame(idx, &frame.image, delay_ms)?;
    }
    sink.end()?;

    tracing::info!(
        frames = l.frame_count(),
        speed_multiplier = plan.speed_multiplier,
        adjusted_total_ms = plan.adjusted_total_ms(),
        "exported loop"
    );
    Ok(())
}

/// In-memory sink for tests and debugging.
#[derive(Debug, Default)]
pub struct InMemorySink {
    cfg: Option<SinkConfig>,
    frames: Vec<(RgbaImage, u32)>,
    finished: bool,
}

impl InMemorySink {
    /// Create an empty in-memory sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// Configuration captured in `begin`, if any.
    pub fn config(&self) -> Option<SinkConfig> {
        self.cfg
    }

    /// Captured frames with their delays.
    pub fn frames(&self) -> &[(RgbaImage, u32)] {
        &self.frames
    }

    /// Delay of every captured frame, in push order.
    pub fn delays_ms(&self) -> Vec<u32> {
        self.frames.iter().map(|(_, d)| *d).collect()
    }

    /// Whether `end` has been called since the last `begin`.
    pub fn is_finished(&self) -> bool {
        self.finished
    }
}

impl FrameSink for InMemorySink {
    fn begin(&mut self, cfg: SinkConfig) -> GifBeatResult<()> {
        self.cfg = Some(cfg);
        self.frames.clear();
        self.finished = false;
        Ok(())
    }

    fn push_frame(&mut self, idx: usize, frame: &RgbaImage, delay_ms: u32) -> GifBeatResult<()> {
        if idx != self.frames.len() {
            return Err(GifBeatError::validation(format!(
                "frame {idx} pushed out of order (expected {})",
                self.frames.len()
            )));
        }
        self.frames.push((frame.clone(), delay_ms));
        Ok(())
    }

    fn end(&mut self) -> GifBeatResult<()> {
        self.finished = true;
        Ok(())
    }
}
