//! Planning helper for authoring beat-synced loops: pick a tempo, a beat count and a frame
//! density, get the per-frame delay to bake into the GIF.

use crate::foundation::error::{GifBeatError, GifBeatResult};

/// Inputs to [`calculate_animation_timing`]. At least three must be present.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct TimingQuery {
    pub bpm: Option<f64>,
    pub beat_count: Option<f64>,
    pub frames_per_beat: Option<f64>,
    pub total_frames: Option<u32>,
}

#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize)]
pub struct AnimationTiming {
    pub bpm: f64,
    pub beat_count: f64,
    pub frames_per_beat: f64,
    pub total_frames: u32,
    pub loop_duration_secs: f64,
    pub loop_duration_ms: f64,
    pub frame_duration_ms: f64,
}

impl AnimationTiming {
    /// Filename that makes the sync tool pick up the right beat count.
    pub fn suggested_file_name(&self, stem: &str) -> String {
        format!("{stem}_{}B.gif", self.beat_count)
    }
}

/// Fill in whichever of beat count, frames per beat or total frames is missing and derive the
/// loop and frame durations.
///
/// A derived frame total that is not whole is reported truncated in `total_frames`, while
/// `frame_duration_ms` is computed from the exact product.
pub fn calculate_animation_timing(q: TimingQuery) -> GifBeatResult<AnimationTiming> {
    let provided = [
        q.bpm.is_some(),
        q.beat_count.is_some(),
        q.frames_per_beat.is_some(),
        q.total_frames.is_some(),
    ]
    .into_iter()
    .filter(|&p| p)
    .count();
    if provided < 3 {
        return Err(GifBeatError::validation(
            "provide at least 3 of: bpm, beat count, frames per beat, total frames",
        ));
    }
    let Some(bpm) = q.bpm else {
        return Err(GifBeatError::validation(
            "bpm cannot be derived from frame counts alone",
        ));
    };
    positive("bpm", bpm)?;

    let (beat_count, frames_per_beat, total_frames) =
        match (q.beat_count, q.frames_per_beat, q.total_frames) {
            (Some(beats), Some(fpb), None) => {
                positive("beat count", beats)?;
                positive("frames per beat", fpb)?;
                (beats, fpb, beats * fpb)
            }
            (Some(beats), None, Some(total)) => {
                positive("beat count", beats)?;
                (beats, f64::from(total) / beats, f64::from(total))
            }
            (None, Some(fpb), Some(total)) => {
                positive("frames per beat", fpb)?;
                (f64::from(total) / fpb, fpb, f64::from(total))
            }
            (Some(beats), Some(fpb), Some(total)) => {
                positive("beat count", beats)?;
                positive("frames per beat", fpb)?;
                (beats, fpb, f64::from(total))
            }
            (beats, fpb, total) => {
                return Err(GifBeatError::validation(format!(
                    "cannot solve timing from beat count {beats:?}, frames per beat {fpb:?}, total frames {total:?}"
                )));
            }
        };
    if total_frames <= 0.0 {
        return Err(GifBeatError::validation("total frames must be > 0"));
    }

    let loop_duration_secs = (beat_count / bpm) * 60.0;
    let loop_duration_ms = loop_duration_secs * 1000.0;

    Ok(AnimationTiming {
        bpm,
        beat_count,
        frames_per_beat,
        total_frames: total_frames as u32,
        loop_duration_secs,
        loop_duration_ms,
        frame_duration_ms: loop_duration_ms / total_frames,
    })
}

fn positive(what: &str, v: f64) -> GifBeatResult<()> {
    if v.is_finite() && v > 0.0 {
        Ok(())
    } else {
        Err(GifBeatError::validation(format!(
            "{what} must be a positive number, got {v}"
        )))
    }
}

/// `(bpm, beat_count, frames_per_beat)` rows of the reference table.
pub const REFERENCE_SCENARIOS: [(f64, f64, f64); 9] = [
    (120.0, 2.0, 2.0),
    (120.0, 2.0, 4.0),
    (120.0, 4.0, 2.0),
    (120.0, 4.0, 4.0),
    (120.0, 4.0, 8.0),
    (140.0, 2.0, 2.0),
    (140.0, 4.0, 2.0),
    (100.0, 4.0, 3.0),
    (80.0, 4.0, 4.0),
];

/// Timing for every [`REFERENCE_SCENARIOS`] row.
pub fn reference_table() -> Vec<AnimationTiming> {
    REFERENCE_SCENARIOS
        .iter()
        .filter_map(|&(bpm, beats, fpb)| {
            calculate_animation_timing(TimingQuery {
                bpm: Some(bpm),
                beat_count: Some(beats),
                frames_per_beat: Some(fpb),
                total_frames: None,
            })
            .ok()
        })
        .collect()
}
