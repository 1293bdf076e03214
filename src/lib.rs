#![forbid(unsafe_code)]
//! Tempo-synchronized GIF loops.
//!
//! A [`Loop`] is decoded once, told how many beats it spans, and then played back or exported so
//! that one pass lasts exactly that many beats at the current [`Bpm`]. Every surface (CLI, HTTP,
//! playback clock, exporter) goes through [`tempo::sync`].

pub mod encode;
pub mod foundation;
pub mod loops;
pub mod playback;
pub mod server;
pub mod session;
pub mod tempo;

pub use encode::gif::{GifSink, GifSinkOpts, export_gif_bytes, export_gif_file};
pub use encode::sink::{FrameSink, InMemorySink, SinkConfig, export_loop};
pub use foundation::core::{Beats, Bpm, DEFAULT_BEATS, DEFAULT_BPM, MAX_BPM, MIN_BPM};
pub use foundation::error::{GifBeatError, GifBeatResult};
pub use loops::decode::{decode_gif_bytes, load_gif};
pub use loops::model::{Loop, LoopFrame};
pub use playback::Player;
pub use server::{ServerConfig, run_server};
pub use session::state::{AppState, SessionOpts, StateSnapshot};
pub use tempo::calc::{AnimationTiming, TimingQuery, calculate_animation_timing, reference_table};
pub use tempo::names::{infer_beats, infer_beats_from_name};
pub use tempo::sync::{
    MIN_FRAME_MS, SyncPlan, adjusted_frame_duration, compute_speed_multiplier, target_duration_ms,
};
pub use tempo::tap::{TapTempo, TapTempoOpts};
