use std::time::Duration;

use crate::encode::gif::{GifSinkOpts, export_gif_bytes};
use crate::foundation::core::{Beats, Bpm};
use crate::foundation::error::{GifBeatError, GifBeatResult};
use crate::loops::model::Loop;
use crate::session::slot::{MAX_SLOTS, Slot};
use crate::tempo::sync::{MIN_FRAME_MS, SyncPlan};
use crate::tempo::tap::{TapTempo, TapTempoOpts};

/// Session-wide defaults and tunables.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SessionOpts {
    pub initial_bpm: Bpm,
    pub default_beats: Beats,
    /// Export floor for adjusted frame delays.
    pub min_frame_ms: u32,
    pub tap: TapTempoOpts,
    pub gif: GifSinkOpts,
}

impl Default for SessionOpts {
    fn default() -> Self {
        Self {
            initial_bpm: Bpm::default(),
            default_beats: Beats::default(),
            min_frame_ms: MIN_FRAME_MS,
            tap: TapTempoOpts::default(),
            gif: GifSinkOpts::default(),
        }
    }
}

/// Everything a front end mutates: tempo, slots, selection, pause and tap history.
///
/// Handlers take `&mut AppState`; there is no global state. Invalid input is rejected without
/// touching the current values.
#[derive(Clone, Debug)]
pub struct AppState {
    opts: SessionOpts,
    bpm: Bpm,
    active_slot: usize,
    paused: bool,
    slots: Vec<Slot>,
    tap: TapTempo,
}

impl Default for AppState {
    fn default() -> Self {
        Self::new(SessionOpts::default())
    }
}

impl AppState {
    pub fn new(opts: SessionOpts) -> Self {
        Self {
            bpm: opts.initial_bpm,
            active_slot: 0,
            paused: false,
            slots: (0..MAX_SLOTS).map(|_| Slot::new(opts.default_beats)).collect(),
            tap: TapTempo::new(opts.tap),
            opts,
        }
    }

    // -- tempo --------------------------------------------------------------------------------

    pub fn bpm(&self) -> Bpm {
        self.bpm
    }

    pub fn set_bpm(&mut self, bpm: Bpm) -> Bpm {
        if bpm != self.bpm {
            tracing::debug!(from = %self.bpm, to = %bpm, "bpm changed");
        }
        self.bpm = bpm;
        bpm
    }

    /// Round and clamp; non-finite input is rejected.
    pub fn set_bpm_value(&mut self, v: f64) -> GifBeatResult<Bpm> {
        let bpm = Bpm::from_f64(v)?;
        Ok(self.set_bpm(bpm))
    }

    /// Apply typed text. Anything that is not a number leaves the tempo alone.
    pub fn set_bpm_text(&mut self, text: &str) -> Option<Bpm> {
        let v: f64 = text.trim().parse().ok()?;
        self.set_bpm_value(v).ok()
    }

    pub fn halve_bpm(&mut self) -> Bpm {
        self.set_bpm(self.bpm.halved())
    }

    pub fn double_bpm(&mut self) -> Bpm {
        self.set_bpm(self.bpm.doubled())
    }

    pub fn nudge_bpm(&mut self, delta: i64) -> Bpm {
        self.set_bpm(self.bpm.nudged(delta))
    }

    /// Feed a tap at `at` (monotonic offset). Updates the tempo once an estimate exists.
    pub fn tap(&mut self, at: Duration) -> Option<Bpm> {
        let bpm = self.tap.tap(at)?;
        Some(self.set_bpm(bpm))
    }

    pub fn tap_count(&self) -> usize {
        self.tap.tap_count()
    }

    // -- slots --------------------------------------------------------------------------------

    pub fn slots(&self) -> &[Slot] {
        &self.slots
    }

    pub fn active_slot(&self) -> usize {
        self.active_slot
    }

    pub fn active(&self) -> &Slot {
        &self.slots[self.active_slot]
    }

    /// Select a slot, clamping out-of-range indices to the nearest valid one.
    pub fn select_slot(&mut self, idx: i64) -> usize {
        self.active_slot = idx.clamp(0, MAX_SLOTS as i64 - 1) as usize;
        self.active_slot
    }

    /// Beat count of the active slot.
    pub fn beats(&self) -> Beats {
        self.active().beats()
    }

    pub fn set_beats(&mut self, v: f64) -> GifBeatResult<Beats> {
        let beats = Beats::new(v)?;
        self.slots[self.active_slot].set_beats(beats);
        tracing::debug!(slot = self.active_slot, %beats, "beats changed");
        Ok(beats)
    }

    /// Apply typed text. Anything that is not a positive number leaves the beats alone.
    pub fn set_beats_text(&mut self, text: &str) -> Option<Beats> {
        let v: f64 = text.trim().parse().ok()?;
        self.set_beats(v).ok()
    }

    /// Load a decoded loop into the active slot.
    pub fn load_loop(&mut self, l: Loop) -> &Loop {
        let slot = self.active_slot;
        tracing::info!(
            slot,
            name = l.name(),
            frames = l.frame_count(),
            beats = %l.beats,
            "loop loaded"
        );
        self.slots[slot].load(l)
    }

    // -- playback -----------------------------------------------------------------------------

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn toggle_pause(&mut self) -> bool {
        self.paused = !self.paused;
        self.paused
    }

    /// Advance every loaded slot by `dt_ms` of wall time unless paused.
    pub fn tick(&mut self, dt_ms: f64) {
        if self.paused {
            return;
        }
        let bpm = self.bpm.as_f64();
        for slot in &mut self.slots {
            slot.advance(dt_ms, bpm);
        }
    }

    // -- sync / export ------------------------------------------------------------------------

    /// Speed multiplier of the active slot (1.0 when it is empty).
    pub fn speed_multiplier(&self) -> f64 {
        self.active().speed_multiplier(self.bpm.as_f64())
    }

    fn active_loop(&self) -> GifBeatResult<&Loop> {
        self.active()
            .content()
            .ok_or_else(|| GifBeatError::validation("No GIF loaded"))
    }

    pub fn sync_plan(&self) -> GifBeatResult<SyncPlan> {
        Ok(self
            .active_loop()?
            .sync_plan(self.bpm, self.opts.min_frame_ms))
    }

    /// Snapshot what an export of the active slot needs, so encoding can run without holding
    /// on to the state.
    pub fn export_job(&self) -> GifBeatResult<ExportJob> {
        let l = self.active_loop()?;
        Ok(ExportJob {
            plan: l.sync_plan(self.bpm, self.opts.min_frame_ms),
            content: l.clone(),
            opts: self.opts.gif,
        })
    }

    /// Encode the active slot at the current tempo.
    pub fn export_active(&self) -> GifBeatResult<(SyncPlan, Vec<u8>)> {
        self.export_job()?.run()
    }

    pub fn snapshot(&self) -> StateSnapshot {
        StateSnapshot {
            bpm: self.bpm,
            beats: self.beats(),
            active_slot: self.active_slot,
            paused: self.paused,
            speed_multiplier: self.speed_multiplier(),
            tap_count: self.tap_count(),
            slots: self
                .slots
                .iter()
                .map(|s| SlotSnapshot {
                    is_loaded: s.is_loaded(),
                    name: s.content().map(|l| l.name().to_owned()),
                    beats: s.beats(),
                    frame_count: s.content().map_or(0, Loop::frame_count),
                    current_frame: s.player().current_frame(),
                    native_duration_ms: s.content().map_or(0, Loop::native_total_ms),
                })
                .collect(),
        }
    }
}

/// A detached export of one loop at one tempo.
#[derive(Clone, Debug)]
pub struct ExportJob {
    pub plan: SyncPlan,
    content: Loop,
    opts: GifSinkOpts,
}

impl ExportJob {
    pub fn run(self) -> GifBeatResult<(SyncPlan, Vec<u8>)> {
        let bytes = export_gif_bytes(&self.content, &self.plan, self.opts)?;
        Ok((self.plan, bytes))
    }
}

/// Serializable view of [`AppState`].
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct StateSnapshot {
    pub bpm: Bpm,
    pub beats: Beats,
    pub active_slot: usize,
    pub paused: bool,
    pub speed_multiplier: f64,
    pub tap_count: usize,
    pub slots: Vec<SlotSnapshot>,
}

#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct SlotSnapshot {
    pub is_loaded: bool,
    pub name: Option<String>,
    pub beats: Beats,
    pub frame_count: usize,
    pub current_frame: usize,
    pub native_duration_ms: u64,
}

#[cfg(test)]
#[path = "../../tests/unit/session/state.rs"]
mod tests;
