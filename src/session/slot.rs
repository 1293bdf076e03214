use crate::foundation::core::Beats;
use crate::loops::model::Loop;
use crate::playback::Player;
use crate::tempo::sync::compute_speed_multiplier;

/// Number of loop slots a session holds.
pub const MAX_SLOTS: usize = 10;

/// One loop slot: empty, or a loaded loop plus its playback position.
#[derive(Clone, Debug)]
pub struct Slot {
    content: Option<Loop>,
    // Beat count used while the slot is empty; replaced by the loop's own on load.
    idle_beats: Beats,
    player: Player,
}

impl Slot {
    /// An empty slot that reports `default_beats` until a loop is loaded.
    pub fn new(default_beats: Beats) -> Self {
        Self {
            content: None,
            idle_beats: default_beats,
            player: Player::new(),
        }
    }

    pub fn is_loaded(&self) -> bool {
        self.content.is_some()
    }

    pub fn content(&self) -> Option<&Loop> {
        self.content.as_ref()
    }

    pub fn player(&self) -> &Player {
        &self.player
    }

    pub fn beats(&self) -> Beats {
        self.content.as_ref().map_or(self.idle_beats, |l| l.beats)
    }

    pub fn set_beats(&mut self, beats: Beats) {
        match self.content.as_mut() {
            Some(l) => l.beats = beats,
            None => self.idle_beats = beats,
        }
    }

    /// Replace whatever the slot held and restart playback from the first frame.
    pub fn load(&mut self, l: Loop) -> &Loop {
        self.player.rewind();
        self.content.insert(l)
    }

    /// Speed multiplier for this slot at `bpm`; native speed when empty.
    pub fn speed_multiplier(&self, bpm: f64) -> f64 {
        self.content.as_ref().map_or(1.0, |l| {
            compute_speed_multiplier(bpm, l.beats.get(), l.native_total_ms() as f64)
        })
    }

    pub(crate) fn advance(&mut self, dt_ms: f64, bpm: f64) {
        let mult = self.speed_multiplier(bpm);
        if let Some(l) = self.content.as_ref() {
            self.player.advance(dt_ms, l, mult);
        }
    }
}
