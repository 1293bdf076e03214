use crate::foundation::error::{GifBeatError, GifBeatResult};

/// Lowest tempo any surface accepts.
pub const MIN_BPM: u32 = 30;
/// Highest tempo any surface accepts.
pub const MAX_BPM: u32 = 600;
/// Tempo used before the user sets one.
pub const DEFAULT_BPM: u32 = 120;
/// Beat count assumed when a loop does not declare one.
pub const DEFAULT_BEATS: f64 = 2.0;

/// Target tempo in beats per minute, always inside `[MIN_BPM, MAX_BPM]`.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
#[serde(try_from = "u32", into = "u32")]
pub struct Bpm(u32);

impl Bpm {
    /// Clamp any integer into the accepted tempo range.
    pub fn clamped(v: i64) -> Self {
        Self(v.clamp(i64::from(MIN_BPM), i64::from(MAX_BPM)) as u32)
    }

    /// Round and clamp a fractional tempo. Non-finite input is rejected.
    pub fn from_f64(v: f64) -> GifBeatResult<Self> {
        if !v.is_finite() {
            return Err(GifBeatError::validation(format!(
                "bpm must be a finite number, got {v}"
            )));
        }
        Ok(Self::clamped(v.round() as i64))
    }

    /// Tempo as a plain integer.
    pub fn get(self) -> u32 {
        self.0
    }

    /// Tempo as a float, for duration arithmetic.
    pub fn as_f64(self) -> f64 {
        f64::from(self.0)
    }

    /// Half tempo, integer division, never below `MIN_BPM`.
    pub fn halved(self) -> Self {
        Self::clamped(i64::from(self.0 / 2))
    }

    /// Double tempo, never above `MAX_BPM`.
    pub fn doubled(self) -> Self {
        Self::clamped(i64::from(self.0) * 2)
    }

    /// Shift by `delta` BPM, clamped to the accepted range.
    pub fn nudged(self, delta: i64) -> Self {
        Self::clamped(i64::from(self.0).saturating_add(delta))
    }
}

impl Default for Bpm {
    fn default() -> Self {
        Self(DEFAULT_BPM)
    }
}

impl TryFrom<u32> for Bpm {
    type Error = GifBeatError;

    fn try_from(v: u32) -> GifBeatResult<Self> {
        if !(MIN_BPM..=MAX_BPM).contains(&v) {
            return Err(GifBeatError::validation(format!(
                "bpm must be in {MIN_BPM}..={MAX_BPM}, got {v}"
            )));
        }
        Ok(Self(v))
    }
}

impl From<Bpm> for u32 {
    fn from(v: Bpm) -> Self {
        v.0
    }
}

impl std::fmt::Display for Bpm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// Number of musical beats one full loop spans. Always finite and `> 0`.
#[derive(Clone, Copy, Debug, PartialEq, PartialOrd, serde::Serialize, serde::Deserialize)]
#[serde(try_from = "f64", into = "f64")]
pub struct Beats(f64);

impl Beats {
    /// Validate a beat count. Rejects zero, negative and non-finite values.
    pub fn new(v: f64) -> GifBeatResult<Self> {
        if !v.is_finite() || v <= 0.0 {
            return Err(GifBeatError::validation(format!(
                "beats must be a positive number, got {v}"
            )));
        }
        Ok(Self(v))
    }

    /// Beat count as a plain float.
    pub fn get(self) -> f64 {
        self.0
    }
}

impl Default for Beats {
    fn default() -> Self {
        Self(DEFAULT_BEATS)
    }
}

impl TryFrom<f64> for Beats {
    type Error = GifBeatError;

    fn try_from(v: f64) -> GifBeatResult<Self> {
        Self::new(v)
    }
}

impl From<Beats> for f64 {
    fn from(v: Beats) -> Self {
        v.0
    }
}

impl std::fmt::Display for Beats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/core.rs"]
mod tests;
