use std::collections::VecDeque;
use std::time::Duration;

use crate::foundation::core::Bpm;

/// Tunables for [`TapTempo`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TapTempoOpts {
    /// Most recent timestamps kept for averaging.
    pub max_taps: usize,
    /// A gap longer than this starts a new measurement.
    pub reset_after: Duration,
    /// Taps closer together than this are treated as a double-trigger and dropped.
    pub min_interval: Duration,
}

impl Default for TapTempoOpts {
    fn default() -> Self {
        Self {
            max_taps: 8,
            reset_after: Duration::from_secs(4),
            min_interval: Duration::from_millis(100),
        }
    }
}

/// Moving-average tap tempo estimator.
///
/// Timestamps are supplied by the caller as offsets from any fixed epoch, so the estimator itself
/// never reads a clock.
#[derive(Clone, Debug, Default)]
pub struct TapTempo {
    opts: TapTempoOpts,
    taps: VecDeque<Duration>,
}

impl TapTempo {
    pub fn new(opts: TapTempoOpts) -> Self {
        Self {
            opts: TapTempoOpts {
                max_taps: opts.max_taps.max(2),
                ..opts
            },
            taps: VecDeque::new(),
        }
    }

    /// Register a tap at `at` and return the estimated tempo once two or more taps are held.
    ///
    /// Taps older than `reset_after` are forgotten first, so the estimate follows tempo changes
    /// within one window.
    pub fn tap(&mut self, at: Duration) -> Option<Bpm> {
        if self.taps.back().is_some_and(|&last| at < last) {
            // Clock went backwards; nothing held is comparable any more.
            self.taps.clear();
        }
        let reset_after = self.opts.reset_after;
        self.taps.retain(|&t| at - t < reset_after);

        match self.taps.back().copied() {
            Some(last) if at - last < self.opts.min_interval => {
                tracing::trace!(?at, "tap debounced");
            }
            _ => self.taps.push_back(at),
        }

        while self.taps.len() > self.opts.max_taps {
            self.taps.pop_front();
        }

        self.estimate()
    }

    /// Tempo implied by the taps currently held.
    pub fn estimate(&self) -> Option<Bpm> {
        let (first, last) = (self.taps.front()?, self.taps.back()?);
        let intervals = self.taps.len().checked_sub(1).filter(|&n| n > 0)?;
        let avg_secs = (*last - *first).as_secs_f64() / intervals as f64;
        if avg_secs <= 0.0 {
            return None;
        }
        Some(Bpm::clamped((60.0 / avg_secs).round() as i64))
    }

    /// Timestamps currently held.
    pub fn tap_count(&self) -> usize {
        self.taps.len()
    }

}
