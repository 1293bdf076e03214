//! Tempo math shared by every surface.

/// Animation timing calculator for authoring loops.
pub mod calc;
/// Beat counts declared in file names.
pub mod names;
/// Speed multiplier and adjusted frame durations.
pub mod sync;
/// Tap tempo estimation.
pub mod tap;
