//! Export of tempo-adjusted loops.
//!
//! Sinks consume frames in loop order; [`sink::export_loop`] drives any sink from a
//! [`crate::tempo::sync::SyncPlan`].

/// Looping GIF output.
pub mod gif;
/// Generic frame sink trait and built-in sinks.
pub mod sink;
