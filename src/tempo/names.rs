use std::path::Path;

use crate::foundation::core::DEFAULT_BEATS;

/// Read the beat count a file declares through the `<name>_<N>B.<ext>` convention.
///
/// Directory components are ignored and the `B` marker is case-insensitive. `N` may be an
/// integer or a decimal. Anything else (no suffix, malformed number, zero) yields `default`.
pub fn infer_beats_from_name(filename: &str, default: f64) -> f64 {
    parse_beats_suffix(filename).unwrap_or(default)
}

/// [`infer_beats_from_name`] with the standard default of two beats.
pub fn infer_beats(filename: &str) -> f64 {
    infer_beats_from_name(filename, DEFAULT_BEATS)
}

fn parse_beats_suffix(filename: &str) -> Option<f64> {
    // Accept both separators so Windows-style upload names resolve on any host.
    let base = filename.rsplit(['/', '\\']).next()?;
    let stem = Path::new(base).file_stem()?.to_str()?;

    let (_, tail) = stem.rsplit_once('_')?;
    let number = tail.strip_suffix(['B', 'b'])?;
    if !is_plain_decimal(number) {
        return None;
    }

    let beats: f64 = number.parse().ok()?;
    (beats.is_finite() && beats > 0.0).then_some(beats)
}

/// `digits` or `digits.digits`; rejects signs, exponents and bare dots that `f64::from_str` takes.
fn is_plain_decimal(s: &str) -> bool {
    let (int, frac) = match s.split_once('.') {
        Some((i, f)) => (i, Some(f)),
        None => (s, None),
    };
    let all_digits = |p: &str| !p.is_empty() && p.bytes().all(|b| b.is_ascii_digit());
    all_digits(int) && frac.is_none_or(all_digits)
}
