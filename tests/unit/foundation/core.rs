use super::*;

#[test]
fn bpm_clamps_into_range() {
    assert_eq!(Bpm::clamped(10).get(), MIN_BPM);
    assert_eq!(Bpm::clamped(5000).get(), MAX_BPM);
    assert_eq!(Bpm::clamped(128).get(), 128);
    assert_eq!(Bpm::default().get(), DEFAULT_BPM);
}

#[test]
fn bpm_from_f64_rounds_and_rejects_nan() {
    assert_eq!(Bpm::from_f64(127.6).unwrap().get(), 128);
    assert_eq!(Bpm::from_f64(-4.0).unwrap().get(), MIN_BPM);
    assert!(Bpm::from_f64(f64::NAN).is_err());
    assert!(Bpm::from_f64(f64::INFINITY).is_err());
}

#[test]
fn bpm_halve_double_nudge_stay_in_range() {
    let b = Bpm::clamped(120);
    assert_eq!(b.halved().get(), 60);
    assert_eq!(b.doubled().get(), 240);
    assert_eq!(Bpm::clamped(45).halved().get(), MIN_BPM);
    assert_eq!(Bpm::clamped(400).doubled().get(), MAX_BPM);
    assert_eq!(b.nudged(10).get(), 130);
    assert_eq!(b.nudged(-1000).get(), MIN_BPM);
}

#[test]
fn bpm_serde_rejects_out_of_range() {
    assert_eq!(serde_json::to_string(&Bpm::clamped(90)).unwrap(), "90");
    assert!(serde_json::from_str::<Bpm>("600").is_ok());
    assert!(serde_json::from_str::<Bpm>("601").is_err());
}

#[test]
fn beats_must_be_positive_and_finite() {
    assert_eq!(Beats::new(4.0).unwrap().get(), 4.0);
    assert!(Beats::new(0.0).is_err());
    assert!(Beats::new(-1.0).is_err());
    assert!(Beats::new(f64::NAN).is_err());
    assert_eq!(Beats::default().get(), DEFAULT_BEATS);
    assert!(serde_json::from_str::<Beats>("0").is_err());
}
