use super::*;
use crate::foundation::core::{MAX_BPM, MIN_BPM};
use crate::loops::model::LoopFrame;
use image::{Rgba, RgbaImage};

fn loop_named(name: &str, durations: &[u32]) -> Loop {
    let frames = durations
        .iter()
        .map(|&ms| LoopFrame {
            image: RgbaImage::from_pixel(2, 2, Rgba([10, 20, 30, 255])),
            native_ms: ms,
        })
        .collect();
    let beats = Beats::new(crate::tempo::names::infer_beats(name)).unwrap();
    Loop::new(name, frames, beats).unwrap()
}

#[test]
fn defaults_match_the_desktop_tool() {
    let s = AppState::default();
    assert_eq!(s.bpm().get(), 120);
    assert_eq!(s.beats().get(), 2.0);
    assert_eq!(s.slots().len(), MAX_SLOTS);
    assert_eq!(s.active_slot(), 0);
    assert!(!s.is_paused());
    assert_eq!(s.speed_multiplier(), 1.0);
}

#[test]
fn bpm_text_ignores_garbage() {
    let mut s = AppState::default();
    assert_eq!(s.set_bpm_text(" 128 ").map(Bpm::get), Some(128));
    assert_eq!(s.set_bpm_text("fast"), None);
    assert_eq!(s.set_bpm_text(""), None);
    assert_eq!(s.set_bpm_text("NaN"), None);
    assert_eq!(s.bpm().get(), 128);
    assert_eq!(s.set_bpm_text("9000").map(Bpm::get), Some(MAX_BPM));
}

#[test]
fn bpm_buttons_clamp() {
    let mut s = AppState::default();
    assert_eq!(s.double_bpm().get(), 240);
    assert_eq!(s.double_bpm().get(), 480);
    assert_eq!(s.double_bpm().get(), MAX_BPM);
    s.set_bpm(Bpm::clamped(50));
    assert_eq!(s.halve_bpm().get(), MIN_BPM);
    assert_eq!(s.nudge_bpm(10).get(), 40);
    assert_eq!(s.nudge_bpm(-1).get(), 39);
}

#[test]
fn beats_belong_to_the_active_slot() {
    let mut s = AppState::default();
    s.set_beats(4.0).unwrap();
    s.select_slot(3);
    assert_eq!(s.beats().get(), 2.0);
    assert!(s.set_beats(0.0).is_err());
    assert!(s.set_beats_text("lots").is_none());
    assert_eq!(s.beats().get(), 2.0);
    s.select_slot(0);
    assert_eq!(s.beats().get(), 4.0);
}

#[test]
fn select_slot_clamps() {
    let mut s = AppState::default();
    assert_eq!(s.select_slot(42), MAX_SLOTS - 1);
    assert_eq!(s.select_slot(-3), 0);
}

#[test]
fn loading_takes_beats_from_the_file_name() {
    let mut s = AppState::default();
    s.set_beats(3.0).unwrap();
    s.load_loop(loop_named("hop_4B.gif", &[100; 4]));
    assert_eq!(s.beats().get(), 4.0);
    s.set_beats(1.0).unwrap();
    assert_eq!(s.active().content().unwrap().beats.get(), 1.0);
}

#[test]
fn export_needs_a_loaded_loop() {
    let s = AppState::default();
    let err = s.export_active().unwrap_err();
    assert!(err.to_string().contains("No GIF loaded"));
    assert!(s.sync_plan().is_err());
}

#[test]
fn end_to_end_sync_at_double_tempo() {
    let mut s = AppState::default();
    s.load_loop(loop_named("loop_2B.gif", &[100; 10]));
    let plan = s.sync_plan().unwrap();
    assert!((plan.speed_multiplier - 1.0).abs() < 1e-9);

    s.set_bpm(Bpm::clamped(240));
    assert!((s.speed_multiplier() - 2.0).abs() < 1e-9);
    let (plan, bytes) = s.export_active().unwrap();
    assert!(plan.frame_durations_ms.iter().all(|&d| d == 50));
    assert!(bytes.starts_with(b"GIF89a"));
}

#[test]
fn tick_respects_pause() {
    let mut s = AppState::default();
    s.load_loop(loop_named("t_2B.gif", &[100; 10]));
    s.tick(150.0);
    assert_eq!(s.snapshot().slots[0].current_frame, 1);
    assert!(s.toggle_pause());
    s.tick(1000.0);
    assert_eq!(s.snapshot().slots[0].current_frame, 1);
    assert!(!s.toggle_pause());
    s.tick(60.0);
    assert_eq!(s.snapshot().slots[0].current_frame, 2);
}

#[test]
fn tap_sets_bpm() {
    let mut s = AppState::default();
    for i in 0..4u64 {
        s.tap(Duration::from_millis(i * 400));
    }
    assert_eq!(s.bpm().get(), 150);
    assert_eq!(s.tap_count(), 4);
}

#[test]
fn snapshot_serializes() {
    let mut s = AppState::default();
    s.load_loop(loop_named("a_3B.gif", &[40, 60]));
    let v = serde_json::to_value(s.snapshot()).unwrap();
    assert_eq!(v["bpm"], 120);
    assert_eq!(v["beats"], 3.0);
    assert_eq!(v["slots"][0]["is_loaded"], true);
    assert_eq!(v["slots"][0]["name"], "a_3B.gif");
    assert_eq!(v["slots"][0]["frame_count"], 2);
    assert_eq!(v["slots"][0]["native_duration_ms"], 100);
    assert_eq!(v["slots"][1]["is_loaded"], false);
}
