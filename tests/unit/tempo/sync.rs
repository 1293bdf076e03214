use super::*;

fn approx_eq(a: f64, b: f64) -> bool {
    (a - b).abs() <= 1e-9 * a.abs().max(b.abs()).max(1.0)
}

#[test]
fn multiplier_times_target_recovers_native_total() {
    for &bpm in &[30.0, 87.5, 120.0, 174.0, 600.0] {
        for &beats in &[0.5, 1.0, 2.0, 3.0, 8.0] {
            for &total in &[20.0, 333.0, 1000.0, 4810.0] {
                let m = compute_speed_multiplier(bpm, beats, total);
                assert!(m > 0.0);
                assert!(approx_eq(m * target_duration_ms(bpm, beats), total));
            }
        }
    }
}

#[test]
fn multiplier_is_pure() {
    let a = compute_speed_multiplier(133.0, 3.0, 1234.0);
    let b = compute_speed_multiplier(133.0, 3.0, 1234.0);
    assert_eq!(a.to_bits(), b.to_bits());
}

#[test]
fn unusable_inputs_fall_back_to_native_speed() {
    assert_eq!(compute_speed_multiplier(0.0, 2.0, 1000.0), 1.0);
    assert_eq!(compute_speed_multiplier(-120.0, 2.0, 1000.0), 1.0);
    assert_eq!(compute_speed_multiplier(120.0, 0.0, 1000.0), 1.0);
    assert_eq!(compute_speed_multiplier(120.0, 2.0, 0.0), 1.0);
    assert_eq!(compute_speed_multiplier(f64::NAN, 2.0, 1000.0), 1.0);
}

#[test]
fn reference_cases() {
    // 1000ms loop spanning 2 beats.
    assert!(approx_eq(compute_speed_multiplier(120.0, 2.0, 1000.0), 1.0));
    assert!(approx_eq(compute_speed_multiplier(60.0, 2.0, 1000.0), 0.5));
    assert!(approx_eq(compute_speed_multiplier(240.0, 2.0, 1000.0), 2.0));
    assert!(approx_eq(compute_speed_multiplier(120.0, 4.0, 1000.0), 0.5));
    assert!(approx_eq(compute_speed_multiplier(120.0, 1.0, 1000.0), 2.0));
    assert!(approx_eq(target_duration_ms(240.0, 2.0), 500.0));
}

#[test]
fn adjusted_duration_never_below_floor() {
    for &mult in &[1.0, 10.0, 1e3, 1e9, f64::MAX] {
        for &native in &[0, 1, 20, 100, 65_535] {
            assert!(adjusted_frame_duration(native, mult, MIN_FRAME_MS) >= MIN_FRAME_MS);
        }
    }
    assert_eq!(adjusted_frame_duration(100, 1000.0, 20), 20);
    assert_eq!(adjusted_frame_duration(100, 1000.0, 35), 35);
}

#[test]
fn adjusted_duration_rounds_and_ignores_bad_multiplier() {
    assert_eq!(adjusted_frame_duration(100, 3.0, 20), 33);
    assert_eq!(adjusted_frame_duration(100, 0.6, 20), 167);
    assert_eq!(adjusted_frame_duration(100, 0.0, 20), 100);
    assert_eq!(adjusted_frame_duration(100, f64::NAN, 20), 100);
}

#[test]
fn plan_at_double_tempo_halves_every_frame() {
    let native = [100u32; 10];
    let plan = SyncPlan::new(
        Bpm::clamped(240),
        Beats::new(2.0).unwrap(),
        &native,
        MIN_FRAME_MS,
    );
    assert_eq!(plan.native_total_ms, 1000);
    assert!(approx_eq(plan.target_duration_ms, 500.0));
    assert!(approx_eq(plan.speed_multiplier, 2.0));
    assert!(plan.frame_durations_ms.iter().all(|&d| d == 50));
    assert_eq!(plan.adjusted_total_ms(), 500);
}

#[test]
fn plan_at_matching_tempo_is_unchanged() {
    let native = [40u32, 60, 100, 300, 500];
    let plan = SyncPlan::new(
        Bpm::clamped(120),
        Beats::new(2.0).unwrap(),
        &native,
        MIN_FRAME_MS,
    );
    assert!(approx_eq(plan.speed_multiplier, 1.0));
    assert_eq!(plan.frame_durations_ms, native.to_vec());
}

#[test]
fn plan_floors_short_frames() {
    let native = [30u32, 30, 30, 1010];
    let plan = SyncPlan::new(
        Bpm::clamped(480),
        Beats::new(2.0).unwrap(),
        &native,
        MIN_FRAME_MS,
    );
    // 1100ms -> 250ms, so the 30ms frames would drop to about 7ms.
    assert!(approx_eq(plan.speed_multiplier, 4.4));
    assert_eq!(&plan.frame_durations_ms[..3], &[20, 20, 20]);
    assert_eq!(plan.frame_durations_ms[3], 230);
}

#[test]
fn export_file_name_uses_tempo_and_beats() {
    let plan = SyncPlan::new(Bpm::clamped(128), Beats::new(4.0).unwrap(), &[100], 20);
    assert_eq!(plan.export_file_name(), "synced_128bpm_4beats.gif");
    let plan = SyncPlan::new(Bpm::clamped(90), Beats::new(1.5).unwrap(), &[100], 20);
    assert_eq!(plan.export_file_name(), "synced_90bpm_1.5beats.gif");
}
