mod support;

use gifbeat::{
    Beats, Bpm, GifSinkOpts, InMemorySink, Loop, LoopFrame, decode_gif_bytes, export_gif_bytes,
    export_loop,
};
use image::{Rgba, RgbaImage};

#[test]
fn double_tempo_halves_every_delay() {
    let src = support::gif_bytes(6, 4, &[10; 8]);
    let l = decode_gif_bytes("spin_2B.gif", &src).unwrap();
    assert_eq!(l.native_total_ms(), 800);
    assert_eq!(l.beats.get(), 2.0);

    // 2 beats at 300 bpm = 400 ms.
    let plan = l.sync_plan(Bpm::clamped(300), gifbeat::MIN_FRAME_MS);
    assert!((plan.speed_multiplier - 2.0).abs() < 1e-9);

    let out = export_gif_bytes(&l, &plan, GifSinkOpts::default()).unwrap();
    assert_eq!(support::decoded_delays_ms(&out), vec![50; 8]);

    let again = decode_gif_bytes("again.gif", &out).unwrap();
    assert_eq!((again.width(), again.height()), (6, 4));
    assert_eq!(again.native_total_ms(), 400);
}

#[test]
fn fast_tempo_respects_the_frame_floor() {
    let src = support::gif_bytes(4, 4, &[4; 10]);
    let l = decode_gif_bytes("tiny_1B.gif", &src).unwrap();
    let plan = l.sync_plan(Bpm::clamped(600), gifbeat::MIN_FRAME_MS);
    assert!(plan.frame_durations_ms.iter().all(|&d| d == 20));

    let out = export_gif_bytes(&l, &plan, GifSinkOpts::default()).unwrap();
    assert_eq!(support::decoded_delays_ms(&out), vec![20; 10]);
}

#[test]
fn sink_sees_frames_in_order() {
    let src = support::gif_bytes(3, 3, &[10, 20, 30]);
    let l = decode_gif_bytes("order.gif", &src).unwrap();
    let plan = l.sync_plan(Bpm::clamped(120), gifbeat::MIN_FRAME_MS);

    let mut sink = InMemorySink::new();
    export_loop(&l, &plan, &mut sink).unwrap();
    assert!(sink.is_finished());
    assert_eq!(sink.delays_ms(), plan.frame_durations_ms);
    assert_eq!(sink.frames().len(), 3);
}

#[test]
fn export_file_creates_parent_dirs() {
    let dir = support::scratch_dir("export_gif").join("nested");
    let _ = std::fs::remove_dir_all(&dir);

    let src = support::gif_bytes(4, 4, &[10; 4]);
    let l = decode_gif_bytes("file_4B.gif", &src).unwrap();
    let plan = l.sync_plan(Bpm::clamped(240), gifbeat::MIN_FRAME_MS);
    let path = dir.join(plan.export_file_name());
    gifbeat::export_gif_file(&l, &plan, &path, GifSinkOpts::default()).unwrap();

    assert!(path.ends_with("synced_240bpm_4beats.gif"));
    let bytes = std::fs::read(&path).unwrap();
    // 4 beats at 240 bpm = 1000 ms over 4 frames.
    assert_eq!(support::decoded_delays_ms(&bytes), vec![250; 4]);
}

#[test]
fn written_gif_loops_forever_and_clears_each_frame() {
    // Left half fully transparent, right half opaque.
    let (w, h) = (4u32, 2u32);
    let img = RgbaImage::from_fn(w, h, |x, _| {
        if x < 2 {
            Rgba([0, 0, 0, 0])
        } else {
            Rgba([200, 30, 30, 255])
        }
    });
    let frames = (0..3)
        .map(|_| LoopFrame {
            image: img.clone(),
            native_ms: 100,
        })
        .collect();
    let l = Loop::new("alpha.gif", frames, Beats::default()).unwrap();
    let plan = l.sync_plan(Bpm::clamped(120), gifbeat::MIN_FRAME_MS);
    let out = export_gif_bytes(&l, &plan, GifSinkOpts::default()).unwrap();

    let mut opts = gif::DecodeOptions::new();
    opts.set_color_output(gif::ColorOutput::Indexed);
    let mut dec = opts.read_info(std::io::Cursor::new(&out)).unwrap();

    let mut count = 0;
    while let Some(frame) = dec.read_next_frame().unwrap() {
        assert_eq!(frame.dispose, gif::DisposalMethod::Background);
        assert_eq!(frame.transparent, Some(0));
        assert!(frame.palette.is_some());
        for (i, &idx) in frame.buffer.iter().enumerate() {
            if (i as u32) % w < 2 {
                assert_eq!(idx, 0, "pixel {i} should be transparent");
            } else {
                assert_ne!(idx, 0, "pixel {i} should be opaque");
            }
        }
        count += 1;
    }
    assert_eq!(count, 3);
    assert_eq!(dec.repeat(), gif::Repeat::Infinite);
}
