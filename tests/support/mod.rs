#![allow(dead_code)]

use std::path::{Path, PathBuf};

/// Encode a small animated GIF: one solid frame per entry of `delays_cs`, cycling colors.
pub fn gif_bytes(width: u16, height: u16, delays_cs: &[u16]) -> Vec<u8> {
    const COLORS: [[u8; 4]; 3] = [[255, 0, 0, 255], [0, 255, 0, 255], [0, 0, 255, 255]];

    let mut out = Vec::new();
    {
        let mut enc = gif::Encoder::new(&mut out, width, height, &[]).unwrap();
        enc.set_repeat(gif::Repeat::Infinite).unwrap();
        for (i, &delay) in delays_cs.iter().enumerate() {
            let px = COLORS[i % COLORS.len()];
            let mut rgba: Vec<u8> = std::iter::repeat_n(px, usize::from(width) * usize::from(height))
                .flatten()
                .collect();
            let mut frame = gif::Frame::from_rgba_speed(width, height, &mut rgba, 30);
            frame.delay = delay;
            enc.write_frame(&frame).unwrap();
        }
    }
    out
}

/// Scratch directory under `target/` for one test file.
pub fn scratch_dir(name: &str) -> PathBuf {
    let dir = PathBuf::from("target").join(name);
    std::fs::create_dir_all(&dir).unwrap();
    dir
}

pub fn write_gif(dir: &Path, file_name: &str, delays_cs: &[u16]) -> PathBuf {
    let path = dir.join(file_name);
    std::fs::write(&path, gif_bytes(8, 8, delays_cs)).unwrap();
    path
}

/// Frame delays of a GIF in milliseconds, as `image` reports them.
pub fn decoded_delays_ms(bytes: &[u8]) -> Vec<u32> {
    use image::AnimationDecoder as _;

    let dec = image::codecs::gif::GifDecoder::new(std::io::Cursor::new(bytes)).unwrap();
    dec.into_frames()
        .collect_frames()
        .unwrap()
        .into_iter()
        .map(|f| {
            let (n, d) = f.delay().numer_denom_ms();
            n / d
        })
        .collect()
}
