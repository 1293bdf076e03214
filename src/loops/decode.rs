use std::fs::File;
use std::io::{BufRead, BufReader, Cursor, Seek};
use std::path::Path;

use image::AnimationDecoder as _;
use image::codecs::gif::GifDecoder;

use crate::foundation::core::Beats;
use crate::foundation::error::{GifBeatError, GifBeatResult};
use crate::loops::model::{Loop, LoopFrame};
use crate::tempo::names::infer_beats;

/// Native duration given to frames that carry no delay (or a zero delay).
pub const DEFAULT_FRAME_MS: u32 = 100;

/// Decode an in-memory GIF. The beat count is inferred from `name`.
#[tracing::instrument(skip(bytes), fields(len = bytes.len()))]
pub fn decode_gif_bytes(name: &str, bytes: &[u8]) -> GifBeatResult<Loop> {
    decode_gif(name, Cursor::new(bytes))
}

/// Read and decode a GIF file. The beat count is inferred from the file name.
#[tracing::instrument]
pub fn load_gif(path: &Path) -> GifBeatResult<Loop> {
    let file = File::open(path).map_err(|e| {
        GifBeatError::Io(std::io::Error::new(
            e.kind(),
            format!("open '{}': {e}", path.display()),
        ))
    })?;
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    decode_gif(&name, BufReader::new(file))
}

fn decode_gif<R: BufRead + Seek>(name: &str, reader: R) -> GifBeatResult<Loop> {
    let decoder = GifDecoder::new(reader)
        .map_err(|e| GifBeatError::decode(format!("'{name}' is not a readable GIF: {e}")))?;
    let raw = decoder
        .into_frames()
        .collect_frames()
        .map_err(|e| GifBeatError::decode(format!("'{name}': {e}")))?;
    if raw.is_empty() {
        return Err(GifBeatError::decode(format!("'{name}' contains no frames")));
    }

    let frames = raw
        .into_iter()
        .map(|f| {
            let native_ms = delay_ms(f.delay());
            LoopFrame {
                image: f.into_buffer(),
                native_ms,
            }
        })
        .collect();

    let beats = Beats::new(infer_beats(name))?;
    let l = Loop::new(name, frames, beats)?;
    tracing::debug!(
        frames = l.frame_count(),
        native_total_ms = l.native_total_ms(),
        beats = %l.beats,
        "decoded gif"
    );
    Ok(l)
}

fn delay_ms(delay: image::Delay) -> u32 {
    let (num, den) = delay.numer_denom_ms();
    if den == 0 {
        return DEFAULT_FRAME_MS;
    }
    match (f64::from(num) / f64::from(den)).round() as u32 {
        0 => DEFAULT_FRAME_MS,
        ms => ms,
    }
}
