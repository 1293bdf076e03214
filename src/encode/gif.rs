use std::borrow::Cow;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use color_quant::NeuQuant;
use image::RgbaImage;
use rayon::prelude::*;

use crate::encode::sink::{FrameSink, SinkConfig, export_loop};
use crate::foundation::error::{GifBeatError, GifBeatResult};
use crate::loops::model::Loop;
use crate::tempo::sync::SyncPlan;

/// Palette slot reserved for fully transparent pixels unless configured otherwise.
pub const TRANSPARENT_INDEX: u8 = 0;

// Pixels at or above this alpha are treated as opaque.
const ALPHA_CUTOFF: u8 = 128;

/// Options for [`GifSink`] output.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GifSinkOpts {
    /// Local palette index written for transparent pixels.
    pub transparent_index: u8,
    /// NeuQuant sampling factor: 1 looks at every pixel, 30 is fastest.
    pub quant_sample: i32,
}

impl Default for GifSinkOpts {
    fn default() -> Self {
        Self {
            transparent_index: TRANSPARENT_INDEX,
            quant_sample: 10,
        }
    }
}

/// Sink that writes an infinitely looping GIF.
///
/// Frames are buffered until `end`, quantized in parallel (one local palette per frame) and then
/// written in order. Every frame is disposed to background so the next one starts from a clear
/// canvas.
pub struct GifSink<W: Write> {
    out: W,
    opts: GifSinkOpts,
    cfg: Option<SinkConfig>,
    pending: Vec<(RgbaImage, u32)>,
}

impl<W: Write> GifSink<W> {
    pub fn new(out: W, opts: GifSinkOpts) -> Self {
        Self {
            out,
            opts,
            cfg: None,
            pending: Vec::new(),
        }
    }

    /// Recover the writer, e.g. the `Vec<u8>` holding the finished file.
    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> FrameSink for GifSink<W> {
    fn begin(&mut self, cfg: SinkConfig) -> GifBeatResult<()> {
        if cfg.width == 0 || cfg.height == 0 {
            return Err(GifBeatError::validation(
                "gif sink width/height must be non-zero",
            ));
        }
        if cfg.width > u32::from(u16::MAX) || cfg.height > u32::from(u16::MAX) {
            return Err(GifBeatError::validation(format!(
                "gif canvas {}x{} exceeds the format limit of {}",
                cfg.width,
                cfg.height,
                u16::MAX
            )));
        }
        self.pending.clear();
        self.pending.reserve(cfg.frame_count);
        self.cfg = Some(cfg);
        Ok(())
    }

    fn push_frame(&mut self, idx: usize, frame: &RgbaImage, delay_ms: u32) -> GifBeatResult<()> {
        let cfg = self
            .cfg
            .as_ref()
            .ok_or_else(|| GifBeatError::encode("gif sink not started"))?;
        if idx != self.pending.len() {
            return Err(GifBeatError::encode(format!(
                "frame {idx} pushed out of order (expected {})",
                self.pending.len()
            )));
        }
        if frame.dimensions() != (cfg.width, cfg.height) {
            return Err(GifBeatError::validation(format!(
                "frame {idx} is {}x{}, sink expects {}x{}",
                frame.width(),
                frame.height(),
                cfg.width,
                cfg.height
            )));
        }
        self.pending.push((frame.clone(), delay_ms));
        Ok(())
    }

    fn end(&mut self) -> GifBeatResult<()> {
        let cfg = self
            .cfg
            .take()
            .ok_or_else(|| GifBeatError::encode("gif sink not started"))?;
        if self.pending.is_empty() {
            return Err(GifBeatError::encode("no frames to write"));
        }
        // Checked in `begin`.
        let (w, h) = (cfg.width as u16, cfg.height as u16);

        let opts = self.opts;
        let indexed: Vec<IndexedFrame> = self
            .pending
            .par_iter()
            .map(|(img, _)| quantize(img, opts))
            .collect();

        {
            let mut enc = ::gif::Encoder::new(&mut self.out, w, h, &[])?;
            enc.set_repeat(::gif::Repeat::Infinite)?;
            for ((_, delay_ms), q) in self.pending.iter().zip(&indexed) {
                let frame = ::gif::Frame {
                    width: w,
                    height: h,
                    delay: delay_cs(*delay_ms),
                    dispose: ::gif::DisposalMethod::Background,
                    transparent: Some(opts.transparent_index),
                    palette: Some(q.palette.clone()),
                    buffer: Cow::Borrowed(&q.indices),
                    ..Default::default()
                };
                enc.write_frame(&frame)?;
            }
            // Dropping the encoder writes the trailer.
        }
        self.out.flush()?;
        self.pending.clear();
        Ok(())
    }
}

/// GIF delays are stored in hundredths of a second.
fn delay_cs(ms: u32) -> u16 {
    (ms.saturating_add(5) / 10).clamp(1, u32::from(u16::MAX)) as u16
}

struct IndexedFrame {
    palette: Vec<u8>,
    indices: Vec<u8>,
}

fn quantize(img: &RgbaImage, opts: GifSinkOpts) -> IndexedFrame {
    let opaque: Vec<u8> = img
        .pixels()
        .filter(|p| p[3] >= ALPHA_CUTOFF)
        .flat_map(|p| [p[0], p[1], p[2], 255])
        .collect();
    let sample: &[u8] = if opaque.is_empty() {
        &[0, 0, 0, 255]
    } else {
        &opaque
    };
    // 255 colors: one slot stays free for transparency.
    let nq = NeuQuant::new(opts.quant_sample.clamp(1, 30), 255, sample);

    let t = usize::from(opts.transparent_index);
    let colors = nq.color_map_rgb();
    let mut palette = Vec::with_capacity(256 * 3);
    palette.extend_from_slice(&colors[..t * 3]);
    palette.extend_from_slice(&[0, 0, 0]);
    palette.extend_from_slice(&colors[t * 3..]);

    let indices = img
        .pixels()
        .map(|p| {
            if p[3] < ALPHA_CUTOFF {
                return opts.transparent_index;
            }
            let i = nq.index_of(&[p[0], p[1], p[2], 255]);
            if i >= t { (i + 1) as u8 } else { i as u8 }
        })
        .collect();

    IndexedFrame { palette, indices }
}

/// Encode `l` at the tempo in `plan` into an in-memory GIF.
pub fn export_gif_bytes(l: &Loop, plan: &SyncPlan, opts: GifSinkOpts) -> GifBeatResult<Vec<u8>> {
    let mut sink = GifSink::new(Vec::new(), opts);
    export_loop(l, plan, &mut sink)?;
    Ok(sink.into_inner())
}

/// Encode `l` at the tempo in `plan` into a GIF file at `path`, creating parent directories.
pub fn export_gif_file(
    l: &Loop,
    plan: &SyncPlan,
    path: &Path,
    opts: GifSinkOpts,
) -> GifBeatResult<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    let file = File::create(path).map_err(|e| {
        GifBeatError::Io(std::io::Error::new(
            e.kind(),
            format!("create '{}': {e}", path.display()),
        ))
    })?;
    let mut sink = GifSink::new(BufWriter::new(file), opts);
    export_loop(l, plan, &mut sink)
}
