use std::{
    io::BufRead as _,
    net::{IpAddr, SocketAddr},
    path::PathBuf,
    time::Instant,
};

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "gifbeat", version)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print timing information for a GIF at a tempo.
    Info(InfoArgs),
    /// Write a copy of a GIF retimed to a tempo.
    Export(ExportArgs),
    /// Simulate playback and print every frame change.
    Timeline(TimelineArgs),
    /// Solve frame timing for authoring a beat-synced loop.
    Calc(CalcArgs),
    /// Print the reference timing table.
    Table,
    /// Tap Enter to the beat; prints the running tempo. Ctrl-D to stop.
    Tap,
    /// Serve the HTTP API.
    Serve(ServeArgs),
}

#[derive(Parser, Debug)]
struct TempoArgs {
    /// Input GIF.
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Target tempo, clamped to 30..=600.
    #[arg(long, default_value_t = gifbeat::DEFAULT_BPM as f64)]
    bpm: f64,

    /// Beats per loop. Defaults to the `_NB` filename suffix, or 2.
    #[arg(long)]
    beats: Option<f64>,
}

#[derive(Parser, Debug)]
struct InfoArgs {
    #[command(flatten)]
    tempo: TempoArgs,

    /// Print the result as JSON.
    #[arg(long)]
    json: bool,
}

#[derive(Parser, Debug)]
struct ExportArgs {
    #[command(flatten)]
    tempo: TempoArgs,

    /// Output GIF path. Defaults to `synced_{bpm}bpm_{beats}beats.gif` next to the input.
    #[arg(long)]
    out: Option<PathBuf>,

    /// Floor for exported frame delays.
    #[arg(long, default_value_t = gifbeat::MIN_FRAME_MS)]
    min_frame_ms: u32,
}

#[derive(Parser, Debug)]
struct TimelineArgs {
    #[command(flatten)]
    tempo: TempoArgs,

    /// Simulated wall time.
    #[arg(long, default_value_t = 2000)]
    ms: u64,

    /// Clock tick.
    #[arg(long, default_value_t = 10)]
    step: u64,
}

#[derive(Parser, Debug)]
struct CalcArgs {
    #[arg(long)]
    bpm: Option<f64>,

    #[arg(long)]
    beats: Option<f64>,

    #[arg(long)]
    frames_per_beat: Option<f64>,

    #[arg(long)]
    total_frames: Option<u32>,

    /// Stem used for the suggested output filename.
    #[arg(long, default_value = "animation")]
    name: String,
}

#[derive(Parser, Debug)]
struct ServeArgs {
    /// Interface to bind.
    #[arg(long, default_value = "0.0.0.0")]
    addr: IpAddr,

    #[arg(long, env = "PORT", default_value_t = gifbeat::server::config::DEFAULT_PORT)]
    port: u16,

    /// Largest accepted upload, in MiB.
    #[arg(long, default_value_t = 32)]
    max_upload_mb: usize,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.cmd {
        Command::Info(args) => cmd_info(args),
        Command::Export(args) => cmd_export(args),
        Command::Timeline(args) => cmd_timeline(args),
        Command::Calc(args) => cmd_calc(args),
        Command::Table => cmd_table(),
        Command::Tap => cmd_tap(),
        Command::Serve(args) => cmd_serve(args),
    }
}

/// Decode the input and apply the requested beat count.
fn load(args: &TempoArgs) -> anyhow::Result<(gifbeat::Loop, gifbeat::Bpm)> {
    let mut l = gifbeat::load_gif(&args.in_path)
        .with_context(|| format!("load gif '{}'", args.in_path.display()))?;
    if let Some(beats) = args.beats {
        l.beats = gifbeat::Beats::new(beats)?;
    }
    let bpm = gifbeat::Bpm::from_f64(args.bpm)?;
    Ok((l, bpm))
}

fn cmd_info(args: InfoArgs) -> anyhow::Result<()> {
    let (l, bpm) = load(&args.tempo)?;
    let plan = l.sync_plan(bpm, gifbeat::MIN_FRAME_MS);

    if args.json {
        println!("{}", serde_json::to_string_pretty(&plan)?);
        return Ok(());
    }

    println!("file:             {}", l.name());
    println!("size:             {}x{}", l.width(), l.height());
    println!("frames:           {}", l.frame_count());
    println!("native total:     {} ms", plan.native_total_ms);
    println!("beats:            {}", plan.beats);
    println!("bpm:              {}", plan.bpm);
    println!("target duration:  {:.1} ms", plan.target_duration_ms);
    println!("speed multiplier: {:.3}x", plan.speed_multiplier);
    println!("adjusted total:   {} ms", plan.adjusted_total_ms());
    println!("frame delays:     {:?}", plan.frame_durations_ms);
    Ok(())
}

fn cmd_export(args: ExportArgs) -> anyhow::Result<()> {
    let (l, bpm) = load(&args.tempo)?;
    let plan = l.sync_plan(bpm, args.min_frame_ms);

    let out = args.out.unwrap_or_else(|| {
        args.tempo
            .in_path
            .with_file_name(plan.export_file_name())
    });

    gifbeat::export_gif_file(&l, &plan, &out, gifbeat::GifSinkOpts::default())
        .with_context(|| format!("write gif '{}'", out.display()))?;

    eprintln!(
        "wrote {} ({} frames, {:.3}x, {} ms)",
        out.display(),
        l.frame_count(),
        plan.speed_multiplier,
        plan.adjusted_total_ms()
    );
    Ok(())
}

fn cmd_timeline(args: TimelineArgs) -> anyhow::Result<()> {
    anyhow::ensure!(args.step > 0, "--step must be > 0");
    let (l, bpm) = load(&args.tempo)?;
    let mult = l.sync_plan(bpm, gifbeat::MIN_FRAME_MS).speed_multiplier;

    let mut player = gifbeat::Player::new();
    println!("{:>8}  frame", "ms");
    println!("{:>8}  {}", 0, player.current_frame());

    let mut t = 0;
    while t < args.ms {
        let dt = args.step.min(args.ms - t);
        t += dt;
        if player.advance(dt as f64, &l, mult) {
            println!("{t:>8}  {}", player.current_frame());
        }
    }
    Ok(())
}

fn cmd_calc(args: CalcArgs) -> anyhow::Result<()> {
    let timing = gifbeat::calculate_animation_timing(gifbeat::TimingQuery {
        bpm: args.bpm,
        beat_count: args.beats,
        frames_per_beat: args.frames_per_beat,
        total_frames: args.total_frames,
    })?;

    println!("bpm:             {}", timing.bpm);
    println!("beats:           {}", timing.beat_count);
    println!("frames per beat: {}", timing.frames_per_beat);
    println!("total frames:    {}", timing.total_frames);
    println!("loop duration:   {:.3} s", timing.loop_duration_secs);
    println!("frame duration:  {:.2} ms", timing.frame_duration_ms);
    println!("file name:       {}", timing.suggested_file_name(&args.name));
    Ok(())
}

fn cmd_table() -> anyhow::Result<()> {
    println!(
        "{:>5} {:>6} {:>6} {:>7} {:>10} {:>10}",
        "bpm", "beats", "fpb", "frames", "loop (s)", "frame ms"
    );
    for t in gifbeat::reference_table() {
        println!(
            "{:>5} {:>6} {:>6} {:>7} {:>10.3} {:>10.2}",
            t.bpm,
            t.beat_count,
            t.frames_per_beat,
            t.total_frames,
            t.loop_duration_secs,
            t.frame_duration_ms
        );
    }
    Ok(())
}

fn cmd_tap() -> anyhow::Result<()> {
    let mut tap = gifbeat::TapTempo::default();
    let epoch = Instant::now();
    eprintln!("press Enter on each beat, Ctrl-D to finish");

    let stdin = std::io::stdin();
    for line in stdin.lock().lines() {
        line.context("read stdin")?;
        match tap.tap(epoch.elapsed()) {
            Some(bpm) => println!("{bpm} bpm ({} taps)", tap.tap_count()),
            None => println!("... ({} taps)", tap.tap_count()),
        }
    }
    if let Some(bpm) = tap.estimate() {
        println!("final: {bpm} bpm");
    }
    Ok(())
}

fn cmd_serve(args: ServeArgs) -> anyhow::Result<()> {
    let cfg = gifbeat::ServerConfig {
        listen_addr: SocketAddr::new(args.addr, args.port),
        max_upload_bytes: args.max_upload_mb.saturating_mul(1024 * 1024),
        ..gifbeat::ServerConfig::default()
    };

    let rt = tokio::runtime::Runtime::new().context("start tokio runtime")?;
    rt.block_on(gifbeat::run_server(cfg))?;
    Ok(())
}
