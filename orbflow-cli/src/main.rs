use std::io::Write as _;
use std::path::PathBuf;

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use orbflow::{FixedScroll, GeometrySource, RecordingSink, Scene, Stage, StaticLayout, Viewport};

#[derive(Parser, Debug)]
#[command(name = "orbflow", version)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Parse and validate a scene file.
    Validate(ValidateArgs),
    /// Sweep a scene across scroll offsets and print one JSON frame report per line.
    Sample(SampleArgs),
}

#[derive(Parser, Debug)]
struct ValidateArgs {
    /// Scene JSON.
    #[arg(long)]
    scene: PathBuf,
}

#[derive(Parser, Debug)]
struct SampleArgs {
    /// Scene JSON.
    #[arg(long)]
    scene: PathBuf,

    /// Layout snapshot JSON (element rects and document height).
    #[arg(long)]
    layout: PathBuf,

    /// Viewport width.
    #[arg(long, default_value_t = 1280.0)]
    width: f64,

    /// Viewport height.
    #[arg(long, default_value_t = 800.0)]
    height: f64,

    /// First scroll offset.
    #[arg(long, default_value_t = 0.0)]
    from: f64,

    /// Last scroll offset (defaults to the end of the scrollable range).
    #[arg(long)]
    to: Option<f64>,

    /// Scroll distance between samples.
    #[arg(long, default_value_t = 40.0)]
    step: f64,

    /// Simulated milliseconds between samples.
    #[arg(long, default_value_t = 16.0)]
    frame_ms: f64,

    /// Scroll back to `--from` after reaching `--to`.
    #[arg(long, default_value_t = false)]
    round_trip: bool,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.cmd {
        Command::Validate(args) => cmd_validate(args),
        Command::Sample(args) => cmd_sample(args),
    }
}

fn cmd_validate(args: ValidateArgs) -> anyhow::Result<()> {
    let scene = Scene::from_path(&args.scene)
        .with_context(|| format!("validate scene '{}'", args.scene.display()))?;
    let def = scene.def();
    let elements: usize = def.controllers.iter().map(|c| c.elements.len()).sum();
    println!(
        "ok: {} controllers, {} elements",
        def.controllers.len(),
        elements
    );
    Ok(())
}

fn cmd_sample(args: SampleArgs) -> anyhow::Result<()> {
    anyhow::ensure!(
        args.step.is_finite() && args.step > 0.0,
        "--step must be > 0"
    );
    anyhow::ensure!(
        args.frame_ms.is_finite() && args.frame_ms >= 0.0,
        "--frame-ms must be >= 0"
    );
    let scene = Scene::from_path(&args.scene)?;
    let layout = StaticLayout::from_path(&args.layout)?;
    let viewport = Viewport::new(args.width, args.height)?;
    let to = match args.to {
        Some(to) => to,
        None => {
            let doc = layout
                .document_height()
                .context("layout has no document_height; pass --to")?;
            (doc - viewport.height).max(args.from)
        }
    };

    let mut offsets = sweep(args.from, to, args.step);
    if args.round_trip {
        let back: Vec<f64> = offsets.iter().rev().skip(1).copied().collect();
        offsets.extend(back);
    }

    let mut stage = Stage::new(&scene)?;
    let mut sink = RecordingSink::new();
    let mut now = 0.0;
    stage.mount(now);

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    for offset in offsets {
        now += args.frame_ms;
        stage.on_scroll();
        let scroll = FixedScroll::new(offset, viewport);
        if let Some(report) = stage.on_frame(now, &scroll, &layout, &mut sink) {
            serde_json::to_writer(&mut out, &report).context("write frame report")?;
            writeln!(out).context("write frame report")?;
        }
    }
    stage.unmount();
    tracing::info!(writes = sink.writes(), "sampling done");
    Ok(())
}

fn sweep(from: f64, to: f64, step: f64) -> Vec<f64> {
    let dir = if to >= from { 1.0 } else { -1.0 };
    let n = ((to - from).abs() / step).floor() as usize;
    let mut out: Vec<f64> = (0..=n).map(|i| from + dir * step * i as f64).collect();
    if out.last().is_some_and(|&last| last != to) {
        out.push(to);
    }
    out
}
