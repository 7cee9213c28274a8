mod batch;
mod catalog;
mod cli;
mod command;
mod error;
mod ffmpeg;
mod filters;
mod inputs;
mod overlay;
mod progress;
mod random;
mod tui;

use anyhow::{Context, Result, anyhow, bail};
use batch::{BatchEvent, spawn_worker};
use clap::Parser;
use cli::{AppConfig, Cli};
use ffmpeg::{Engine, FfmpegEngine, PrintEngine, resolve_tools};
use progress::BatchProgress;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

fn print_effects() {
    for effect in catalog::all() {
        let template = catalog::template(effect.name);
        if template.is_empty() {
            println!("{}", effect.name);
        } else {
            println!("{:<24} {}", effect.name, template);
        }
    }
}

fn print_positions() {
    for p in overlay::positions() {
        println!("{:<14} x={} y={}", p.name, p.x, p.y);
    }
}

fn run(cfg: AppConfig) -> Result<()> {
    let requests = cfg.requests();
    if requests.is_empty() {
        bail!("No video files found in the given inputs");
    }
    info!(files = requests.len(), "queued");

    if cfg.dry_run {
        let program = cfg.ffmpeg.clone().unwrap_or_else(|| PathBuf::from("ffmpeg"));
        let summary = spawn_worker(requests, PrintEngine::new(program), cfg.encode, |_| {})
            .join()
            .map_err(|_| anyhow!("render worker panicked"))?;
        info!(
            succeeded = summary.succeeded(),
            failed = summary.failed(),
            "dry run complete"
        );
        return summary.into_result();
    }

    std::fs::create_dir_all(&cfg.out_dir)
        .with_context(|| format!("failed to create output folder '{}'", cfg.out_dir.display()))?;
    let tools = resolve_tools(cfg.ffmpeg.clone(), cfg.ffprobe.clone())?;

    let ui = BatchProgress::new(requests.len());
    let engine = FfmpegEngine::new(tools, cfg.speed, cfg.verbose, ui.multi());
    info!(ffmpeg = %engine.program().display(), "using engine");

    let bars = ui.clone();
    let summary = spawn_worker(requests, engine, cfg.encode, move |ev| match ev {
        BatchEvent::Started {
            index,
            total,
            input,
        } => bars.start_file(index, total, input),
        BatchEvent::Finished(outcome) => bars.file_done(outcome.result.is_ok(), &outcome.input),
    })
    .join()
    .map_err(|_| anyhow!("render worker panicked"))?;

    ui.finish(summary.succeeded(), summary.failed());
    for done in summary.outcomes.iter().filter(|o| o.result.is_ok()) {
        println!("{} -> {}", done.input.display(), done.output.display());
    }
    println!(
        "{} succeeded, {} failed. Output folder: {}",
        summary.succeeded(),
        summary.failed(),
        cfg.out_dir.display()
    );
    summary.into_result()
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    if cli.list_effects {
        print_effects();
        return Ok(());
    }
    if cli.list_positions {
        print_positions();
        return Ok(());
    }

    let cfg = if cli.interactive {
        tui::interactive_config()?
    } else {
        cli.into_config()?
    };
    run(cfg)
}
