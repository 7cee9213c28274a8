use crate::command::CommandInvocation;
use crate::error::RenderError;
use crate::progress::{ProgressUi, pump_progress};
use anyhow::{Context, Result, anyhow, bail};
use indicatif::MultiProgress;
use std::path::{Path, PathBuf};
use std::process::{Child, ChildStdout, Command, Stdio};
use tracing::{debug, info, warn};
use which::which;

#[derive(Debug, Clone)]
pub struct Tools {
    pub ffmpeg: PathBuf,
    pub ffprobe: Option<PathBuf>,
}

#[derive(Debug)]
pub struct FfmpegSession {
    pub child: Child,
    pub stdout: ChildStdout,
}

/// Runs one finished invocation to completion.
pub trait Engine {
    fn program(&self) -> &Path;
    fn render(&self, invocation: &CommandInvocation, input: &Path) -> Result<(), RenderError>;
}

/// ffprobe only feeds the progress bar, so a missing one is tolerated.
pub fn resolve_tools(ffmpeg: Option<PathBuf>, ffprobe: Option<PathBuf>) -> Result<Tools> {
    let ffprobe = match resolve_bin(ffprobe, "ffprobe") {
        Ok(p) => Some(p),
        Err(err) => {
            warn!("{err:#}; progress will be indeterminate");
            None
        }
    };
    Ok(Tools {
        ffmpeg: resolve_bin(ffmpeg, "ffmpeg")?,
        ffprobe,
    })
}

pub fn probe_duration_seconds(ffprobe: &Path, input: &Path) -> Result<f64> {
    let out = Command::new(ffprobe)
        .arg("-v")
        .arg("error")
        .arg("-show_entries")
        .arg("format=duration")
        .arg("-of")
        .arg("default=noprint_wrappers=1:nokey=1")
        .arg(input)
        .output()
        .context("failed to run ffprobe")?;
    if !out.status.success() {
        bail!("ffprobe error (status {})", out.status);
    }
    let s = String::from_utf8_lossy(&out.stdout).trim().to_string();
    s.parse::<f64>().context("cannot parse duration")
}

/// Expected output length in ms once the speed factor is applied.
pub fn target_duration_ms(original_seconds: f64, speed_percent: u16) -> u64 {
    let factor = speed_percent as f64 / 100.0;
    ((original_seconds / factor) * 1000.0).max(1.0) as u64
}

fn engine_flags(verbose: bool) -> Vec<&'static str> {
    let mut flags = Vec::new();
    if !verbose {
        flags.extend(["-hide_banner", "-nostats", "-loglevel", "error"]);
    }
    flags.extend(["-progress", "-"]);
    flags
}

pub fn spawn_ffmpeg(
    invocation: &CommandInvocation,
    verbose: bool,
) -> Result<FfmpegSession, RenderError> {
    let mut cmd = invocation.to_command(engine_flags(verbose));
    hide_console(&mut cmd);

    let mut child = cmd
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(if verbose {
            Stdio::inherit()
        } else {
            Stdio::null()
        })
        .spawn()
        .map_err(RenderError::Spawn)?;

    let stdout = child
        .stdout
        .take()
        .ok_or_else(|| anyhow!("failed to capture ffmpeg stdout"))?;

    Ok(FfmpegSession { child, stdout })
}

pub fn wait_for_completion(mut child: Child) -> Result<(), RenderError> {
    let status = child.wait().map_err(RenderError::Spawn)?;
    if !status.success() {
        return Err(RenderError::EngineFailed(status));
    }
    Ok(())
}

#[cfg(windows)]
fn hide_console(cmd: &mut Command) {
    use std::os::windows::process::CommandExt;
    const CREATE_NO_WINDOW: u32 = 0x0800_0000;
    cmd.creation_flags(CREATE_NO_WINDOW);
}

#[cfg(not(windows))]
fn hide_console(_cmd: &mut Command) {}

pub struct FfmpegEngine {
    tools: Tools,
    speed_percent: u16,
    verbose: bool,
    multi: MultiProgress,
}

impl FfmpegEngine {
    pub fn new(tools: Tools, speed_percent: u16, verbose: bool, multi: MultiProgress) -> Self {
        Self {
            tools,
            speed_percent,
            verbose,
            multi,
        }
    }

    fn expected_ms(&self, input: &Path) -> Option<u64> {
        let ffprobe = self.tools.ffprobe.as_deref()?;
        match probe_duration_seconds(ffprobe, input) {
            Ok(secs) => Some(target_duration_ms(secs, self.speed_percent)),
            Err(err) => {
                warn!(input = %input.display(), "{err:#}");
                None
            }
        }
    }
}

impl Engine for FfmpegEngine {
    fn program(&self) -> &Path {
        &self.tools.ffmpeg
    }

    fn render(&self, invocation: &CommandInvocation, input: &Path) -> Result<(), RenderError> {
        let total_ms = self.expected_ms(input);
        debug!(command = %invocation, "spawning ffmpeg");

        let FfmpegSession { child, stdout } = spawn_ffmpeg(invocation, self.verbose)?;
        let ui = ProgressUi::new(&self.multi, total_ms, input);
        let reader = pump_progress(stdout, ui);

        let result = wait_for_completion(child);
        match reader.join() {
            Ok(Err(err)) => warn!("progress reader failed: {err:#}"),
            Err(_) => warn!("progress reader panicked"),
            Ok(Ok(())) => {}
        }
        result
    }
}

/// Prints each invocation instead of running it.
pub struct PrintEngine {
    program: PathBuf,
}

impl PrintEngine {
    pub fn new(program: PathBuf) -> Self {
        Self { program }
    }
}

impl Engine for PrintEngine {
    fn program(&self) -> &Path {
        &self.program
    }

    fn render(&self, invocation: &CommandInvocation, input: &Path) -> Result<(), RenderError> {
        info!(input = %input.display(), "dry run");
        println!("{invocation}");
        Ok(())
    }
}

fn resolve_bin(bin_opt: Option<PathBuf>, default: &str) -> Result<PathBuf> {
    if let Some(path) = bin_opt {
        if path.is_file() {
            return Ok(path);
        }
        bail!("Provided binary not found: {}", path.display());
    }

    which(default)
        .or_else(|_| {
            if cfg!(windows) {
                let exe = format!("{default}.exe");
                which(&exe)
            } else {
                Err(which::Error::CannotFindBinaryPath)
            }
        })
        .with_context(|| format!("`{default}` not found in PATH"))
}
