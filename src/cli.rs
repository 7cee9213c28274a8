use crate::catalog;
use crate::command::{EncodeSettings, RenderRequest};
use crate::filters::{validate_scale_percent, validate_speed_percent};
use crate::inputs::{collect_inputs, output_path_for};
use crate::overlay::{self, DEFAULT_POSITION};
use anyhow::{Result, bail};
use clap::{ArgAction, Parser, ValueHint};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::warn;

#[derive(Parser, Debug)]
#[command(
    name = "video_fx",
    version,
    about = "Apply effects, scale, speed and an overlay to a batch of videos with ffmpeg"
)]
pub struct Cli {
    /// Video files or folders (folders are searched recursively)
    #[arg(
        value_hint = ValueHint::AnyPath,
        required_unless_present_any = ["interactive", "list_effects", "list_positions"]
    )]
    pub inputs: Vec<PathBuf>,

    /// Folder for rendered files (<name>_fx.mp4)
    #[arg(short = 'o', long, default_value = "rendered", value_hint = ValueHint::DirPath)]
    pub out_dir: PathBuf,

    /// Effect to apply; repeat to chain, applied in the given order
    #[arg(short = 'e', long = "effect", value_name = "NAME")]
    pub effects: Vec<String>,

    /// Scale in percent (10..300, 100 = unchanged); frame size is kept
    #[arg(long, default_value = "100", value_parser = validate_scale_percent)]
    pub scale: u16,

    /// Playback speed in percent (50..200, 100 = unchanged)
    #[arg(long, default_value = "100", value_parser = validate_speed_percent)]
    pub speed: u16,

    /// Image or video composited over every clip
    #[arg(long, value_hint = ValueHint::FilePath)]
    pub overlay: Option<PathBuf>,

    /// Overlay anchor, e.g. Top-Left, Middle-Center, Bottom-Right
    #[arg(long, default_value = DEFAULT_POSITION)]
    pub position: String,

    /// x264 CRF
    #[arg(long, default_value = "23")]
    pub crf: u8,

    /// AAC audio bitrate
    #[arg(long, default_value = "192k")]
    pub audio_bitrate: String,

    /// Print the ffmpeg commands instead of running them
    #[arg(long, action = ArgAction::SetTrue)]
    pub dry_run: bool,

    /// List available effects and exit
    #[arg(long, action = ArgAction::SetTrue)]
    pub list_effects: bool,

    /// List overlay positions and exit
    #[arg(long, action = ArgAction::SetTrue)]
    pub list_positions: bool,

    /// Prompt for every setting
    #[arg(short = 'i', long, action = ArgAction::SetTrue)]
    pub interactive: bool,

    /// Show raw ffmpeg logs and debug messages
    #[arg(long, action = ArgAction::SetTrue)]
    pub verbose: bool,

    /// Path to ffmpeg binary (overrides PATH lookup)
    #[arg(long, env = "VIDEO_FX_FFMPEG", value_hint = ValueHint::ExecutablePath)]
    pub ffmpeg: Option<PathBuf>,

    /// Path to ffprobe binary (overrides PATH lookup)
    #[arg(long, env = "VIDEO_FX_FFPROBE", value_hint = ValueHint::ExecutablePath)]
    pub ffprobe: Option<PathBuf>,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub inputs: Vec<PathBuf>,
    pub out_dir: PathBuf,
    pub effects: Vec<String>,
    pub scale: u16,
    pub speed: u16,
    pub overlay: Option<PathBuf>,
    pub position: String,
    pub encode: EncodeSettings,
    pub dry_run: bool,
    pub verbose: bool,
    pub ffmpeg: Option<PathBuf>,
    pub ffprobe: Option<PathBuf>,
}

impl Cli {
    pub fn into_config(self) -> Result<AppConfig> {
        if self.inputs.is_empty() {
            bail!("No inputs given");
        }
        let encode = EncodeSettings {
            crf: self.crf,
            audio_bitrate: self.audio_bitrate,
            ..EncodeSettings::default()
        };
        let cfg = AppConfig {
            inputs: self.inputs,
            out_dir: self.out_dir,
            effects: self.effects,
            scale: self.scale,
            speed: self.speed,
            overlay: self.overlay,
            position: self.position,
            encode,
            dry_run: self.dry_run,
            verbose: self.verbose,
            ffmpeg: self.ffmpeg,
            ffprobe: self.ffprobe,
        };
        cfg.warn_unknown_names();
        Ok(cfg)
    }
}

impl AppConfig {
    /// Unknown names still pass through; they just render as nothing.
    pub fn warn_unknown_names(&self) {
        for name in &self.effects {
            if catalog::lookup(name).is_none() {
                warn!(effect = %name, "unknown effect, it will be skipped");
            }
        }
        if !overlay::positions().iter().any(|p| p.name == self.position) {
            warn!(position = %self.position, "unknown overlay position, using top-left corner (0,0)");
        }
        if let Some(path) = &self.overlay {
            if !path.is_file() {
                warn!(overlay = %path.display(), "overlay not found, rendering without it");
            }
        }
    }

    /// One request per discovered video, in input order.
    pub fn requests(&self) -> Vec<RenderRequest> {
        let requests: Vec<RenderRequest> = collect_inputs(&self.inputs)
            .into_iter()
            .map(|input| RenderRequest {
                output: output_path_for(&input, &self.out_dir),
                input,
                effects: self.effects.clone(),
                scale_percent: self.scale,
                speed_percent: self.speed,
                overlay: self.overlay.clone(),
                overlay_position: self.position.clone(),
            })
            .collect();
        for (earlier, later) in colliding_outputs(&requests) {
            warn!(
                output = %later.output.display(),
                first = %earlier.input.display(),
                second = %later.input.display(),
                "two inputs render to the same file, the later one overwrites it"
            );
        }
        requests
    }
}

/// Pairs of requests whose output path was already claimed by an earlier one.
fn colliding_outputs(requests: &[RenderRequest]) -> Vec<(&RenderRequest, &RenderRequest)> {
    let mut claimed: HashMap<&Path, &RenderRequest> = HashMap::new();
    let mut clashes = Vec::new();
    for req in requests {
        match claimed.get(req.output.as_path()) {
            Some(first) => clashes.push((*first, req)),
            None => {
                claimed.insert(&req.output, req);
            }
        }
    }
    clashes
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use std::ffi::OsString;
    use std::fs;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_defaults() {
        let cli = Cli::try_parse_from(["video_fx", "a.mp4"]).unwrap();
        assert_eq!(cli.scale, 100);
        assert_eq!(cli.speed, 100);
        assert_eq!(cli.crf, 23);
        assert_eq!(cli.position, "Bottom-Right");
        assert!(cli.effects.is_empty());
    }

    #[test]
    fn test_effects_keep_order_and_duplicates() {
        let cli = Cli::try_parse_from([
            "video_fx", "a.mp4", "-e", "VHS", "-e", "Sepia", "-e", "VHS",
        ])
        .unwrap();
        assert_eq!(cli.effects, ["VHS", "Sepia", "VHS"]);
    }

    #[test]
    fn test_bounds_rejected() {
        assert!(Cli::try_parse_from(["video_fx", "a.mp4", "--scale", "5"]).is_err());
        assert!(Cli::try_parse_from(["video_fx", "a.mp4", "--scale", "301"]).is_err());
        assert!(Cli::try_parse_from(["video_fx", "a.mp4", "--speed", "49"]).is_err());
        assert!(Cli::try_parse_from(["video_fx", "a.mp4", "--speed", "250"]).is_err());
        assert!(Cli::try_parse_from(["video_fx", "a.mp4", "--speed", "200"]).is_ok());
    }

    #[test]
    fn test_inputs_required_unless_listing() {
        assert!(Cli::try_parse_from(["video_fx"]).is_err());
        assert!(Cli::try_parse_from(["video_fx", "--list-effects"]).is_ok());
        assert!(Cli::try_parse_from(["video_fx", "-i"]).is_ok());
    }

    #[test]
    fn test_same_stem_in_two_folders_collides() {
        let dir = tempfile::tempdir().unwrap();
        let left = dir.path().join("left");
        let right = dir.path().join("right");
        fs::create_dir_all(&left).unwrap();
        fs::create_dir_all(&right).unwrap();
        fs::write(left.join("clip.mp4"), b"x").unwrap();
        fs::write(right.join("clip.mov"), b"x").unwrap();
        fs::write(right.join("other.mp4"), b"x").unwrap();
        let out = dir.path().join("out");

        let args: Vec<OsString> = vec![
            "video_fx".into(),
            left.as_path().into(),
            right.as_path().into(),
            "-o".into(),
            out.as_path().into(),
        ];
        let reqs = Cli::try_parse_from(args)
            .unwrap()
            .into_config()
            .unwrap()
            .requests();
        assert_eq!(reqs.len(), 3);

        let clashes = colliding_outputs(&reqs);
        assert_eq!(clashes.len(), 1);
        let (first, second) = clashes[0];
        assert_eq!(first.input, left.join("clip.mp4"));
        assert_eq!(second.input, right.join("clip.mov"));
        assert_eq!(second.output, out.join("clip_fx.mp4"));
    }

    #[test]
    fn test_requests_per_video() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("a.mp4"), b"x").unwrap();
        fs::write(dir.path().join("b.mkv"), b"x").unwrap();
        fs::write(dir.path().join("c.txt"), b"x").unwrap();
        let out = dir.path().join("out");

        let args: Vec<OsString> = vec![
            "video_fx".into(),
            dir.path().into(),
            "-o".into(),
            out.as_path().into(),
            "-e".into(),
            "Sepia".into(),
            "--speed".into(),
            "150".into(),
        ];
        let cli = Cli::try_parse_from(args).unwrap();
        let reqs = cli.into_config().unwrap().requests();
        assert_eq!(reqs.len(), 2);
        assert_eq!(reqs[0].output, out.join("a_fx.mp4"));
        assert_eq!(reqs[1].output, out.join("b_fx.mp4"));
        assert!(reqs.iter().all(|r| r.speed_percent == 150 && r.effects == ["Sepia"]));
    }
}
