use crate::catalog;
use crate::cli::AppConfig;
use crate::command::EncodeSettings;
use crate::filters::{validate_scale_percent, validate_speed_percent};
use crate::overlay::{self, DEFAULT_POSITION};
use anyhow::{Result, bail};
use dialoguer::{Confirm, Input, MultiSelect, Select, Sort, theme::ColorfulTheme};
use std::path::PathBuf;

pub fn interactive_config() -> Result<AppConfig> {
    println!("Interactive Video FX");
    println!("Press Enter to accept defaults or leave options unset.\n");

    let theme = ColorfulTheme::default();
    let inputs = prompt_inputs(&theme)?;

    let out_dir: String = Input::with_theme(&theme)
        .with_prompt("Output folder")
        .default("rendered".into())
        .interact_text()?;

    let effects = prompt_effects(&theme)?;

    let scale: String = Input::with_theme(&theme)
        .with_prompt("Scale % (10-300, 100 = unchanged)")
        .default("100".into())
        .validate_with(|raw: &String| validate_scale_percent(raw).map(|_| ()))
        .interact_text()?;
    let speed: String = Input::with_theme(&theme)
        .with_prompt("Speed % (50-200, 100 = unchanged)")
        .default("100".into())
        .validate_with(|raw: &String| validate_speed_percent(raw).map(|_| ()))
        .interact_text()?;

    let overlay = prompt_optional_path(&theme, "Overlay image/video (blank = none)")?;
    let position = if overlay.is_some() {
        let names: Vec<&str> = overlay::positions().iter().map(|p| p.name).collect();
        let default = names
            .iter()
            .position(|n| *n == DEFAULT_POSITION)
            .unwrap_or(0);
        let idx = Select::with_theme(&theme)
            .with_prompt("Overlay position")
            .items(&names)
            .default(default)
            .interact()?;
        names[idx].to_string()
    } else {
        DEFAULT_POSITION.to_string()
    };

    let crf: u8 = Input::with_theme(&theme)
        .with_prompt("CRF (23 default)")
        .default(23)
        .interact_text()?;

    let dry_run = Confirm::with_theme(&theme)
        .with_prompt("Only print the ffmpeg commands?")
        .default(false)
        .interact()?;
    let verbose = Confirm::with_theme(&theme)
        .with_prompt("Show ffmpeg logs?")
        .default(false)
        .interact()?;

    let ffmpeg_path = prompt_optional_path(&theme, "Custom ffmpeg path (blank = PATH)")?;

    let cfg = AppConfig {
        inputs,
        out_dir: PathBuf::from(out_dir.trim()),
        effects,
        scale: validate_scale_percent(&scale).map_err(anyhow::Error::msg)?,
        speed: validate_speed_percent(&speed).map_err(anyhow::Error::msg)?,
        overlay,
        position,
        encode: EncodeSettings {
            crf,
            ..EncodeSettings::default()
        },
        dry_run,
        verbose,
        ffmpeg: ffmpeg_path,
        ffprobe: None,
    };
    cfg.warn_unknown_names();
    Ok(cfg)
}

fn prompt_inputs(theme: &ColorfulTheme) -> Result<Vec<PathBuf>> {
    let mut inputs = Vec::new();
    loop {
        let prompt = if inputs.is_empty() {
            "Video file or folder"
        } else {
            "Another file or folder (blank = done)"
        };
        let raw: String = Input::with_theme(theme)
            .with_prompt(prompt)
            .allow_empty(true)
            .interact_text()?;
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            if inputs.is_empty() {
                bail!("No inputs given");
            }
            return Ok(inputs);
        }
        let path = PathBuf::from(trimmed);
        if path.exists() {
            inputs.push(path);
        } else {
            println!("Path not found, please try again.");
        }
    }
}

/// Pick effects, then put them in the order they should run.
fn prompt_effects(theme: &ColorfulTheme) -> Result<Vec<String>> {
    let names: Vec<&str> = catalog::names().collect();
    let picked = MultiSelect::with_theme(theme)
        .with_prompt("Effects (space to toggle, enter to confirm)")
        .items(&names)
        .interact()?;
    let mut chosen: Vec<&str> = picked.into_iter().map(|i| names[i]).collect();

    if chosen.len() > 1 {
        let order = Sort::with_theme(theme)
            .with_prompt("Order of application (first runs first)")
            .items(&chosen)
            .interact()?;
        let ordered: Vec<&str> = order.into_iter().map(|i| chosen[i]).collect();
        chosen = ordered;
    }
    Ok(chosen.into_iter().map(str::to_string).collect())
}

fn prompt_optional_path(theme: &ColorfulTheme, prompt: &str) -> Result<Option<PathBuf>> {
    loop {
        let raw: String = Input::with_theme(theme)
            .with_prompt(prompt)
            .allow_empty(true)
            .interact_text()?;
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Ok(None);
        }
        let path = PathBuf::from(trimmed);
        if path.is_file() {
            return Ok(Some(path));
        } else {
            println!("File not found. Leave blank to skip or enter a valid file path.");
        }
    }
}
