use crate::catalog;
use crate::random::{ColorShift, resolve_random};
use rand::Rng;

pub const SCALE_MIN: u16 = 10;
pub const SCALE_MAX: u16 = 300;
pub const SPEED_MIN: u16 = 50;
pub const SPEED_MAX: u16 = 200;

pub fn validate_scale_percent(raw: &str) -> Result<u16, String> {
    validate_percent_in(raw, SCALE_MIN, SCALE_MAX)
}

pub fn validate_speed_percent(raw: &str) -> Result<u16, String> {
    validate_percent_in(raw, SPEED_MIN, SPEED_MAX)
}

fn validate_percent_in(raw: &str, min: u16, max: u16) -> Result<u16, String> {
    let parsed: u16 = raw
        .trim()
        .trim_end_matches('%')
        .parse()
        .map_err(|_| format!("`{raw}` must be an integer between {min} and {max}"))?;
    if !(min..=max).contains(&parsed) {
        return Err(format!("value must be between {min} and {max}"));
    }
    Ok(parsed)
}

#[inline]
pub fn pct_to_factor(pct: u16) -> f64 {
    pct as f64 / 100.0
}

/// Factor as ffmpeg sees it: always with a fractional part (`2.0`, `0.5`).
pub fn fmt_factor(factor: f64) -> String {
    format!("{factor:?}")
}

/// Joins the effects in caller order; no-op and unknown names are dropped.
pub fn build_chain<S, R>(names: &[S], rng: &mut R) -> String
where
    S: AsRef<str>,
    R: Rng + ?Sized,
{
    let mut parts: Vec<String> = Vec::new();

    for name in resolve_random(names, rng) {
        let Some(effect) = catalog::lookup(&name) else {
            continue;
        };
        let params = if effect.is_parametrized() {
            ColorShift::sample(rng)
        } else {
            ColorShift::neutral()
        };
        let flt = effect.render(&params);
        if flt.is_empty() {
            continue;
        }
        parts.push(flt);
    }

    parts.join(",")
}

/// Scales by `pct` and crops or pads back to the source frame size.
pub fn build_scale(pct: u16) -> String {
    if pct == 100 {
        return String::new();
    }
    let factor = pct_to_factor(pct);
    let f = fmt_factor(factor);
    if factor > 1.0 {
        format!("scale=iw*{f}:ih*{f},crop=iw/{f}:ih/{f}:(iw-iw/{f})/2:(ih-ih/{f})/2")
    } else {
        format!("scale=iw*{f}:ih*{f},pad=iw/{f}:ih/{f}:(ow-iw)/2:(oh-ih)/2")
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpeedFilters {
    pub video: String,
    pub audio: String,
}

/// Both halves are emitted even at 100% so the graph shape never changes.
pub fn build_speed(pct: u16) -> SpeedFilters {
    let f = fmt_factor(pct_to_factor(pct));
    SpeedFilters {
        video: format!("setpts=1/{f}*PTS"),
        audio: format!("atempo={f}"),
    }
}

/// Effects and scale merged into the single visual expression, if any.
pub fn build_visual<S, R>(names: &[S], scale_pct: u16, rng: &mut R) -> Option<String>
where
    S: AsRef<str>,
    R: Rng + ?Sized,
{
    let chain = build_chain(names, rng);
    let scale = build_scale(scale_pct);
    match (chain.is_empty(), scale.is_empty()) {
        (true, true) => None,
        (false, true) => Some(chain),
        (true, false) => Some(scale),
        (false, false) => Some(format!("{chain},{scale}")),
    }
}
