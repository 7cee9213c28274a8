use crate::error::GraphError;
use crate::filters::{build_speed, build_visual};
use crate::overlay::{self, resolve_overlay};
use rand::Rng;
use std::collections::HashMap;
use std::ffi::{OsStr, OsString};
use std::fmt;
use std::path::{Path, PathBuf};
use std::process::Command;

const BASE_VIDEO: &str = "0:v";
const BASE_AUDIO: &str = "0:a";
const OVERLAY_VIDEO: &str = "1:v";

/// Labels threaded through one invocation's graph.
pub const LABEL_BASE: &str = "base";
pub const LABEL_OVERLAY: &str = "ovrl";
pub const LABEL_PRE_SPEED: &str = "preSpeed";
pub const LABEL_VIDEO: &str = "vid";
pub const LABEL_AUDIO: &str = "aud";

/// One file's worth of render settings.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderRequest {
    pub input: PathBuf,
    pub output: PathBuf,
    pub effects: Vec<String>,
    pub scale_percent: u16,
    pub speed_percent: u16,
    pub overlay: Option<PathBuf>,
    pub overlay_position: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodeSettings {
    pub video_codec: String,
    pub crf: u8,
    pub audio_codec: String,
    pub audio_bitrate: String,
}

impl Default for EncodeSettings {
    fn default() -> Self {
        Self {
            video_codec: "libx264".into(),
            crf: 23,
            audio_codec: "aac".into(),
            audio_bitrate: "192k".into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GraphNode {
    pub inputs: Vec<String>,
    pub expr: String,
    pub output: String,
}

impl fmt::Display for GraphNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for i in &self.inputs {
            write!(f, "[{i}]")?;
        }
        write!(f, "{}[{}]", self.expr, self.output)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterGraph {
    nodes: Vec<GraphNode>,
}

impl FilterGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, inputs: &[&str], expr: impl Into<String>, output: &str) {
        self.nodes.push(GraphNode {
            inputs: inputs.iter().map(|s| s.to_string()).collect(),
            expr: expr.into(),
            output: output.to_string(),
        });
    }

    #[cfg(test)]
    pub fn nodes(&self) -> &[GraphNode] {
        &self.nodes
    }

    /// Checks the label wiring: inputs come from declared streams or earlier
    /// nodes, outputs are unique and consumed exactly once downstream.
    pub fn validate(&self, streams: &[&str], mapped: &[&str]) -> Result<(), GraphError> {
        let mut uses: HashMap<&str, usize> = HashMap::new();
        let mut order: Vec<&str> = Vec::new();

        for node in &self.nodes {
            for i in &node.inputs {
                if streams.contains(&i.as_str()) {
                    continue;
                }
                match uses.get_mut(i.as_str()) {
                    Some(n) => *n += 1,
                    None => return Err(GraphError::Dangling(i.clone())),
                }
            }
            let out = node.output.as_str();
            if streams.contains(&out) || uses.contains_key(out) {
                return Err(GraphError::Redefined(out.to_string()));
            }
            uses.insert(out, 0);
            order.push(out);
        }

        for m in mapped {
            match uses.get_mut(m) {
                Some(n) => *n += 1,
                None => return Err(GraphError::Dangling(m.to_string())),
            }
        }

        for label in order {
            let n = uses[label];
            if n != 1 {
                return Err(GraphError::Consumption(label.to_string(), n));
            }
        }
        Ok(())
    }
}

impl fmt::Display for FilterGraph {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (idx, node) in self.nodes.iter().enumerate() {
            if idx > 0 {
                f.write_str("; ")?;
            }
            write!(f, "{node}")?;
        }
        Ok(())
    }
}

/// Builds the labeled graph for `req`. `overlay_animated` is `None` when no
/// overlay input is declared.
pub fn build_graph<R: Rng + ?Sized>(
    req: &RenderRequest,
    overlay_animated: Option<bool>,
    rng: &mut R,
) -> FilterGraph {
    let mut graph = FilterGraph::new();

    match build_visual(&req.effects, req.scale_percent, rng) {
        Some(visual) => graph.push(&[BASE_VIDEO], visual, LABEL_BASE),
        None => graph.push(&[BASE_VIDEO], "null", LABEL_BASE),
    }

    let speed = build_speed(req.speed_percent);
    let pre_speed = match overlay_animated {
        Some(animated) => {
            graph.push(&[OVERLAY_VIDEO], overlay::alpha_expr(), LABEL_OVERLAY);
            graph.push(
                &[LABEL_BASE, LABEL_OVERLAY],
                overlay::overlay_expr(&req.overlay_position, animated),
                LABEL_PRE_SPEED,
            );
            LABEL_PRE_SPEED
        }
        None => LABEL_BASE,
    };
    graph.push(&[pre_speed], speed.video, LABEL_VIDEO);
    graph.push(&[BASE_AUDIO], speed.audio, LABEL_AUDIO);

    graph
}

/// Input stream handles declared by an invocation.
pub fn declared_streams(with_overlay: bool) -> Vec<&'static str> {
    let mut streams = vec![BASE_VIDEO, BASE_AUDIO];
    if with_overlay {
        streams.push(OVERLAY_VIDEO);
    }
    streams
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandInvocation {
    pub program: PathBuf,
    pub args: Vec<OsString>,
}

impl CommandInvocation {
    /// `extra` are engine-level flags (logging, progress) placed before the
    /// builder's own arguments.
    pub fn to_command<I, S>(&self, extra: I) -> Command
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        let mut cmd = Command::new(&self.program);
        cmd.args(extra).args(&self.args);
        cmd
    }

    pub fn args_lossy(&self) -> Vec<String> {
        self.args
            .iter()
            .map(|a| a.to_string_lossy().into_owned())
            .collect()
    }

    /// Value following the first occurrence of `flag`.
    #[cfg(test)]
    pub fn arg_after(&self, flag: &str) -> Option<String> {
        let args = self.args_lossy();
        let idx = args.iter().position(|a| a == flag)?;
        args.get(idx + 1).cloned()
    }
}

fn shell_quote(arg: &str) -> String {
    let plain = !arg.is_empty()
        && arg
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || "-_./:=,+%@".contains(c));
    if plain {
        arg.to_string()
    } else {
        format!("'{}'", arg.replace('\'', r"'\''"))
    }
}

impl fmt::Display for CommandInvocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", shell_quote(&self.program.to_string_lossy()))?;
        for a in self.args_lossy() {
            write!(f, " {}", shell_quote(&a))?;
        }
        Ok(())
    }
}

pub fn build_invocation<R: Rng + ?Sized>(
    req: &RenderRequest,
    program: &Path,
    settings: &EncodeSettings,
    rng: &mut R,
) -> Result<CommandInvocation, GraphError> {
    let mut args: Vec<OsString> = Vec::new();
    let mut push = |a: &dyn AsRef<OsStr>| args.push(a.as_ref().to_os_string());

    push(&"-y");
    push(&"-i");
    push(&req.input);

    let overlay = resolve_overlay(req.overlay.as_deref());
    let animated = overlay.map(overlay::is_animated);
    if let Some(path) = overlay {
        if animated == Some(true) {
            push(&"-stream_loop");
            push(&"-1");
        }
        push(&"-i");
        push(&path);
    }

    let graph = build_graph(req, animated, rng);
    graph.validate(
        &declared_streams(overlay.is_some()),
        &[LABEL_VIDEO, LABEL_AUDIO],
    )?;

    push(&"-filter_complex");
    push(&graph.to_string());
    push(&"-map");
    push(&format!("[{LABEL_VIDEO}]"));
    push(&"-map");
    push(&format!("[{LABEL_AUDIO}]"));
    push(&"-c:v");
    push(&settings.video_codec);
    push(&"-crf");
    push(&settings.crf.to_string());
    push(&"-c:a");
    push(&settings.audio_codec);
    push(&"-b:a");
    push(&settings.audio_bitrate);
    push(&req.output);

    Ok(CommandInvocation {
        program: program.to_path_buf(),
        args,
    })
}
