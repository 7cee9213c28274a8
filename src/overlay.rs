//! Overlay placement table and the compositing nodes that use it.

use crate::inputs::is_video_ext;
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OverlayPosition {
    pub name: &'static str,
    pub x: &'static str,
    pub y: &'static str,
}

const TOP: &str = "0.07*main_h";
const MIDDLE_Y: &str = "(main_h-overlay_h)/2";
const BOTTOM: &str = "main_h-overlay_h";
const LEFT: &str = "0";
const CENTER_X: &str = "(main_w-overlay_w)/2";
const RIGHT: &str = "main_w-overlay_w";

pub const DEFAULT_POSITION: &str = "Bottom-Right";

static POSITIONS: &[OverlayPosition] = &[
    OverlayPosition { name: "Top-Left", x: LEFT, y: TOP },
    OverlayPosition { name: "Top-Center", x: CENTER_X, y: TOP },
    OverlayPosition { name: "Top-Right", x: RIGHT, y: TOP },
    OverlayPosition { name: "Middle-Left", x: LEFT, y: MIDDLE_Y },
    OverlayPosition { name: "Middle-Center", x: CENTER_X, y: MIDDLE_Y },
    OverlayPosition { name: "Middle-Right", x: RIGHT, y: MIDDLE_Y },
    OverlayPosition { name: "Bottom-Left", x: LEFT, y: BOTTOM },
    OverlayPosition { name: "Bottom-Center", x: CENTER_X, y: BOTTOM },
    OverlayPosition { name: "Bottom-Right", x: RIGHT, y: BOTTOM },
];

pub fn positions() -> &'static [OverlayPosition] {
    POSITIONS
}

/// `(x, y)` expressions for a named anchor; `(0, 0)` when unknown.
pub fn coordinates(name: &str) -> (&'static str, &'static str) {
    POSITIONS
        .iter()
        .find(|p| p.name == name)
        .map(|p| (p.x, p.y))
        .unwrap_or(("0", "0"))
}

/// The overlay only takes part when it points at an existing file.
pub fn resolve_overlay(path: Option<&Path>) -> Option<&Path> {
    path.filter(|p| p.is_file())
}

/// Video overlays loop for the whole base clip and stop with it.
pub fn is_animated(path: &Path) -> bool {
    is_video_ext(path)
}

pub fn alpha_expr() -> &'static str {
    "format=rgba"
}

pub fn overlay_expr(position: &str, animated: bool) -> String {
    let (x, y) = coordinates(position);
    if animated {
        format!("overlay=x={x}:y={y}:shortest=1")
    } else {
        format!("overlay=x={x}:y={y}")
    }
}
