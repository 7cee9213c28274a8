use std::collections::HashSet;
use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use walkdir::WalkDir;

pub const OUTPUT_SUFFIX: &str = "_fx";
pub const OUTPUT_EXT: &str = "mp4";

const KNOWN_EXT: &[&str] = &["mp4", "mov", "avi", "mkv", "flv", "wmv", "m4v"];

// Extensions whose registered media type is video/*.
const VIDEO_MIME_EXT: &[&str] = &[
    "webm", "mpg", "mpeg", "mpe", "ts", "m2ts", "mts", "3gp", "3g2", "ogv", "vob", "mxf", "f4v",
    "asf", "divx", "qt", "dv",
];

fn extension(path: &Path) -> Option<String> {
    path.extension()
        .and_then(OsStr::to_str)
        .map(str::to_ascii_lowercase)
}

pub fn is_video_ext(path: &Path) -> bool {
    match extension(path) {
        Some(ext) => {
            KNOWN_EXT.contains(&ext.as_str()) || VIDEO_MIME_EXT.contains(&ext.as_str())
        }
        None => false,
    }
}

pub fn is_video_file(path: &Path) -> bool {
    path.is_file() && is_video_ext(path)
}

/// Expands folders recursively and keeps only video files, in a stable order.
pub fn collect_inputs(paths: &[PathBuf]) -> Vec<PathBuf> {
    let mut seen = HashSet::new();
    let mut out = Vec::new();

    for p in paths {
        if p.is_dir() {
            let mut found: Vec<PathBuf> = WalkDir::new(p)
                .into_iter()
                .filter_map(|entry| match entry {
                    Ok(e) => Some(e),
                    Err(err) => {
                        warn!(error = %err, "skipping unreadable entry");
                        None
                    }
                })
                .filter(|e| e.file_type().is_file())
                .map(|e| e.into_path())
                .filter(|f| is_video_file(f))
                .collect();
            found.sort();
            debug!(dir = %p.display(), count = found.len(), "expanded folder");
            for f in found {
                if seen.insert(f.clone()) {
                    out.push(f);
                }
            }
        } else if is_video_file(p) {
            if seen.insert(p.clone()) {
                out.push(p.clone());
            }
        } else {
            warn!(path = %p.display(), "not a video file, ignoring");
        }
    }

    out
}

pub fn output_path_for(input: &Path, out_dir: &Path) -> PathBuf {
    let stem = input
        .file_stem()
        .and_then(OsStr::to_str)
        .unwrap_or("output");
    out_dir.join(format!("{stem}{OUTPUT_SUFFIX}.{OUTPUT_EXT}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_extension_classification() {
        assert!(is_video_ext(Path::new("a.mp4")));
        assert!(is_video_ext(Path::new("a.MKV")));
        assert!(is_video_ext(Path::new("a.webm")));
        assert!(!is_video_ext(Path::new("a.png")));
        assert!(!is_video_ext(Path::new("noext")));
    }

    #[test]
    fn test_is_video_file_requires_existence() {
        let dir = tempfile::tempdir().unwrap();
        let f = dir.path().join("clip.mov");
        assert!(!is_video_file(&f));
        fs::write(&f, b"x").unwrap();
        assert!(is_video_file(&f));
    }

    #[test]
    fn test_collect_expands_folders_recursively() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("sub");
        fs::create_dir_all(&nested).unwrap();
        fs::write(dir.path().join("b.mp4"), b"x").unwrap();
        fs::write(nested.join("a.avi"), b"x").unwrap();
        fs::write(nested.join("notes.txt"), b"x").unwrap();
        let single = dir.path().join("b.mp4");

        let got = collect_inputs(&[dir.path().to_path_buf(), single.clone()]);
        assert_eq!(got.len(), 2);
        assert!(got.contains(&single));
        assert!(got.contains(&nested.join("a.avi")));
    }

    #[test]
    fn test_collect_skips_non_video() {
        let dir = tempfile::tempdir().unwrap();
        let txt = dir.path().join("x.txt");
        fs::write(&txt, b"x").unwrap();
        assert!(collect_inputs(&[txt, dir.path().join("missing.mp4")]).is_empty());
    }

    #[test]
    fn test_output_naming() {
        let out = output_path_for(Path::new("/videos/holiday.mov"), Path::new("/out"));
        assert_eq!(out, PathBuf::from("/out/holiday_fx.mp4"));
    }
}
