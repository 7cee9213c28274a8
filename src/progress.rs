use anyhow::Result;
use indicatif::{MultiProgress, ProgressBar, ProgressStyle};
use regex::Regex;
use std::io::{BufRead, BufReader, Read};
use std::path::Path;
use std::thread;
use std::time::Duration;

fn style(template: &str, fallback: ProgressStyle) -> ProgressStyle {
    ProgressStyle::with_template(template).unwrap_or(fallback)
}

/// Per-file spinner and bar driven by ffmpeg's `-progress` stream.
pub struct ProgressUi {
    spinner: ProgressBar,
    bar: ProgressBar,
    total_ms: Option<u64>,
}

impl ProgressUi {
    pub fn new(multi: &MultiProgress, total_ms: Option<u64>, input: &Path) -> Self {
        let name = input
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();

        let spinner = multi.add(ProgressBar::new_spinner());
        spinner.enable_steady_tick(Duration::from_millis(80));
        spinner.set_style(
            style("{spinner} {msg}", ProgressStyle::default_spinner())
                .tick_strings(&["-", "\\", "|", "/"]),
        );
        spinner.set_message(format!("{name}: preparing."));

        let bar = match total_ms {
            Some(ms) => {
                let bar = multi.add(ProgressBar::new(ms));
                bar.set_style(
                    style(
                        "[{elapsed_precise}]  [{bar:60.cyan/bright-black}] {percent:>3}%  {pos}/{len}ms  ETA:{eta_precise}\n{wide_msg}",
                        ProgressStyle::default_bar(),
                    )
                    .progress_chars("#>-"),
                );
                bar
            }
            None => multi.add(ProgressBar::hidden()),
        };
        bar.set_message("Building filter graph.");

        Self {
            spinner,
            bar,
            total_ms,
        }
    }

    fn update_stage(&self, out_ms: u64) {
        let Some(total_ms) = self.total_ms else {
            self.spinner.set_message(format!("Rendering ({out_ms} ms written)."));
            return;
        };
        let pos_ms = out_ms.min(total_ms);
        self.bar.set_position(pos_ms);
        let pct = (pos_ms as f64) / (total_ms as f64);
        if pct < 0.10 {
            self.bar.set_message("Applying effects...");
        } else if pct < 0.95 {
            self.bar.set_message("Processing frames...");
        } else {
            self.bar
                .set_message("Muxing, writing headers, closing output...");
        }
    }

    fn finish(&self) {
        self.bar.finish_and_clear();
        self.spinner.finish_and_clear();
    }
}

/// Batch-wide bar over files.
#[derive(Clone)]
pub struct BatchProgress {
    multi: MultiProgress,
    files: ProgressBar,
}

impl BatchProgress {
    pub fn new(total_files: usize) -> Self {
        let multi = MultiProgress::new();
        let files = multi.add(ProgressBar::new(total_files as u64));
        files.set_style(
            style(
                "{prefix:.bold} [{bar:40.green/bright-black}] {pos}/{len} files  {wide_msg}",
                ProgressStyle::default_bar(),
            )
            .progress_chars("=> "),
        );
        files.set_prefix("Batch");
        Self { multi, files }
    }

    pub fn multi(&self) -> MultiProgress {
        self.multi.clone()
    }

    pub fn start_file(&self, index: usize, total: usize, input: &Path) {
        self.files.set_message(file_label(index, total, input));
    }

    pub fn file_done(&self, ok: bool, input: &Path) {
        if !ok {
            self.files
                .println(format!("failed: {}", input.display()));
        }
        self.files.inc(1);
    }

    pub fn finish(&self, succeeded: usize, failed: usize) {
        self.files
            .finish_with_message(format!("{succeeded} succeeded, {failed} failed"));
    }
}

/// `[2/5] clip.mp4` for the zero-based `index`.
fn file_label(index: usize, total: usize, input: &Path) -> String {
    format!("[{}/{}] {}", index + 1, total, input.display())
}

fn parse_out_time_ms(val: &str) -> u64 {
    // ffmpeg reports out_time_ms in microseconds despite the name.
    val.parse::<u64>().unwrap_or(0) / 1000
}

pub fn pump_progress<R: Read + Send + 'static>(
    reader: R,
    ui: ProgressUi,
) -> thread::JoinHandle<Result<()>> {
    thread::spawn(move || {
        let re_kv = Regex::new(r"^(\w+)=([\w\-\.:]+)$")?;
        let reader = BufReader::new(reader);

        for line in reader.lines() {
            let line = line?;
            if let Some(caps) = re_kv.captures(&line) {
                let key = &caps[1];
                let val = &caps[2];
                match key {
                    "out_time_ms" => ui.update_stage(parse_out_time_ms(val)),
                    "progress" if val == "end" => ui.finish(),
                    _ => {}
                }
            }
        }
        ui.finish();
        Ok(())
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use indicatif::ProgressDrawTarget;

    #[test]
    fn test_out_time_is_microseconds() {
        assert_eq!(parse_out_time_ms("2500000"), 2500);
        assert_eq!(parse_out_time_ms("N/A"), 0);
    }

    #[test]
    fn test_file_label_is_one_based() {
        assert_eq!(file_label(0, 5, Path::new("a.mp4")), "[1/5] a.mp4");
        assert_eq!(file_label(4, 5, Path::new("e.mp4")), "[5/5] e.mp4");
    }

    #[test]
    fn test_pump_consumes_progress_stream() {
        let multi = MultiProgress::with_draw_target(ProgressDrawTarget::hidden());
        let ui = ProgressUi::new(&multi, Some(10_000), Path::new("a.mp4"));
        let stream = b"frame=10\nout_time_ms=5000000\nprogress=continue\nout_time_ms=10000000\nprogress=end\n";
        let handle = pump_progress(&stream[..], ui);
        assert!(handle.join().unwrap().is_ok());
    }

    #[test]
    fn test_pump_without_duration() {
        let multi = MultiProgress::with_draw_target(ProgressDrawTarget::hidden());
        let ui = ProgressUi::new(&multi, None, Path::new("a.mp4"));
        let handle = pump_progress(&b"out_time_ms=1000\nprogress=end\n"[..], ui);
        assert!(handle.join().unwrap().is_ok());
    }
}
