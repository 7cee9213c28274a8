//! Sequential render queue: one worker, one engine process at a time.

use crate::command::{EncodeSettings, RenderRequest, build_invocation};
use crate::error::RenderError;
use crate::ffmpeg::Engine;
use anyhow::bail;
use rand::Rng;
use std::path::{Path, PathBuf};
use std::thread;
use tracing::{error, info, warn};

#[derive(Debug)]
pub struct FileOutcome {
    pub input: PathBuf,
    pub output: PathBuf,
    pub result: Result<(), RenderError>,
}

#[derive(Debug, Default)]
pub struct BatchSummary {
    pub outcomes: Vec<FileOutcome>,
}

impl BatchSummary {
    pub fn succeeded(&self) -> usize {
        self.outcomes.iter().filter(|o| o.result.is_ok()).count()
    }

    pub fn failed(&self) -> usize {
        self.outcomes.len() - self.succeeded()
    }

    pub fn failures(&self) -> impl Iterator<Item = &FileOutcome> {
        self.outcomes.iter().filter(|o| o.result.is_err())
    }

    /// Logs every failure, then errors if there was at least one.
    pub fn into_result(self) -> anyhow::Result<()> {
        for failure in self.failures() {
            if let Err(err) = &failure.result {
                warn!(input = %failure.input.display(), output = %failure.output.display(), "{err}");
            }
        }
        if self.failed() > 0 {
            bail!("{} of {} files failed", self.failed(), self.outcomes.len());
        }
        Ok(())
    }
}

pub enum BatchEvent<'a> {
    Started {
        index: usize,
        total: usize,
        input: &'a Path,
    },
    Finished(&'a FileOutcome),
}

fn render_one<E, R>(
    req: &RenderRequest,
    engine: &E,
    settings: &EncodeSettings,
    rng: &mut R,
) -> Result<(), RenderError>
where
    E: Engine + ?Sized,
    R: Rng + ?Sized,
{
    if !req.input.is_file() {
        return Err(RenderError::MissingInput(req.input.clone()));
    }
    let invocation = build_invocation(req, engine.program(), settings, rng)?;
    engine.render(&invocation, &req.input)
}

/// Renders every request in order. A failed file never stops the queue.
pub fn run_queue<E, R, F>(
    requests: Vec<RenderRequest>,
    engine: &E,
    settings: &EncodeSettings,
    rng: &mut R,
    mut observe: F,
) -> BatchSummary
where
    E: Engine + ?Sized,
    R: Rng + ?Sized,
    F: FnMut(BatchEvent<'_>),
{
    let total = requests.len();
    let mut summary = BatchSummary::default();

    for (index, req) in requests.into_iter().enumerate() {
        observe(BatchEvent::Started {
            index,
            total,
            input: &req.input,
        });
        info!(input = %req.input.display(), output = %req.output.display(), "rendering {}/{}", index + 1, total);

        let result = render_one(&req, engine, settings, rng);
        if let Err(err) = &result {
            error!(input = %req.input.display(), "{err}");
        }

        let outcome = FileOutcome {
            input: req.input,
            output: req.output,
            result,
        };
        observe(BatchEvent::Finished(&outcome));
        summary.outcomes.push(outcome);
    }

    info!(
        succeeded = summary.succeeded(),
        failed = summary.failed(),
        "batch finished"
    );
    summary
}

/// Drains the queue on a single background thread.
pub fn spawn_worker<E, F>(
    requests: Vec<RenderRequest>,
    engine: E,
    settings: EncodeSettings,
    observe: F,
) -> thread::JoinHandle<BatchSummary>
where
    E: Engine + Send + 'static,
    F: FnMut(BatchEvent<'_>) + Send + 'static,
{
    thread::spawn(move || {
        let mut rng = rand::thread_rng();
        run_queue(requests, &engine, &settings, &mut rng, observe)
    })
}
