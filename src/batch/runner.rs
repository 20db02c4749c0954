use crate::config::{RunConfig, RunId};
use crate::io::scene::SceneSource;
use crate::pipeline::{self, RunSummary};
use crate::types::{FireError, FireResult};
use rayon::prelude::*;
use serde::Serialize;
use std::io::Write;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};

/// What the batch does after a run fails
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FailurePolicy {
    /// Run every configuration and report failures at the end
    #[default]
    ContinueOnError,
    /// Runs not yet started when a failure is seen are skipped
    StopOnFirstFailure,
}

/// Batch execution parameters
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchOptions {
    /// Worker threads; each executes one run at a time
    pub workers: usize,
    pub policy: FailurePolicy,
}

impl Default for BatchOptions {
    fn default() -> Self {
        Self {
            workers: std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(1),
            policy: FailurePolicy::ContinueOnError,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum RunStatus {
    Completed(RunSummary),
    Failed(String),
    Skipped,
}

impl RunStatus {
    pub fn label(&self) -> &'static str {
        match self {
            RunStatus::Completed(_) => "completed",
            RunStatus::Failed(_) => "failed",
            RunStatus::Skipped => "skipped",
        }
    }
}

/// Result of one run, tagged with its id
#[derive(Debug, Clone, PartialEq)]
pub struct RunOutcome {
    pub run_id: RunId,
    pub status: RunStatus,
}

#[derive(Debug, Serialize)]
struct ReportRow<'a> {
    run_id: u64,
    status: &'static str,
    message: &'a str,
    scenes: usize,
    burned: usize,
    active_fire: usize,
}

/// Per-run outcomes of a batch, in plan order
#[derive(Debug, Clone, PartialEq, Default)]
pub struct BatchReport {
    pub outcomes: Vec<RunOutcome>,
}

impl BatchReport {
    pub fn len(&self) -> usize {
        self.outcomes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.outcomes.is_empty()
    }

    pub fn completed(&self) -> impl Iterator<Item = (RunId, &RunSummary)> {
        self.outcomes.iter().filter_map(|o| match &o.status {
            RunStatus::Completed(summary) => Some((o.run_id, summary)),
            _ => None,
        })
    }

    pub fn failed(&self) -> impl Iterator<Item = (RunId, &str)> {
        self.outcomes.iter().filter_map(|o| match &o.status {
            RunStatus::Failed(message) => Some((o.run_id, message.as_str())),
            _ => None,
        })
    }

    pub fn skipped(&self) -> impl Iterator<Item = RunId> + '_ {
        self.outcomes
            .iter()
            .filter(|o| o.status == RunStatus::Skipped)
            .map(|o| o.run_id)
    }

    pub fn all_completed(&self) -> bool {
        self.outcomes
            .iter()
            .all(|o| matches!(o.status, RunStatus::Completed(_)))
    }

    /// Fail with the first failed run, if any
    pub fn into_result(self) -> FireResult<Vec<RunSummary>> {
        if let Some((run_id, message)) = self.failed().next() {
            return Err(FireError::BatchAborted {
                run_id: run_id.to_string(),
                message: message.to_string(),
            });
        }
        Ok(self
            .outcomes
            .into_iter()
            .filter_map(|o| match o.status {
                RunStatus::Completed(summary) => Some(summary),
                _ => None,
            })
            .collect())
    }

    /// CSV with one row per run
    pub fn write_csv<W: Write>(&self, writer: W) -> FireResult<()> {
        let mut wtr = csv::Writer::from_writer(writer);
        for outcome in &self.outcomes {
            let (message, scenes, burned, active_fire) = match &outcome.status {
                RunStatus::Completed(summary) => (
                    "",
                    summary.scenes.len(),
                    summary.total_burned(),
                    summary.total_active_fire(),
                ),
                RunStatus::Failed(message) => (message.as_str(), 0, 0, 0),
                RunStatus::Skipped => ("", 0, 0, 0),
            };
            wtr.serialize(ReportRow {
                run_id: outcome.run_id.0,
                status: outcome.status.label(),
                message,
                scenes,
                burned,
                active_fire,
            })?;
        }
        wtr.flush()?;
        Ok(())
    }

    pub fn write_csv_file<P: AsRef<Path>>(&self, path: P) -> FireResult<()> {
        self.write_csv(std::fs::File::create(path)?)
    }
}

/// Executes planned runs on a fixed-size thread pool
pub struct BatchRunner {
    pool: rayon::ThreadPool,
    options: BatchOptions,
}

impl BatchRunner {
    pub fn new(options: BatchOptions) -> FireResult<Self> {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(options.workers.max(1))
            .thread_name(|idx| format!("batch-worker-{}", idx))
            .build()
            .map_err(|e| FireError::Processing(format!("failed to build worker pool: {}", e)))?;
        Ok(Self { pool, options })
    }

    pub fn options(&self) -> &BatchOptions {
        &self.options
    }

    /// Run `job` once per configuration.
    ///
    /// Runs share nothing mutable; every outcome carries its run id.
    pub fn run<F>(&self, runs: &[RunConfig], job: F) -> BatchReport
    where
        F: Fn(&RunConfig) -> FireResult<RunSummary> + Sync,
    {
        log::info!(
            "Running {} configurations on {} workers",
            runs.len(),
            self.options.workers.max(1)
        );
        let stop = AtomicBool::new(false);
        let policy = self.options.policy;

        let outcomes: Vec<RunOutcome> = self.pool.install(|| {
            runs.par_iter()
                .map(|config| {
                    let run_id = config.run_id;
                    if policy == FailurePolicy::StopOnFirstFailure && stop.load(Ordering::SeqCst) {
                        log::debug!("Skipping run {}", run_id);
                        return RunOutcome {
                            run_id,
                            status: RunStatus::Skipped,
                        };
                    }

                    let status = match job(config) {
                        Ok(summary) => RunStatus::Completed(summary),
                        Err(e) => {
                            log::error!("Run {} failed: {}", run_id, e);
                            if policy == FailurePolicy::StopOnFirstFailure {
                                stop.store(true, Ordering::SeqCst);
                            }
                            RunStatus::Failed(e.to_string())
                        }
                    };
                    RunOutcome { run_id, status }
                })
                .collect()
        });

        let report = BatchReport { outcomes };
        log::info!(
            "Batch finished: {} completed, {} failed, {} skipped",
            report.completed().count(),
            report.failed().count(),
            report.skipped().count()
        );
        report
    }

    /// Run the full per-run pipeline for every configuration
    pub fn run_pipeline<S: SceneSource + ?Sized>(&self, runs: &[RunConfig], source: &S) -> BatchReport {
        self.run(runs, |config| pipeline::run_config(config, source))
    }
}
