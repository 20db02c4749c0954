//! Calibration batches: planning parameter sweeps and running them in parallel

pub mod odometer;
pub mod planner;
pub mod runner;

pub use odometer::Odometer;
pub use planner::{
    default_rth_grid, prepare_run_directories, write_summary, write_summary_file, BatchPlanner,
    GridAxis, DELTA_LEVELS, RUN_CONFIG_FILE,
};
pub use runner::{BatchOptions, BatchReport, BatchRunner, FailurePolicy, RunOutcome, RunStatus};
