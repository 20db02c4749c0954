use crate::batch::odometer::Odometer;
use crate::config::{ConfigVector, RunConfig, RunId, RunIdentity, VectorField};
use crate::types::{FireError, FireResult};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

/// Multipliers applied to the delta, indexed by odometer digit
pub const DELTA_LEVELS: [f64; 3] = [-1.0, 0.0, 1.0];

/// Absorbs float error when counting grid steps
const STEP_TOLERANCE: f64 = 1e-9;

/// Name of the ini saved in each prepared run directory
pub const RUN_CONFIG_FILE: &str = "config.ini";

/// One swept parameter: `start`, `start + step`, ... below `stop`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridAxis {
    pub field: VectorField,
    pub start: f64,
    pub stop: f64,
    pub step: f64,
}

impl GridAxis {
    pub fn new(field: VectorField, start: f64, stop: f64, step: f64) -> Self {
        Self {
            field,
            start,
            stop,
            step,
        }
    }

    pub fn values(&self) -> FireResult<Vec<f64>> {
        if self.step.is_nan() || self.step <= 0.0 {
            return Err(FireError::config(
                "grid",
                self.field.name(),
                format!("step must be positive, got {}", self.step),
            ));
        }
        if self.stop <= self.start {
            return Ok(Vec::new());
        }
        let count = ((self.stop - self.start) / self.step - STEP_TOLERANCE).ceil() as usize;
        Ok((0..count).map(|i| self.start + i as f64 * self.step).collect())
    }
}

/// RthSub 0.03 to 0.05 and Rth 0.76 to 0.80, both by 0.01
pub fn default_rth_grid() -> Vec<GridAxis> {
    vec![
        GridAxis::new(VectorField::RthSub, 0.03, 0.06, 0.01),
        GridAxis::new(VectorField::Rth, 0.76, 0.81, 0.01),
    ]
}

/// Builds collections of runs around a template configuration.
///
/// Every run gets its id from the identity strategy while the plan is built,
/// before any run is dispatched.
pub struct BatchPlanner<'a> {
    template: &'a RunConfig,
    identity: &'a dyn RunIdentity,
}

impl<'a> BatchPlanner<'a> {
    pub fn new(template: &'a RunConfig, identity: &'a dyn RunIdentity) -> Self {
        Self { template, identity }
    }

    pub fn template(&self) -> &RunConfig {
        self.template
    }

    fn merge(&self, vector: ConfigVector) -> RunConfig {
        RunConfig::merge_into_template(vector, self.template, self.identity)
    }

    /// Cartesian product of `axes`, first axis varying slowest
    pub fn grid_sweep(&self, axes: &[GridAxis]) -> FireResult<Vec<RunConfig>> {
        let values = axes
            .iter()
            .map(GridAxis::values)
            .collect::<FireResult<Vec<_>>>()?;
        if values.iter().any(Vec::is_empty) {
            log::warn!("Grid sweep has an empty axis, no runs planned");
            return Ok(Vec::new());
        }

        // Odometer digit 0 is fastest, so it maps to the last axis
        let radices: Vec<usize> = values.iter().rev().map(Vec::len).collect();
        let reference = self.template.get_vector();

        let runs: Vec<RunConfig> = Odometer::new(radices)?
            .cycle()
            .map(|digits| {
                let mut vector = reference;
                for (axis_idx, &digit) in digits.iter().rev().enumerate() {
                    vector.set(axes[axis_idx].field, values[axis_idx][digit]);
                }
                self.merge(vector)
            })
            .collect();

        log::info!("Planned {} grid runs over {} axes", runs.len(), axes.len());
        Ok(runs)
    }

    /// The RthSub / Rth sweep
    pub fn default_grid(&self) -> FireResult<Vec<RunConfig>> {
        self.grid_sweep(&default_rth_grid())
    }

    /// Every combination of `{-delta, 0, +delta}` over `fields`, 3^K runs.
    ///
    /// The combination leaving every field at its reference value is included.
    pub fn delta_perturbation(&self, fields: &[VectorField], delta: f64) -> FireResult<Vec<RunConfig>> {
        let reference = self.template.get_vector();

        let runs: Vec<RunConfig> = Odometer::uniform(fields.len(), DELTA_LEVELS.len())?
            .cycle()
            .map(|digits| {
                let mut vector = reference;
                for (&field, &digit) in fields.iter().zip(&digits) {
                    vector.set(field, reference.get(field) + DELTA_LEVELS[digit] * delta);
                }
                self.merge(vector)
            })
            .collect();

        log::info!(
            "Planned {} delta runs over {} fields (delta {})",
            runs.len(),
            fields.len(),
            delta
        );
        Ok(runs)
    }

    /// Delta perturbation of the five raw reflectance bounds
    pub fn reflectance_deltas(&self, delta: f64) -> FireResult<Vec<RunConfig>> {
        self.delta_perturbation(&VectorField::RAW_REFLECTANCE, delta)
    }

    /// Rebuild a plan from a summary table, keeping its run ids.
    ///
    /// Fields missing from the table keep the template's value; extra columns
    /// are ignored.
    pub fn from_table<R: Read>(&self, reader: R) -> FireResult<Vec<RunConfig>> {
        let mut reader = csv::Reader::from_reader(reader);
        let headers = reader.headers()?.clone();

        let column = |name: &str| headers.iter().position(|h| h.trim().eq_ignore_ascii_case(name));
        let run_id_idx = column("run_id")
            .ok_or_else(|| FireError::config("plan table", "run_id", "missing column"))?;
        let field_columns: Vec<(VectorField, usize)> = VectorField::ALL
            .iter()
            .filter_map(|&field| column(field.name()).map(|idx| (field, idx)))
            .collect();

        let reference = self.template.get_vector();
        let mut runs = Vec::new();

        for (row_no, record) in reader.records().enumerate() {
            let record = record?;
            let mut vector = reference;
            for &(field, idx) in &field_columns {
                let text = table_cell(&record, idx, field.name(), row_no)?;
                let value: f64 = text.parse().map_err(|_| {
                    FireError::config("plan table", field.name(), format!("row {}: '{}' is not a number", row_no + 1, text))
                })?;
                vector.set(field, value);
            }

            let text = table_cell(&record, run_id_idx, "run_id", row_no)?;
            let run_id: u64 = text.parse().map_err(|_| {
                FireError::config("plan table", "run_id", format!("row {}: '{}' is not a run id", row_no + 1, text))
            })?;
            runs.push(RunConfig::merge_with_run_id(vector, self.template, RunId(run_id)));
        }

        log::info!("Rebuilt {} runs from plan table", runs.len());
        Ok(runs)
    }

    pub fn from_table_file<P: AsRef<Path>>(&self, path: P) -> FireResult<Vec<RunConfig>> {
        self.from_table(std::fs::File::open(path)?)
    }
}

fn table_cell<'r>(record: &'r csv::StringRecord, idx: usize, key: &str, row_no: usize) -> FireResult<&'r str> {
    record
        .get(idx)
        .map(str::trim)
        .ok_or_else(|| FireError::config("plan table", key, format!("row {} is short", row_no + 1)))
}

/// Write one row per run: every vector field, then `run_id`
pub fn write_summary<W: Write>(runs: &[RunConfig], writer: W) -> FireResult<()> {
    let mut wtr = csv::Writer::from_writer(writer);

    let mut header: Vec<&str> = VectorField::ALL.iter().map(VectorField::name).collect();
    header.push("run_id");
    wtr.write_record(&header)?;

    for run in runs {
        let mut record: Vec<String> = VectorField::ALL
            .iter()
            .map(|&field| {
                let value = run.vector.get(field);
                if field.is_integer() {
                    (value as i64).to_string()
                } else {
                    value.to_string()
                }
            })
            .collect();
        record.push(run.run_id.to_string());
        wtr.write_record(&record)?;
    }

    wtr.flush()?;
    Ok(())
}

pub fn write_summary_file<P: AsRef<Path>>(runs: &[RunConfig], path: P) -> FireResult<()> {
    log::info!("Saving planned run information to {}", path.as_ref().display());
    write_summary(runs, std::fs::File::create(path)?)
}

/// Recreate each run's output directory and save its ini there.
///
/// An existing directory is emptied first.
pub fn prepare_run_directories(runs: &[RunConfig]) -> FireResult<Vec<PathBuf>> {
    let mut dirs = Vec::with_capacity(runs.len());
    for run in runs {
        let dir = &run.shape_dir;
        if dir.exists() {
            log::debug!("Removing existing run directory {}", dir.display());
            std::fs::remove_dir_all(dir)?;
        }
        std::fs::create_dir_all(dir)?;
        run.save(dir.join(RUN_CONFIG_FILE))?;
        dirs.push(dir.clone());
    }
    Ok(dirs)
}
