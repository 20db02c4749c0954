//! viirs-ba: VIIRS burned-area and active-fire thresholding
//!
//! Thresholds corrected M-band reflectance into burned-area masks, extracts
//! active fire pixels at 750 m and 375 m, and plans calibration batches that
//! sweep or perturb the threshold vector across many independent runs.

pub mod batch;
pub mod config;
pub mod core;
pub mod io;
pub mod pipeline;
pub mod types;

// Re-export main types and functions for easier access
pub use types::{
    Detection, FireCodeImage, FireError, FireResult, GeoWindow, Mask, PixelSize, RawCounts,
    ReflectanceImage, FILL_VALUE_THRESHOLD,
};

pub use batch::{BatchOptions, BatchPlanner, BatchReport, BatchRunner, FailurePolicy, GridAxis, Odometer};
pub use config::{ConfigVector, ContentHashIdentity, RunConfig, RunId, RunIdentity, SequentialIdentity, VectorField};
pub use self::core::{BandMeasurement, BurnAreaThresholder, FireClassification, GeoReference, ReflectanceBands};
pub use io::{EventStore, ImageDate, SceneSource};
pub use pipeline::{detect_scene, run_config, run_config_with_store, RunSummary};
