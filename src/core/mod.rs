//! Core thresholding modules

pub mod active_fire;
pub mod burned_area;
pub mod geo;
pub mod reflectance;

// Re-export main types
pub use active_fire::{FireClassification, DEFAULT_RECODE_SENTINEL};
pub use burned_area::{BurnAreaThresholder, ReflectanceBands};
pub use geo::GeoReference;
pub use reflectance::BandMeasurement;
