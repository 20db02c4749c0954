use ndarray::Array2;
use serde::{Deserialize, Serialize};

/// Raw sensor digital counts (16-bit scaled integers)
pub type RawCounts = Array2<u16>;

/// Corrected top-of-atmosphere reflectance
pub type ReflectanceImage = Array2<f32>;

/// Per-pixel fire classification codes
pub type FireCodeImage = Array2<u8>;

/// Boolean detection / validity mask
pub type Mask = Array2<bool>;

/// Raw counts at or above this value are reserved fill values
pub const FILL_VALUE_THRESHOLD: u16 = 65528;

/// Sensor resolution of an array family
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PixelSize {
    /// I-band imagery, 375 m
    I375,
    /// M-band imagery, 750 m
    M750,
}

impl PixelSize {
    pub fn meters(&self) -> u32 {
        match self {
            PixelSize::I375 => 375,
            PixelSize::M750 => 750,
        }
    }

    /// Band family tag stored alongside detections ("i" or "m")
    pub fn band_tag(&self) -> &'static str {
        match self {
            PixelSize::I375 => "i",
            PixelSize::M750 => "m",
        }
    }
}

impl std::fmt::Display for PixelSize {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.meters())
    }
}

/// Geographic window restricting detections to a sub-region (degrees)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoWindow {
    pub north: f64,
    pub south: f64,
    pub east: f64,
    pub west: f64,
}

impl GeoWindow {
    /// True when the point lies outside the window
    pub fn excludes(&self, lat: f64, lon: f64) -> bool {
        lat > self.north || lat < self.south || lon < self.west || lon > self.east
    }
}

/// A single detected pixel location
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Detection {
    pub latitude: f32,
    pub longitude: f32,
}

/// Error types for fire detection and batch planning
#[derive(Debug, thiserror::Error)]
pub enum FireError {
    #[error("Missing input: no file matches {pattern} for prefix {prefix}")]
    MissingInput { prefix: String, pattern: String },

    #[error("Configuration error in [{section}] {key}: {message}")]
    ConfigParse {
        section: String,
        key: String,
        message: String,
    },

    #[error("Invalid image date '{0}'")]
    InvalidImageDate(String),

    #[error("Shape mismatch for {what}: expected {expected:?}, found {found:?}")]
    ShapeMismatch {
        what: String,
        expected: (usize, usize),
        found: (usize, usize),
    },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("File pattern error: {0}")]
    Pattern(#[from] glob::PatternError),

    #[error("Processing error: {0}")]
    Processing(String),

    #[error("Batch aborted after run {run_id} failed: {message}")]
    BatchAborted { run_id: String, message: String },
}

impl FireError {
    pub(crate) fn config(section: &str, key: &str, message: impl Into<String>) -> Self {
        FireError::ConfigParse {
            section: section.to_string(),
            key: key.to_string(),
            message: message.into(),
        }
    }

    pub(crate) fn missing_input(prefix: &str, pattern: &str) -> Self {
        FireError::MissingInput {
            prefix: prefix.to_string(),
            pattern: pattern.to_string(),
        }
    }
}

/// Result type for fire detection operations
pub type FireResult<T> = Result<T, FireError>;

/// Check that `found` has the shape of the reference array
pub(crate) fn ensure_shape(what: &str, expected: (usize, usize), found: (usize, usize)) -> FireResult<()> {
    if expected != found {
        return Err(FireError::ShapeMismatch {
            what: what.to_string(),
            expected,
            found,
        });
    }
    Ok(())
}
