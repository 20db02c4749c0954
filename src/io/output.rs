//! Detection outputs: coordinate text files and the event database seam.

use crate::config::DatabaseInfo;
use crate::io::fileset::ImageDate;
use crate::types::{Detection, FireResult, PixelSize};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

/// Kind of detection list being written
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DetectionLayer {
    /// Thresholded burned area (always 750 m)
    BurnedArea,
    ActiveFire(PixelSize),
}

impl DetectionLayer {
    /// Database table receiving this layer
    pub fn table(&self) -> &'static str {
        match self {
            DetectionLayer::BurnedArea => "threshold_burned",
            DetectionLayer::ActiveFire(_) => "active_fire",
        }
    }

    pub fn pixel_size(&self) -> PixelSize {
        match self {
            DetectionLayer::BurnedArea => PixelSize::M750,
            DetectionLayer::ActiveFire(size) => *size,
        }
    }

    /// Stem of the text output file name
    pub fn file_stem(&self) -> &'static str {
        match self {
            DetectionLayer::BurnedArea => "BaOut",
            DetectionLayer::ActiveFire(PixelSize::M750) => "AfOut",
            DetectionLayer::ActiveFire(PixelSize::I375) => "Af375Out",
        }
    }
}

/// Consumer of per-scene detection lists
pub trait DetectionSink {
    fn write_detections(
        &mut self,
        layer: DetectionLayer,
        date: &ImageDate,
        detections: &[Detection],
    ) -> FireResult<()>;
}

/// Writes `Lat, Lon, DateTime` text files, one per layer and scene
#[derive(Debug, Clone)]
pub struct TextFileSink {
    dir: PathBuf,
}

impl TextFileSink {
    pub fn new<P: Into<PathBuf>>(dir: P) -> Self {
        Self { dir: dir.into() }
    }

    /// Sink writing under `<run_dir>/TextOut`
    pub fn under_run_dir(run_dir: &Path) -> Self {
        Self::new(run_dir.join("TextOut"))
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn file_path(&self, layer: DetectionLayer, date: &ImageDate) -> PathBuf {
        self.dir
            .join(format!("{}_{}.txt", layer.file_stem(), date.out_date()))
    }
}

impl DetectionSink for TextFileSink {
    fn write_detections(
        &mut self,
        layer: DetectionLayer,
        date: &ImageDate,
        detections: &[Detection],
    ) -> FireResult<()> {
        std::fs::create_dir_all(&self.dir)?;
        let path = self.file_path(layer, date);
        log::info!("Writing {} detections to {}", detections.len(), path.display());

        let mut writer = BufWriter::new(std::fs::File::create(&path)?);
        writeln!(writer, "Lat, Lon, DateTime")?;
        let stamp = date.sql_date();
        // Debug keeps a decimal on whole degrees (`45.0`)
        for detection in detections {
            writeln!(writer, "{:?},{:?},{}", detection.latitude, detection.longitude, stamp)?;
        }
        writer.flush()?;
        Ok(())
    }
}

/// Which detection table feeds event clustering
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClusterSource {
    ActiveFire,
    Threshold,
}

/// Arguments of one clustering pass
#[derive(Debug, Clone, PartialEq)]
pub struct ClusterRequest {
    pub source: ClusterSource,
    pub schema: String,
    /// `YYYY-mm-dd HH:MM:SS`
    pub collection_date: String,
    /// SQL interval literal, e.g. `5 days`
    pub temporal_interval: String,
    /// Meters
    pub spatial_distance: i64,
}

/// Spatial database holding detections and fire events.
///
/// Detections reach the store through its [`DetectionSink`] side.
pub trait EventStore: DetectionSink {
    /// Create (or recreate) the run's schema and tables
    fn initialize_schema(&mut self, database: &DatabaseInfo) -> FireResult<()>;

    fn cluster_events(&mut self, request: &ClusterRequest) -> FireResult<()>;

    /// Dump the run's event tables as shapefiles into `out_dir`
    fn export_shapes(&mut self, database: &DatabaseInfo, out_dir: &Path) -> FireResult<()>;
}
