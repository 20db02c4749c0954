//! Scene loading seam.
//!
//! Decoding the HDF5/HDF4 products is left to an implementor of
//! [`SceneSource`]; the thresholding code only sees typed arrays.

use crate::core::active_fire::FireClassification;
use crate::core::burned_area::ReflectanceBands;
use crate::core::geo::GeoReference;
use crate::core::reflectance::BandMeasurement;
use crate::io::fileset::{FileSet, ImageDate, ScenePrefix};
use crate::types::{FireResult, PixelSize};
use std::path::Path;

/// Provider of raw scene arrays
pub trait SceneSource: Send + Sync {
    /// Raw counts and `[scale, offset]` factors of one SVM band
    fn load_reflectance(&self, path: &Path, band: ScenePrefix) -> FireResult<BandMeasurement>;

    /// Latitude, longitude and (for 750 m) solar zenith of a geolocation product
    fn load_geolocation(&self, path: &Path, pixel_size: PixelSize) -> FireResult<GeoReference>;

    /// Fire classification codes of an active fire product
    fn load_fire_codes(&self, path: &Path, pixel_size: PixelSize) -> FireResult<FireClassification>;
}

/// Scene inputs needed by one image date
pub struct SceneProducts {
    pub date: ImageDate,
    pub bands: ReflectanceBands,
    pub geo_750: GeoReference,
    pub fire_750: FireClassification,
    /// Present when 375 m active fire is enabled
    pub geo_375: Option<GeoReference>,
    pub fire_375: Option<FireClassification>,
}

/// Product families required for a scene
pub fn required_prefixes(use_375af: bool) -> Vec<ScenePrefix> {
    let mut prefixes = ScenePrefix::REFLECTANCE.to_vec();
    prefixes.push(ScenePrefix::Gmtco);
    prefixes.push(ScenePrefix::Avafo);
    if use_375af {
        prefixes.push(ScenePrefix::Gitco);
        prefixes.push(ScenePrefix::Vf375);
    }
    prefixes
}

impl SceneProducts {
    /// Locate and load every product of `date` under `base_dir`
    pub fn load<S: SceneSource + ?Sized>(
        source: &S,
        base_dir: &Path,
        date: &ImageDate,
        use_375af: bool,
    ) -> FireResult<Self> {
        let files = FileSet::locate(base_dir, date, &required_prefixes(use_375af))?;
        Self::from_files(source, &files, use_375af)
    }

    pub fn from_files<S: SceneSource + ?Sized>(
        source: &S,
        files: &FileSet,
        use_375af: bool,
    ) -> FireResult<Self> {
        log::info!("Loading scene {}", files.date());

        let band = |prefix: ScenePrefix| source.load_reflectance(files.path(prefix)?, prefix);
        let bands = ReflectanceBands {
            m07: band(ScenePrefix::Svm07)?,
            m08: band(ScenePrefix::Svm08)?,
            m10: band(ScenePrefix::Svm10)?,
            m11: band(ScenePrefix::Svm11)?,
        };

        let geo_750 = source.load_geolocation(files.path(ScenePrefix::Gmtco)?, PixelSize::M750)?;
        let fire_750 = source.load_fire_codes(files.path(ScenePrefix::Avafo)?, PixelSize::M750)?;

        let (geo_375, fire_375) = if use_375af {
            (
                Some(source.load_geolocation(files.path(ScenePrefix::Gitco)?, PixelSize::I375)?),
                Some(source.load_fire_codes(files.path(ScenePrefix::Vf375)?, PixelSize::I375)?),
            )
        } else {
            (None, None)
        };

        Ok(Self {
            date: files.date().clone(),
            bands,
            geo_750,
            fire_750,
            geo_375,
            fire_375,
        })
    }
}
