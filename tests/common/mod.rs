#![allow(dead_code)]

use ndarray::{array, Array2};
use std::path::Path;
use viirs_ba::core::{BandMeasurement, FireClassification, GeoReference};
use viirs_ba::io::{ImageDate, ScenePrefix};
use viirs_ba::{FireError, FireResult, PixelSize, SceneSource};

pub const IMAGE_DATE: &str = "d20130503_t2104190";

/// Reflectance = raw * 0.001
pub const SCALE_OFFSET: [f32; 2] = [0.001, 0.0];

/// 2x2 scene where only (0, 1) passes every burned-area test:
/// (0, 0) fails M07UB, (1, 0) fails the band ratio, (1, 1) has a zero M11.
pub fn m07() -> Array2<u16> {
    array![[250, 100], [100, 100]]
}

pub fn m08() -> Array2<u16> {
    array![[200, 200], [250, 200]]
}

pub fn m10() -> Array2<u16> {
    array![[200, 200], [200, 200]]
}

pub fn m11() -> Array2<u16> {
    array![[300, 300], [200, 0]]
}

pub fn latitude_750() -> Array2<f32> {
    array![[45.0, 45.0], [44.9, 44.9]]
}

pub fn longitude_750() -> Array2<f32> {
    array![[-120.0, -119.9], [-120.0, -119.9]]
}

pub fn zenith_750() -> Array2<f32> {
    Array2::from_elem((2, 2), 30.0)
}

/// One fire pixel at (1, 1), nominal confidence
pub fn fire_750() -> Array2<u8> {
    array![[5, 5], [5, 8]]
}

/// Row 0 holds three high-confidence pixels, rows 1 and 2 three fire pixels in total
pub fn fire_375() -> Array2<u8> {
    array![[9, 9, 9, 5], [9, 8, 5, 5], [7, 0, 5, 5]]
}

pub fn latitude_375() -> Array2<f32> {
    array![
        [45.0, 45.0, 45.0, 45.0],
        [44.95, 44.95, 44.95, 44.95],
        [44.9, 44.9, 44.9, 44.9]
    ]
}

pub fn longitude_375() -> Array2<f32> {
    array![
        [-120.0, -119.95, -119.9, -119.85],
        [-120.0, -119.95, -119.9, -119.85],
        [-120.0, -119.95, -119.9, -119.85]
    ]
}

/// Serves the synthetic arrays regardless of file contents
pub struct SyntheticScene;

impl SceneSource for SyntheticScene {
    fn load_reflectance(&self, path: &Path, band: ScenePrefix) -> FireResult<BandMeasurement> {
        assert!(path.exists(), "located file should exist: {}", path.display());
        let raw = match band {
            ScenePrefix::Svm07 => m07(),
            ScenePrefix::Svm08 => m08(),
            ScenePrefix::Svm10 => m10(),
            ScenePrefix::Svm11 => m11(),
            other => return Err(FireError::Processing(format!("{} is not a reflectance band", other))),
        };
        Ok(BandMeasurement::new(raw, SCALE_OFFSET))
    }

    fn load_geolocation(&self, _path: &Path, pixel_size: PixelSize) -> FireResult<GeoReference> {
        match pixel_size {
            PixelSize::M750 => GeoReference::new(latitude_750(), longitude_750(), Some(zenith_750()), pixel_size),
            PixelSize::I375 => GeoReference::new(latitude_375(), longitude_375(), None, pixel_size),
        }
    }

    fn load_fire_codes(&self, _path: &Path, pixel_size: PixelSize) -> FireResult<FireClassification> {
        let codes = match pixel_size {
            PixelSize::M750 => fire_750(),
            PixelSize::I375 => fire_375(),
        };
        Ok(FireClassification::new(codes, pixel_size))
    }
}

/// Create empty product files for every prefix at `date`
pub fn write_scene_files(dir: &Path, date: &str, prefixes: &[ScenePrefix]) {
    let date = ImageDate::parse(date).unwrap();
    for prefix in prefixes {
        let name = format!(
            "{}_npp_{}_e2105432_b00001_c20130504033017262758_all-_dev.{}",
            prefix.as_str(),
            date.token(),
            prefix.extension()
        );
        std::fs::write(dir.join(name), b"").unwrap();
    }
}

pub const ALL_PREFIXES: [ScenePrefix; 8] = [
    ScenePrefix::Svm07,
    ScenePrefix::Svm08,
    ScenePrefix::Svm10,
    ScenePrefix::Svm11,
    ScenePrefix::Gmtco,
    ScenePrefix::Gitco,
    ScenePrefix::Vf375,
    ScenePrefix::Avafo,
];

/// Run template rooted at `base_dir`
pub fn template_ini(base_dir: &Path, out_dir: &Path, text: bool, postgis: bool, shapes: bool) -> String {
    let flag = |on: bool| if on { "y" } else { "n" };
    format!(
        "\
[InDirectory]
BaseDirectory = {base}

[ActiveFire]
use375af = y
use750af = y
limit375 = 2

[Thresholds]
M07UB = 0.19
M08LB = 0.11
M08UB = 0.28
M10LB = 0.07
M10UB = 1.00
M11LB = 0.05
RthSub = 0.05
Rth = 0.81
RthLB = 0.00
MaxSolZen = 75.00

[ConfirmBurnParameters]
TemporalProximity = 5
SpatialProximity = 752

[OutputFlags]
TextFile = {text}
ShapeFile = {shapes}
PostGIS = {postgis}
OutShapeDir = {out}
PostgresqlBin = /usr/bin

[ImageDates]
ImageDates = {date}

[DataBaseInfo]
DataBaseName = viirs_calibration
UserName = viirs
password = secret
Schema = master
",
        base = base_dir.display(),
        out = out_dir.join("template").display(),
        text = flag(text),
        shapes = flag(shapes),
        postgis = flag(postgis),
        date = IMAGE_DATE,
    )
}
