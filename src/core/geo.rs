use crate::types::{ensure_shape, Detection, FireError, FireResult, GeoWindow, Mask, PixelSize};
use ndarray::{Array2, Zip};

/// Per-pixel geolocation for one sensor resolution
#[derive(Debug, Clone)]
pub struct GeoReference {
    latitude: Array2<f32>,
    longitude: Array2<f32>,
    solar_zenith: Option<Array2<f32>>,
    pixel_size: PixelSize,
}

impl GeoReference {
    pub fn new(
        latitude: Array2<f32>,
        longitude: Array2<f32>,
        solar_zenith: Option<Array2<f32>>,
        pixel_size: PixelSize,
    ) -> FireResult<Self> {
        ensure_shape("longitude", latitude.dim(), longitude.dim())?;
        if let Some(zenith) = &solar_zenith {
            ensure_shape("solar zenith", latitude.dim(), zenith.dim())?;
        }
        Ok(Self {
            latitude,
            longitude,
            solar_zenith,
            pixel_size,
        })
    }

    pub fn latitude(&self) -> &Array2<f32> {
        &self.latitude
    }

    pub fn longitude(&self) -> &Array2<f32> {
        &self.longitude
    }

    pub fn solar_zenith(&self) -> Option<&Array2<f32>> {
        self.solar_zenith.as_ref()
    }

    pub fn pixel_size(&self) -> PixelSize {
        self.pixel_size
    }

    pub fn dim(&self) -> (usize, usize) {
        self.latitude.dim()
    }

    /// Clear mask cells that fall outside the window. No-op without a window.
    pub fn apply_window(&self, mask: &mut Mask, window: Option<&GeoWindow>) -> FireResult<()> {
        let window = match window {
            Some(window) => window,
            None => return Ok(()),
        };
        ensure_shape("window mask", self.dim(), mask.dim())?;

        let mut cleared = 0usize;
        Zip::from(mask)
            .and(&self.latitude)
            .and(&self.longitude)
            .for_each(|m, &lat, &lon| {
                if *m && window.excludes(lat as f64, lon as f64) {
                    *m = false;
                    cleared += 1;
                }
            });
        log::debug!("Geographic window cleared {} pixel(s)", cleared);
        Ok(())
    }

    /// Day-side pixels: solar zenith strictly below `max_zenith`
    pub fn day_pixels(&self, max_zenith: f64) -> FireResult<Mask> {
        let zenith = self.solar_zenith.as_ref().ok_or_else(|| {
            FireError::Processing(format!(
                "No solar zenith angles available at {} m resolution",
                self.pixel_size
            ))
        })?;
        let max_zenith = max_zenith as f32;
        Ok(zenith.mapv(|angle| angle < max_zenith))
    }

    /// Locations of the true cells of `mask`, in row-major scan order
    pub fn to_coordinate_list(&self, mask: &Mask) -> FireResult<Vec<Detection>> {
        ensure_shape("coordinate mask", self.dim(), mask.dim())?;
        Ok(mask
            .indexed_iter()
            .filter(|(_, set)| **set)
            .map(|(idx, _)| Detection {
                latitude: self.latitude[idx],
                longitude: self.longitude[idx],
            })
            .collect())
    }
}
