use crate::config::ConfigVector;
use crate::core::active_fire::FireClassification;
use crate::core::geo::GeoReference;
use crate::core::reflectance::BandMeasurement;
use crate::types::{ensure_shape, FireResult, GeoWindow, Mask};
use ndarray::Zip;

/// The four M-band reflectances used by the burned-area test
#[derive(Debug, Clone)]
pub struct ReflectanceBands {
    /// M07, 0.86 um
    pub m07: BandMeasurement,
    /// M08, 1.24 um
    pub m08: BandMeasurement,
    /// M10, 1.61 um
    pub m10: BandMeasurement,
    /// M11, 2.25 um
    pub m11: BandMeasurement,
}

impl ReflectanceBands {
    pub fn dim(&self) -> (usize, usize) {
        self.m07.dim()
    }

    fn check_shapes(&self) -> FireResult<()> {
        let dim = self.dim();
        ensure_shape("M08 reflectance", dim, self.m08.dim())?;
        ensure_shape("M10 reflectance", dim, self.m10.dim())?;
        ensure_shape("M11 reflectance", dim, self.m11.dim())?;
        Ok(())
    }
}

/// Threshold bounds in band precision
#[derive(Debug, Clone, Copy)]
struct SpectralBounds {
    m07_ub: f32,
    m08_lb: f32,
    m08_ub: f32,
    m10_lb: f32,
    m10_ub: f32,
    m11_lb: f32,
    rth_sub: f32,
    rth: f32,
    rth_lb: f32,
}

impl SpectralBounds {
    fn from_vector(vector: &ConfigVector) -> Self {
        Self {
            m07_ub: vector.m07_ub as f32,
            m08_lb: vector.m08_lb as f32,
            m08_ub: vector.m08_ub as f32,
            m10_lb: vector.m10_lb as f32,
            m10_ub: vector.m10_ub as f32,
            m11_lb: vector.m11_lb as f32,
            rth_sub: vector.rth_sub as f32,
            rth: vector.rth as f32,
            rth_lb: vector.rth_lb as f32,
        }
    }

    #[inline]
    fn test(&self, m07: f32, m08: f32, m10: f32, m11: f32) -> bool {
        m07 < self.m07_ub
            && m08 > self.m08_lb
            && m08 < self.m08_ub
            && m10 > self.m10_lb
            && m10 < self.m10_ub
            && m11 > self.m11_lb
            && self.ratio_test(m08, m11)
    }

    /// `RthLB <= (m08 - RthSub) / m11 < Rth`.
    ///
    /// A zero denominator takes `RthLB - 1` against the lower bound and
    /// `Rth + 1` against the upper bound, so it never passes.
    #[inline]
    fn ratio_test(&self, m08: f32, m11: f32) -> bool {
        let (lower, upper) = if m11 != 0.0 {
            let ratio = (m08 - self.rth_sub) / m11;
            (ratio, ratio)
        } else {
            (self.rth_lb - 1.0, self.rth + 1.0)
        };
        lower >= self.rth_lb && upper < self.rth
    }
}

/// Burned-area thresholding over corrected M-band reflectance
pub struct BurnAreaThresholder {
    vector: ConfigVector,
}

impl BurnAreaThresholder {
    pub fn new(vector: ConfigVector) -> Self {
        Self { vector }
    }

    pub fn vector(&self) -> &ConfigVector {
        &self.vector
    }

    /// Compute the burned-area mask for one scene.
    ///
    /// Only day-side, valid, non-fire pixels passing every spectral bound and
    /// the band-ratio test are set. The geographic window, if any, is applied
    /// last.
    pub fn threshold(
        &self,
        bands: &ReflectanceBands,
        fire: &FireClassification,
        geo: &GeoReference,
        window: Option<&GeoWindow>,
    ) -> FireResult<Mask> {
        log::info!("Thresholding burned area");
        bands.check_shapes()?;
        let dim = bands.dim();
        ensure_shape("750 m active fire", dim, fire.dim())?;
        ensure_shape("750 m geolocation", dim, geo.dim())?;
        log::debug!("Scene dimensions: {} x {}", dim.0, dim.1);

        let mut mask = self.spectral_mask(bands);

        let non_fire = fire.non_fire();
        let day = geo.day_pixels(self.vector.max_sol_zen)?;
        Zip::from(&mut mask)
            .and(&non_fire)
            .and(&day)
            .for_each(|m, &nf, &d| *m = *m && nf && d);

        Zip::from(&mut mask)
            .and(bands.m07.validity())
            .and(bands.m08.validity())
            .and(bands.m10.validity())
            .and(bands.m11.validity())
            .for_each(|m, &v07, &v08, &v10, &v11| *m = *m && v07 && v08 && v10 && v11);

        geo.apply_window(&mut mask, window)?;

        log::info!(
            "Burned-area thresholding flagged {} of {} pixels",
            mask.iter().filter(|&&m| m).count(),
            mask.len()
        );
        Ok(mask)
    }

    #[cfg(feature = "parallel")]
    fn spectral_mask(&self, bands: &ReflectanceBands) -> Mask {
        let bounds = SpectralBounds::from_vector(&self.vector);
        Zip::from(bands.m07.corrected())
            .and(bands.m08.corrected())
            .and(bands.m10.corrected())
            .and(bands.m11.corrected())
            .par_map_collect(|&m07, &m08, &m10, &m11| bounds.test(m07, m08, m10, m11))
    }

    #[cfg(not(feature = "parallel"))]
    fn spectral_mask(&self, bands: &ReflectanceBands) -> Mask {
        let bounds = SpectralBounds::from_vector(&self.vector);
        Zip::from(bands.m07.corrected())
            .and(bands.m08.corrected())
            .and(bands.m10.corrected())
            .and(bands.m11.corrected())
            .map_collect(|&m07, &m08, &m10, &m11| bounds.test(m07, m08, m10, m11))
    }
}
