use crate::types::{Mask, RawCounts, ReflectanceImage, FILL_VALUE_THRESHOLD};
use std::cell::OnceCell;

/// One spectral band of scaled digital counts with its reflectance factors.
///
/// The validity mask is derived from the raw counts when the measurement is
/// built. Corrected reflectance is computed on first request and cached; the
/// raw array is never rewritten.
#[derive(Debug, Clone)]
pub struct BandMeasurement {
    raw: RawCounts,
    scale_offset: [f32; 2],
    validity: Mask,
    corrected: OnceCell<ReflectanceImage>,
}

impl BandMeasurement {
    /// Create a measurement from raw counts and a `[scale, offset]` pair
    pub fn new(raw: RawCounts, scale_offset: [f32; 2]) -> Self {
        let validity = raw.mapv(|count| count < FILL_VALUE_THRESHOLD);
        Self {
            raw,
            scale_offset,
            validity,
            corrected: OnceCell::new(),
        }
    }

    /// Corrected reflectance, `raw * scale + offset`
    pub fn corrected(&self) -> &ReflectanceImage {
        self.corrected.get_or_init(|| {
            let [scale, offset] = self.scale_offset;
            log::debug!(
                "Correcting {}x{} band (scale {}, offset {})",
                self.raw.nrows(),
                self.raw.ncols(),
                scale,
                offset
            );
            self.raw.mapv(|count| count as f32 * scale + offset)
        })
    }

    /// True where the raw count is not a reserved fill value
    pub fn validity(&self) -> &Mask {
        &self.validity
    }

    pub fn raw(&self) -> &RawCounts {
        &self.raw
    }

    pub fn scale_offset(&self) -> [f32; 2] {
        self.scale_offset
    }

    pub fn dim(&self) -> (usize, usize) {
        self.raw.dim()
    }

    pub fn is_corrected(&self) -> bool {
        self.corrected.get().is_some()
    }
}
