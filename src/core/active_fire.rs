use crate::types::{ensure_shape, FireCodeImage, FireResult, Mask, PixelSize};
use ndarray::{Array1, Axis, Zip};

// Fire mask codes shared by the I-band and M-band products:
// 0 missing input, 1-2 not processed, 3 water, 4 cloud, 5 non-fire,
// 6 unknown, 7-9 fire at low/nominal/high confidence, 248-255 fill.
pub const NON_FIRE: u8 = 5;
pub const FIRE_LOW: u8 = 7;
pub const FIRE_NOMINAL: u8 = 8;
pub const FIRE_HIGH: u8 = 9;
pub const FILL_MIN: u8 = 248;

/// Default code written over suppressed high-confidence pixels
pub const DEFAULT_RECODE_SENTINEL: u8 = 10;

/// Active fire classification for one scene at one resolution
#[derive(Debug, Clone)]
pub struct FireClassification {
    codes: FireCodeImage,
    pixel_size: PixelSize,
    recode_sentinel: Option<u8>,
}

impl FireClassification {
    pub fn new(codes: FireCodeImage, pixel_size: PixelSize) -> Self {
        Self {
            codes,
            pixel_size,
            recode_sentinel: None,
        }
    }

    pub fn codes(&self) -> &FireCodeImage {
        &self.codes
    }

    pub fn pixel_size(&self) -> PixelSize {
        self.pixel_size
    }

    /// Sentinel used by the most recent recode, if any
    pub fn recode_sentinel(&self) -> Option<u8> {
        self.recode_sentinel
    }

    pub fn dim(&self) -> (usize, usize) {
        self.codes.dim()
    }

    /// Fire pixels of any confidence (codes 7 through 9)
    pub fn conditional(&self) -> Mask {
        self.codes
            .mapv(|code| (FIRE_LOW..=FIRE_HIGH).contains(&code))
    }

    /// Fire pixels, recoding line-noise rows first when a row threshold is given.
    ///
    /// The mask is taken before the recode, so the caller must follow up with
    /// [`FireClassification::filter_conditional`] using the same sentinel.
    pub fn conditional_with_recode(&mut self, row_threshold: Option<usize>, sentinel: u8) -> Mask {
        let conditional = self.conditional();
        if let Some(threshold) = row_threshold {
            self.recode_high_confidence(threshold, sentinel);
        }
        conditional
    }

    /// Pixels classified as valid non-fire (code 5)
    pub fn non_fire(&self) -> Mask {
        self.codes.mapv(|code| code == NON_FIRE)
    }

    /// Number of high-confidence fire pixels in each row
    pub fn count_high_confidence(&self) -> Array1<usize> {
        self.codes
            .map_axis(Axis(1), |row| row.iter().filter(|&&code| code == FIRE_HIGH).count())
    }

    /// Recode high-confidence pixels in rows holding more than `row_threshold` of them.
    ///
    /// Returns the number of recoded rows.
    pub fn recode_high_confidence(&mut self, row_threshold: usize, sentinel: u8) -> usize {
        let counts = self.count_high_confidence();
        let mut recoded_rows = 0;

        for (mut row, &count) in self.codes.axis_iter_mut(Axis(0)).zip(counts.iter()) {
            if count > row_threshold {
                row.iter_mut()
                    .filter(|code| **code == FIRE_HIGH)
                    .for_each(|code| *code = sentinel);
                recoded_rows += 1;
            }
        }

        if recoded_rows > 0 {
            log::warn!(
                "Suppressed {} row(s) with more than {} high-confidence fire pixels ({} m)",
                recoded_rows,
                row_threshold,
                self.pixel_size
            );
        }
        self.recode_sentinel = Some(sentinel);
        recoded_rows
    }

    /// Clear `mask` wherever the code equals `value`
    pub fn filter_conditional(&self, mask: &mut Mask, value: u8) -> FireResult<()> {
        ensure_shape("fire mask", self.codes.dim(), mask.dim())?;
        Zip::from(mask).and(&self.codes).for_each(|m, &code| {
            if code == value {
                *m = false;
            }
        });
        Ok(())
    }

    /// Row and column indices of true cells, in row-major order
    pub fn indices(&self, mask: &Mask) -> FireResult<Vec<(usize, usize)>> {
        ensure_shape("fire mask", self.codes.dim(), mask.dim())?;
        Ok(mask
            .indexed_iter()
            .filter_map(|(idx, &set)| if set { Some(idx) } else { None })
            .collect())
    }

    /// Codes under the true cells of `mask`, in row-major order
    pub fn values(&self, mask: &Mask) -> FireResult<Vec<u8>> {
        Ok(self
            .indices(mask)?
            .into_iter()
            .map(|idx| self.codes[idx])
            .collect())
    }
}
