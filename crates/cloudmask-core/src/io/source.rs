use serde::{Deserialize, Serialize};

use crate::consts::FILL_PIXEL;
use crate::error::Result;

/// Number of reflective bands the engine consumes.
pub const REFL_BAND_COUNT: usize = 6;

/// Semantic reflective band indices, in storage order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum BandId {
    Blue = 0,
    Green = 1,
    Red = 2,
    Nir = 3,
    Swir1 = 4,
    Swir2 = 5,
}

impl BandId {
    pub const ALL: [BandId; REFL_BAND_COUNT] = [
        BandId::Blue,
        BandId::Green,
        BandId::Red,
        BandId::Nir,
        BandId::Swir1,
        BandId::Swir2,
    ];

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn name(self) -> &'static str {
        match self {
            BandId::Blue => "blue",
            BandId::Green => "green",
            BandId::Red => "red",
            BandId::Nir => "nir",
            BandId::Swir1 => "swir1",
            BandId::Swir2 => "swir2",
        }
    }
}

impl std::fmt::Display for BandId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Immutable per-run description of the scene geometry and radiometry.
///
/// Reflective samples are scaled-integer reflectance; the thermal band is
/// brightness temperature in degrees C x 100.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RasterMeta {
    pub rows: usize,
    pub cols: usize,
    /// Sentinel marking pixels outside the sensor footprint.
    pub fill_value: i16,
    /// Per-band saturation sentinel as delivered by calibration.
    pub satu_value_ref: [i16; REFL_BAND_COUNT],
    /// Replacement substituted wherever the sentinel occurs.
    pub satu_value_max: [i16; REFL_BAND_COUNT],
    pub therm_satu_value_ref: i16,
    pub therm_satu_value_max: i16,
}

impl RasterMeta {
    /// Metadata with inert saturation sentinels: the reference values never
    /// occur in real samples and the maxima sit above any representable test.
    pub fn new(rows: usize, cols: usize) -> Self {
        Self {
            rows,
            cols,
            fill_value: FILL_PIXEL,
            satu_value_ref: [i16::MIN; REFL_BAND_COUNT],
            satu_value_max: [i16::MAX; REFL_BAND_COUNT],
            therm_satu_value_ref: i16::MIN,
            therm_satu_value_max: i16::MAX,
        }
    }

    pub fn with_reflective_saturation(
        mut self,
        satu_ref: [i16; REFL_BAND_COUNT],
        satu_max: [i16; REFL_BAND_COUNT],
    ) -> Self {
        self.satu_value_ref = satu_ref;
        self.satu_value_max = satu_max;
        self
    }

    pub fn with_thermal_saturation(mut self, satu_ref: i16, satu_max: i16) -> Self {
        self.therm_satu_value_ref = satu_ref;
        self.therm_satu_value_max = satu_max;
        self
    }

    pub fn pixel_count(&self) -> usize {
        self.rows * self.cols
    }
}

/// Streaming row access to calibrated scene data.
///
/// Implementations own their storage. The engine copies each row into its
/// own [`RowBuffers`] before applying saturation substitution, so a source
/// is never mutated by a run.
pub trait RowSource {
    fn meta(&self) -> &RasterMeta;

    /// Fill `buf` (length `cols`) with one row of a reflective band.
    fn read_band_row(&self, band: BandId, row: usize, buf: &mut [i16]) -> Result<()>;

    /// Fill `buf` with one row of brightness temperature, in degrees C x 100.
    fn read_thermal_row(&self, row: usize, buf: &mut [i16]) -> Result<()>;
}

/// Reusable per-row band buffers owned by the engine.
pub struct RowBuffers {
    refl: [Vec<i16>; REFL_BAND_COUNT],
    pub therm: Vec<i16>,
}

impl RowBuffers {
    pub fn new(cols: usize) -> Self {
        Self {
            refl: std::array::from_fn(|_| vec![0; cols]),
            therm: vec![0; cols],
        }
    }

    /// Read every reflective band of `row` into the buffers.
    pub fn read_reflective<S: RowSource>(&mut self, source: &S, row: usize) -> Result<()> {
        for band in BandId::ALL {
            source.read_band_row(band, row, &mut self.refl[band.index()])?;
        }
        Ok(())
    }

    pub fn read_thermal<S: RowSource>(&mut self, source: &S, row: usize) -> Result<()> {
        source.read_thermal_row(row, &mut self.therm)
    }

    pub fn band(&self, band: BandId) -> &[i16] {
        &self.refl[band.index()]
    }

    /// Replace the saturation sentinel with its per-band maximum in every
    /// reflective band.
    pub fn substitute_reflective(&mut self, meta: &RasterMeta) {
        for band in BandId::ALL {
            self.substitute_band(meta, band);
        }
    }

    /// Saturation substitution restricted to the two infrared fill bands.
    pub fn substitute_infrared(&mut self, meta: &RasterMeta) {
        self.substitute_band(meta, BandId::Nir);
        self.substitute_band(meta, BandId::Swir1);
    }

    pub fn substitute_thermal(&mut self, meta: &RasterMeta) {
        for value in &mut self.therm {
            if *value == meta.therm_satu_value_ref {
                *value = meta.therm_satu_value_max;
            }
        }
    }

    fn substitute_band(&mut self, meta: &RasterMeta, band: BandId) {
        let ib = band.index();
        let (satu_ref, satu_max) = (meta.satu_value_ref[ib], meta.satu_value_max[ib]);
        for value in &mut self.refl[ib] {
            if *value == satu_ref {
                *value = satu_max;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_substitution_replaces_only_the_sentinel() {
        let meta = RasterMeta::new(1, 3)
            .with_reflective_saturation([20000; REFL_BAND_COUNT], [16000; REFL_BAND_COUNT])
            .with_thermal_saturation(20000, 12000);

        let mut bufs = RowBuffers::new(3);
        bufs.refl[BandId::Blue.index()] = vec![20000, 500, 16000];
        bufs.therm = vec![20000, 2500, 2500];

        bufs.substitute_reflective(&meta);
        bufs.substitute_thermal(&meta);

        assert_eq!(bufs.band(BandId::Blue), &[16000, 500, 16000]);
        assert_eq!(bufs.therm, vec![12000, 2500, 2500]);
    }

    #[test]
    fn test_substitution_is_idempotent() {
        let meta = RasterMeta::new(1, 2)
            .with_reflective_saturation([20000; REFL_BAND_COUNT], [16000; REFL_BAND_COUNT]);

        let mut bufs = RowBuffers::new(2);
        bufs.refl[BandId::Nir.index()] = vec![20000, 900];
        bufs.substitute_infrared(&meta);
        let once = bufs.band(BandId::Nir).to_vec();
        bufs.substitute_infrared(&meta);
        assert_eq!(bufs.band(BandId::Nir), once.as_slice());
    }
}
