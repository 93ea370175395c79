use ndarray::Array2;

use crate::error::{CloudmaskError, Result};

use super::source::{BandId, RasterMeta, RowSource, REFL_BAND_COUNT};

/// Fully in-memory scene, the reference [`RowSource`] implementation.
pub struct MemoryScene {
    meta: RasterMeta,
    bands: [Array2<i16>; REFL_BAND_COUNT],
    thermal: Array2<i16>,
}

impl MemoryScene {
    /// Build a scene from six reflective bands and one thermal band. Every
    /// band must match the metadata dimensions.
    pub fn new(
        meta: RasterMeta,
        bands: [Array2<i16>; REFL_BAND_COUNT],
        thermal: Array2<i16>,
    ) -> Result<Self> {
        if meta.rows == 0 || meta.cols == 0 {
            return Err(CloudmaskError::InvalidDimensions {
                rows: meta.rows,
                cols: meta.cols,
            });
        }

        let expected = (meta.rows, meta.cols);
        for (band, data) in BandId::ALL.iter().zip(&bands) {
            if data.dim() != expected {
                return Err(shape_error(band.name(), data.dim(), expected));
            }
        }
        if thermal.dim() != expected {
            return Err(shape_error("thermal", thermal.dim(), expected));
        }

        Ok(Self {
            meta,
            bands,
            thermal,
        })
    }

    /// Scene where every pixel carries the same band values; handy for
    /// synthetic runs.
    pub fn uniform(
        meta: RasterMeta,
        refl: [i16; REFL_BAND_COUNT],
        therm: i16,
    ) -> Result<Self> {
        let shape = (meta.rows, meta.cols);
        let bands = std::array::from_fn(|ib| Array2::from_elem(shape, refl[ib]));
        let thermal = Array2::from_elem(shape, therm);
        Self::new(meta, bands, thermal)
    }

    pub fn band(&self, band: BandId) -> &Array2<i16> {
        &self.bands[band.index()]
    }

    pub fn thermal(&self) -> &Array2<i16> {
        &self.thermal
    }
}

impl RowSource for MemoryScene {
    fn meta(&self) -> &RasterMeta {
        &self.meta
    }

    fn read_band_row(&self, band: BandId, row: usize, buf: &mut [i16]) -> Result<()> {
        copy_row(&self.bands[band.index()], row, buf, self.meta.rows)
    }

    fn read_thermal_row(&self, row: usize, buf: &mut [i16]) -> Result<()> {
        copy_row(&self.thermal, row, buf, self.meta.rows)
    }
}

fn copy_row(data: &Array2<i16>, row: usize, buf: &mut [i16], total: usize) -> Result<()> {
    if row >= total {
        return Err(CloudmaskError::RowOutOfRange { row, total });
    }
    for (dst, src) in buf.iter_mut().zip(data.row(row)) {
        *dst = *src;
    }
    Ok(())
}

fn shape_error(
    band: &'static str,
    actual: (usize, usize),
    expected: (usize, usize),
) -> CloudmaskError {
    CloudmaskError::BandShape {
        band,
        rows: actual.0,
        cols: actual.1,
        expected_rows: expected.0,
        expected_cols: expected.1,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mismatched_band_is_rejected() {
        let meta = RasterMeta::new(2, 2);
        let mut bands: [Array2<i16>; REFL_BAND_COUNT] =
            std::array::from_fn(|_| Array2::zeros((2, 2)));
        bands[BandId::Swir2.index()] = Array2::zeros((2, 3));
        let thermal = Array2::zeros((2, 2));
        assert!(MemoryScene::new(meta, bands, thermal).is_err());
    }

    #[test]
    fn test_row_reads_copy_the_requested_row() {
        let meta = RasterMeta::new(2, 3);
        let scene = MemoryScene::uniform(meta, [1, 2, 3, 4, 5, 6], 2500).unwrap();

        let mut buf = vec![0i16; 3];
        scene.read_band_row(BandId::Swir1, 1, &mut buf).unwrap();
        assert_eq!(buf, vec![5, 5, 5]);

        scene.read_thermal_row(0, &mut buf).unwrap();
        assert_eq!(buf, vec![2500, 2500, 2500]);

        assert!(scene.read_thermal_row(2, &mut buf).is_err());
    }
}
