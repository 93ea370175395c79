//! First pass: per-pixel spectral classification.

use tracing::info;

use crate::consts::MINSIGMA;
use crate::error::Result;
use crate::io::{BandId, RasterMeta, RowBuffers, RowSource, REFL_BAND_COUNT};
use crate::mask::{clear, pixel};

/// Scene-wide counters accumulated during the spectral pass.
#[derive(Clone, Copy, Debug, Default)]
pub struct SpectralSummary {
    pub image_data: usize,
    pub clear: usize,
    pub clear_land: usize,
    pub clear_water: usize,
}

impl SpectralSummary {
    /// Percent of image-data pixels left clear; 0 for an all-fill scene.
    pub fn clear_ptm(&self) -> f32 {
        percent(self.clear, self.image_data)
    }

    pub fn land_ptm(&self) -> f32 {
        percent(self.clear_land, self.image_data)
    }

    pub fn water_ptm(&self) -> f32 {
        percent(self.clear_water, self.image_data)
    }
}

fn percent(count: usize, total: usize) -> f32 {
    if total == 0 {
        return 0.0;
    }
    100.0 * count as f32 / total as f32
}

/// Classify every pixel spectrally, writing the provisional CLOUD / SNOW /
/// WATER bits and the clear-sky scratch mask, and accumulating the scene
/// counters that steer the later passes.
pub fn classify_scene<S: RowSource>(
    source: &S,
    bufs: &mut RowBuffers,
    pixel_mask: &mut [u8],
    clear_mask: &mut [u8],
) -> Result<SpectralSummary> {
    let meta = source.meta();
    let mut summary = SpectralSummary::default();

    info!("pass 1: spectral classification");
    for row in 0..meta.rows {
        bufs.read_reflective(source, row)?;
        bufs.read_thermal(source, row)?;
        bufs.substitute_reflective(meta);
        bufs.substitute_thermal(meta);

        for col in 0..meta.cols {
            let index = row * meta.cols + col;
            let therm = bufs.therm[col];

            if is_fill(bufs, col, therm, meta) {
                pixel_mask[index] = pixel::FILL;
                clear_mask[index] = clear::FILL;
                continue;
            }
            summary.image_data += 1;

            let refl = band_values(bufs, col);
            pixel_mask[index] = classify_pixel(&refl, therm, meta);

            if pixel_mask[index] & pixel::CLOUD != 0 {
                clear_mask[index] = clear::NONE;
            } else {
                clear_mask[index] = clear::CLEAR;
                summary.clear += 1;
                if pixel_mask[index] & pixel::WATER != 0 {
                    clear_mask[index] |= clear::WATER;
                    summary.clear_water += 1;
                } else {
                    clear_mask[index] |= clear::LAND;
                    summary.clear_land += 1;
                }
            }
        }
    }

    info!(
        image_data = summary.image_data,
        clear = summary.clear,
        clear_land = summary.clear_land,
        clear_water = summary.clear_water,
        "spectral pass complete"
    );
    Ok(summary)
}

/// Spectral tests for one non-fill pixel; returns the CLOUD / SNOW / WATER
/// bits. The cloud chain only tightens: a candidate survives the basic test,
/// the whiteness cut, the haze cut, and the infrared ratio cut in turn.
fn classify_pixel(refl: &[i16; REFL_BAND_COUNT], therm: i16, meta: &RasterMeta) -> u8 {
    let [blue, green, red, nir, swir1, swir2] = *refl;
    let mut bits = 0u8;

    let ndvi = normalized_difference(nir, red);
    let ndsi = normalized_difference(green, swir1);

    // Basic cloud test: cold, bright in SWIR2, and dominated by neither
    // snow nor dense vegetation.
    let mut cloud = ndsi - 0.8 < MINSIGMA
        && ndvi - 0.8 < MINSIGMA
        && swir2 > 300
        && therm < 2700;

    // Snow, including snow under thin or icy cloud.
    if ndsi - 0.15 > MINSIGMA && therm < 1000 && nir > 1100 && green > 1000 {
        bits |= pixel::SNOW;
    }

    // Water, tolerant of thin cloud.
    if (ndvi - 0.01 < MINSIGMA && nir < 1100)
        || (ndvi - 0.1 < MINSIGMA && ndvi > MINSIGMA && nir < 500)
    {
        bits |= pixel::WATER;
    }

    // Visible-band flatness: bright and dark clouds are both achromatic.
    let saturated = visible_saturated(blue, green, red, meta);
    let mut whiteness = 0.0;
    if cloud {
        let visi_mean = (blue as f32 + green as f32 + red as f32) / 3.0;
        whiteness = if visi_mean != 0.0 {
            ((blue as f32 - visi_mean).abs()
                + (green as f32 - visi_mean).abs()
                + (red as f32 - visi_mean).abs())
                / visi_mean
        } else {
            // Nothing in the visible bands; rule the pixel out of the chain.
            100.0
        };
    }
    if saturated {
        whiteness = 0.0;
    }
    cloud = cloud && whiteness - 0.7 < MINSIGMA;

    // Haze-optimized transform.
    let hot = blue as f32 - 0.5 * red as f32 - 800.0;
    cloud = cloud && (hot > MINSIGMA || saturated);

    // NIR/SWIR1 ratio screens bright rock and sand.
    cloud = cloud && swir1 != 0 && (nir as f32 / swir1 as f32) - 0.75 > MINSIGMA;

    if cloud {
        bits |= pixel::CLOUD;
    }
    bits
}

fn is_fill(bufs: &RowBuffers, col: usize, therm: i16, meta: &RasterMeta) -> bool {
    // Scaled LPGS thermal data can land below the sentinel, so test <=.
    therm <= meta.fill_value
        || BandId::ALL
            .iter()
            .any(|band| bufs.band(*band)[col] == meta.fill_value)
}

/// `(a - b) / (a + b)`, defaulting to 0.01 when the denominator is zero.
pub(super) fn normalized_difference(a: i16, b: i16) -> f32 {
    let sum = a as i32 + b as i32;
    if sum != 0 {
        (a as i32 - b as i32) as f32 / sum as f32
    } else {
        0.01
    }
}

/// Whether any visible band sits at its saturation ceiling. Data-type
/// conversion upstream can shave one count off, hence the `- 1`.
pub(super) fn visible_saturated(blue: i16, green: i16, red: i16, meta: &RasterMeta) -> bool {
    blue >= meta.satu_value_max[BandId::Blue.index()] - 1
        || green >= meta.satu_value_max[BandId::Green.index()] - 1
        || red >= meta.satu_value_max[BandId::Red.index()] - 1
}

pub(super) fn band_values(bufs: &RowBuffers, col: usize) -> [i16; REFL_BAND_COUNT] {
    std::array::from_fn(|ib| bufs.band(BandId::ALL[ib])[col])
}
