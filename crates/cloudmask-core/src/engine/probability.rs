//! Third and fourth passes: cloud probability surfaces, dynamic thresholds,
//! and confidence assignment.

use tracing::{debug, info};

use crate::consts::{HIGH_PERCENT_POINT, MINSIGMA, TEMP_BUFFER};
use crate::error::Result;
use crate::io::{BandId, RasterMeta, RowBuffers, RowSource, REFL_BAND_COUNT};
use crate::mask::{clear, pixel, Confidence};
use crate::stats::prctile2;

use super::spectral::{band_values, normalized_difference, visible_saturated};
use super::thermal::{StatBits, ThermalStats};

/// Score every non-fill pixel: water pixels get a temperature-brightness
/// probability, land pixels a temperature-variability probability. Each
/// branch zeroes the other surface so the threshold gathers stay disjoint.
pub fn score_scene<S: RowSource>(
    source: &S,
    bufs: &mut RowBuffers,
    pixel_mask: &[u8],
    stats: &ThermalStats,
    final_prob: &mut [f32],
    wfinal_prob: &mut [f32],
) -> Result<()> {
    let meta = source.meta();
    info!("pass 3: cloud probability surfaces");

    for row in 0..meta.rows {
        bufs.read_reflective(source, row)?;
        bufs.read_thermal(source, row)?;
        bufs.substitute_reflective(meta);
        bufs.substitute_thermal(meta);

        for col in 0..meta.cols {
            let index = row * meta.cols + col;
            if pixel_mask[index] & pixel::FILL != 0 {
                continue;
            }
            let therm = bufs.therm[col] as f32;

            if pixel_mask[index] & pixel::WATER != 0 {
                wfinal_prob[index] =
                    water_probability(bufs.band(BandId::Swir1)[col], therm, stats.t_wtemp);
                final_prob[index] = 0.0;
            } else {
                final_prob[index] = land_probability(&band_values(bufs, col), therm, stats, meta);
                wfinal_prob[index] = 0.0;
            }
        }
    }
    Ok(())
}

/// Temperature times brightness probability over water.
fn water_probability(swir1: i16, therm: f32, t_wtemp: f32) -> f32 {
    let mut wtemp_prob = (t_wtemp - therm) / 400.0;
    if wtemp_prob < MINSIGMA {
        wtemp_prob = 0.0;
    }

    let mut brightness_prob = swir1 as f32 / 1100.0;
    if brightness_prob - 1.0 > MINSIGMA {
        brightness_prob = 1.0;
    }
    if brightness_prob < MINSIGMA {
        brightness_prob = 0.0;
    }

    100.0 * wtemp_prob * brightness_prob
}

/// Temperature times variability probability over land.
fn land_probability(
    refl: &[i16; REFL_BAND_COUNT],
    therm: f32,
    stats: &ThermalStats,
    meta: &RasterMeta,
) -> f32 {
    let [blue, green, red, nir, swir1, _swir2] = *refl;

    // Temperature probability is deliberately left unclamped above 1.
    let mut temp_prob = (stats.t_temph - therm) / stats.temp_l;
    if temp_prob < MINSIGMA {
        temp_prob = 0.0;
    }

    let mut ndvi = normalized_difference(nir, red);
    let mut ndsi = normalized_difference(green, swir1);
    if ndsi < MINSIGMA {
        ndsi = 0.0;
    }
    if ndvi < MINSIGMA {
        ndvi = 0.0;
    }

    let visi_mean = (blue as f32 + green as f32 + red as f32) / 3.0;
    let mut whiteness = if visi_mean != 0.0 {
        ((blue as f32 - visi_mean).abs()
            + (green as f32 - visi_mean).abs()
            + (red as f32 - visi_mean).abs())
            / visi_mean
    } else {
        0.0
    };
    if visible_saturated(blue, green, red, meta) {
        whiteness = 0.0;
    }

    let vari_prob = 1.0 - ndsi.max(ndvi).max(whiteness);
    100.0 * temp_prob * vari_prob
}

/// Dynamic scene thresholds: the high percentile of the clear-pixel
/// probability distributions, offset by the configured margin.
pub fn dynamic_thresholds(
    clear_mask: &[u8],
    bits: StatBits,
    final_prob: &[f32],
    wfinal_prob: &[f32],
    cloud_prob_threshold: f32,
) -> (f32, f32) {
    let clr_mask = threshold_for(clear_mask, bits.land, final_prob, cloud_prob_threshold);
    let wclr_mask = threshold_for(clear_mask, bits.water, wfinal_prob, cloud_prob_threshold);
    debug!(clr_mask, wclr_mask, "cloud probability thresholds");
    (clr_mask, wclr_mask)
}

fn threshold_for(clear_mask: &[u8], bit: u8, probs: &[f32], offset: f32) -> f32 {
    let mut samples: Vec<f32> = Vec::new();
    let mut prob_min = 0.0_f32;
    let mut prob_max = 0.0_f32;

    for (index, &prob) in probs.iter().enumerate() {
        if clear_mask[index] & clear::FILL != 0 {
            continue;
        }
        if clear_mask[index] & bit == 0 {
            continue;
        }
        if prob - prob_max > MINSIGMA {
            prob_max = prob;
        }
        if prob_min - prob > MINSIGMA {
            prob_min = prob;
        }
        samples.push(prob);
    }

    prctile2(&samples, prob_min, prob_max, HIGH_PERCENT_POINT) + offset
}

/// Assign one confidence class per non-fill pixel and finalize the cloud
/// bit: HIGH keeps it, MED and LOW clear it. Cases are evaluated top-down
/// and the first match wins.
#[allow(clippy::too_many_arguments)]
pub fn apply_confidence<S: RowSource>(
    source: &S,
    bufs: &mut RowBuffers,
    pixel_mask: &mut [u8],
    conf_mask: &mut [u8],
    stats: &ThermalStats,
    final_prob: &[f32],
    wfinal_prob: &[f32],
    clr_mask: f32,
    wclr_mask: f32,
) -> Result<()> {
    let meta = source.meta();
    info!("pass 4: confidence assignment");

    for row in 0..meta.rows {
        bufs.read_thermal(source, row)?;
        bufs.substitute_thermal(meta);

        for col in 0..meta.cols {
            let index = row * meta.cols + col;
            if pixel_mask[index] & pixel::FILL != 0 {
                continue;
            }
            let therm = bufs.therm[col] as f32;

            let cloud = pixel_mask[index] & pixel::CLOUD != 0;
            let water = pixel_mask[index] & pixel::WATER != 0;

            if (cloud && !water && final_prob[index] > clr_mask)
                || (cloud && water && wfinal_prob[index] > wclr_mask)
                || therm < stats.t_templ + TEMP_BUFFER - 3500.0
            {
                conf_mask[index] = Confidence::High as u8;
                pixel_mask[index] |= pixel::CLOUD;
            } else if (cloud && !water && final_prob[index] > clr_mask - 10.0)
                || (cloud && water && wfinal_prob[index] > wclr_mask - 10.0)
            {
                conf_mask[index] = Confidence::Med as u8;
                pixel_mask[index] &= !pixel::CLOUD;
            } else {
                conf_mask[index] = Confidence::Low as u8;
                pixel_mask[index] &= !pixel::CLOUD;
            }
        }
    }
    Ok(())
}
