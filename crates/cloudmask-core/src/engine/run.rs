//! Detection entry point and pass orchestration.

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::consts::MINSIGMA;
use crate::error::{CloudmaskError, Result};
use crate::io::{RowBuffers, RowSource};
use crate::mask::{pixel, Confidence};

use super::probability::{apply_confidence, dynamic_thresholds, score_scene};
use super::shadow::{assign_shadows, reconstruct_background};
use super::spectral::classify_scene;
use super::thermal::{temperature_percentiles, StatBits};

/// Tunable inputs of a detection run.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct DetectParams {
    /// Offset added to the dynamic cloud probability thresholds.
    pub cloud_prob_threshold: f32,
}

impl Default for DetectParams {
    fn default() -> Self {
        Self {
            cloud_prob_threshold: 22.5,
        }
    }
}

/// Scene-wide statistics reported back to the caller.
#[derive(Clone, Copy, Debug)]
pub struct SceneStats {
    /// Percent of image-data pixels left clear after the spectral pass.
    pub clear_ptm: f32,
    /// Buffered low clear-land temperature percentile; -1 on the all-cloud
    /// path.
    pub t_templ: f32,
    /// Buffered high clear-land temperature percentile; -1 on the all-cloud
    /// path.
    pub t_temph: f32,
}

/// Run the full potential cloud / cloud-shadow / snow classification.
///
/// `pixel_mask` and `conf_mask` are caller-owned planes of `rows * cols`
/// bytes, rewritten in place; see [`crate::mask`] for the bit layout. When
/// almost nothing in the scene is clear, the run degenerates to the
/// all-cloud shortcut: shadow becomes the complement of cloud, the reported
/// temperature percentiles are -1, and non-fill confidence entries are left
/// untouched.
pub fn detect<S: RowSource>(
    source: &S,
    params: &DetectParams,
    pixel_mask: &mut [u8],
    conf_mask: &mut [u8],
) -> Result<SceneStats> {
    let meta = source.meta();
    if meta.rows == 0 || meta.cols == 0 {
        return Err(CloudmaskError::InvalidDimensions {
            rows: meta.rows,
            cols: meta.cols,
        });
    }
    let pixel_count = meta.pixel_count();
    if pixel_mask.len() != pixel_count {
        return Err(CloudmaskError::MaskLength {
            expected: pixel_count,
            actual: pixel_mask.len(),
        });
    }
    if conf_mask.len() != pixel_count {
        return Err(CloudmaskError::MaskLength {
            expected: pixel_count,
            actual: conf_mask.len(),
        });
    }

    let mut bufs = RowBuffers::new(meta.cols);
    let mut clear_mask = vec![0u8; pixel_count];

    let summary = classify_scene(source, &mut bufs, pixel_mask, &mut clear_mask)?;
    let clear_ptm = summary.clear_ptm();
    info!(
        clear_ptm,
        land_ptm = summary.land_ptm(),
        water_ptm = summary.water_ptm(),
        "clear-sky coverage"
    );

    if clear_ptm - 0.1 <= MINSIGMA {
        // Effectively everything is cloud; thermal statistics are
        // meaningless and shadow becomes the complement of cloud.
        shadow_from_cloud(pixel_mask, conf_mask);
        return Ok(SceneStats {
            clear_ptm,
            t_templ: -1.0,
            t_temph: -1.0,
        });
    }

    let bits = StatBits::select(summary.land_ptm(), summary.water_ptm());
    let stats = temperature_percentiles(source, &mut bufs, &clear_mask, bits)?;

    let mut final_prob = vec![0.0_f32; pixel_count];
    let mut wfinal_prob = vec![0.0_f32; pixel_count];
    score_scene(
        source,
        &mut bufs,
        pixel_mask,
        &stats,
        &mut final_prob,
        &mut wfinal_prob,
    )?;

    let (clr_mask, wclr_mask) = dynamic_thresholds(
        &clear_mask,
        bits,
        &final_prob,
        &wfinal_prob,
        params.cloud_prob_threshold,
    );
    apply_confidence(
        source,
        &mut bufs,
        pixel_mask,
        conf_mask,
        &stats,
        &final_prob,
        &wfinal_prob,
        clr_mask,
        wclr_mask,
    )?;
    drop(final_prob);
    drop(wfinal_prob);

    let (filled_nir, filled_swir1) = reconstruct_background(source, &mut bufs, &clear_mask, bits)?;
    drop(clear_mask);

    assign_shadows(
        source,
        &mut bufs,
        pixel_mask,
        conf_mask,
        &filled_nir,
        &filled_swir1,
    )?;

    Ok(SceneStats {
        clear_ptm,
        t_templ: stats.t_templ,
        t_temph: stats.t_temph,
    })
}

/// All-cloud shortcut: without thermal statistics, every non-cloud pixel is
/// potential shadow. Fill pixels still get their confidence sentinel.
fn shadow_from_cloud(pixel_mask: &mut [u8], conf_mask: &mut [u8]) {
    for (px, conf) in pixel_mask.iter_mut().zip(conf_mask.iter_mut()) {
        if *px & pixel::FILL != 0 {
            *conf = Confidence::Fill as u8;
            continue;
        }
        if *px & pixel::CLOUD == 0 {
            *px |= pixel::SHADOW;
        } else {
            *px &= !pixel::SHADOW;
        }
    }
}
