//! Fifth and sixth passes: infrared background reconstruction and shadow
//! assignment.

use ndarray::Array2;
use tracing::{debug, info};

use crate::consts::LOW_PERCENT_POINT;
use crate::error::Result;
use crate::fill::fill_local_minima;
use crate::io::{BandId, RowBuffers, RowSource};
use crate::mask::{clear, pixel, Confidence};
use crate::stats::prctile;

use super::thermal::StatBits;

/// Gather the clear-land infrared background, then flood-fill both infrared
/// rasters against their background percentile. The two fills share no
/// state and run side by side.
pub fn reconstruct_background<S: RowSource>(
    source: &S,
    bufs: &mut RowBuffers,
    clear_mask: &[u8],
    bits: StatBits,
) -> Result<(Array2<i16>, Array2<i16>)> {
    let meta = source.meta();
    info!("pass 5: infrared background reconstruction");

    let mut nir_samples: Vec<i16> = Vec::new();
    let mut swir1_samples: Vec<i16> = Vec::new();
    let (mut nir_min, mut nir_max) = (0_i16, 0_i16);
    let (mut swir1_min, mut swir1_max) = (0_i16, 0_i16);

    let mut nir_data = Array2::<i16>::zeros((meta.rows, meta.cols));
    let mut swir1_data = Array2::<i16>::zeros((meta.rows, meta.cols));

    for row in 0..meta.rows {
        bufs.read_reflective(source, row)?;
        bufs.substitute_infrared(meta);

        for col in 0..meta.cols {
            let index = row * meta.cols + col;
            if clear_mask[index] & clear::FILL != 0 {
                continue;
            }
            if clear_mask[index] & bits.land != 0 {
                let nir = bufs.band(BandId::Nir)[col];
                nir_min = nir_min.min(nir);
                nir_max = nir_max.max(nir);
                nir_samples.push(nir);

                let swir1 = bufs.band(BandId::Swir1)[col];
                swir1_min = swir1_min.min(swir1);
                swir1_max = swir1_max.max(swir1);
                swir1_samples.push(swir1);
            }
        }

        for (dst, &value) in nir_data.row_mut(row).iter_mut().zip(bufs.band(BandId::Nir)) {
            *dst = value;
        }
        for (dst, &value) in swir1_data
            .row_mut(row)
            .iter_mut()
            .zip(bufs.band(BandId::Swir1))
        {
            *dst = value;
        }
    }

    let nir_boundary = prctile(&nir_samples, nir_min, nir_max, LOW_PERCENT_POINT);
    let swir1_boundary = prctile(&swir1_samples, swir1_min, swir1_max, LOW_PERCENT_POINT);
    drop(nir_samples);
    drop(swir1_samples);
    debug!(nir_boundary, swir1_boundary, "infrared background levels");

    let (filled_nir, filled_swir1) = rayon::join(
        || fill_local_minima("NIR", &nir_data, nir_boundary),
        || fill_local_minima("SWIR1", &swir1_data, swir1_boundary),
    );
    Ok((filled_nir?, filled_swir1?))
}

/// Mark shadow wherever both filled infrared bands stand well above the
/// original samples, and resolve the remaining water/cloud conflicts in
/// favor of cloud.
pub fn assign_shadows<S: RowSource>(
    source: &S,
    bufs: &mut RowBuffers,
    pixel_mask: &mut [u8],
    conf_mask: &mut [u8],
    filled_nir: &Array2<i16>,
    filled_swir1: &Array2<i16>,
) -> Result<()> {
    let meta = source.meta();
    info!("pass 6: shadow assignment");

    for row in 0..meta.rows {
        bufs.read_reflective(source, row)?;
        bufs.read_thermal(source, row)?;
        bufs.substitute_infrared(meta);

        for col in 0..meta.cols {
            let index = row * meta.cols + col;
            if pixel_mask[index] & pixel::FILL != 0 {
                conf_mask[index] = Confidence::Fill as u8;
                continue;
            }

            let new_nir = filled_nir[[row, col]] as i32 - bufs.band(BandId::Nir)[col] as i32;
            let new_swir1 =
                filled_swir1[[row, col]] as i32 - bufs.band(BandId::Swir1)[col] as i32;
            let shadow_prob = new_nir.min(new_swir1);

            if shadow_prob > 200 {
                pixel_mask[index] |= pixel::SHADOW;
            } else {
                pixel_mask[index] &= !pixel::SHADOW;
            }

            // Cloud wins when a pixel carries both flags.
            if pixel_mask[index] & pixel::WATER != 0 && pixel_mask[index] & pixel::CLOUD != 0 {
                pixel_mask[index] &= !pixel::WATER;
            }
        }
    }
    Ok(())
}
