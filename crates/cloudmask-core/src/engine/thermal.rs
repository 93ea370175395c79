//! Second pass: clear-sky temperature percentiles.

use tracing::{debug, info};

use crate::consts::{HIGH_PERCENT_POINT, LOW_PERCENT_POINT, MINSIGMA, TEMP_BUFFER};
use crate::error::Result;
use crate::io::{RowBuffers, RowSource};
use crate::mask::clear;
use crate::stats::prctile;

/// Which scratch bits feed the land and water statistics.
///
/// When a class covers too little of the scene its statistics would be
/// noise, so the sample pool widens to all clear pixels.
#[derive(Clone, Copy, Debug)]
pub struct StatBits {
    pub land: u8,
    pub water: u8,
}

impl StatBits {
    pub fn select(land_ptm: f32, water_ptm: f32) -> Self {
        Self {
            land: if land_ptm - 0.1 >= MINSIGMA {
                clear::LAND
            } else {
                clear::CLEAR
            },
            water: if water_ptm - 0.1 >= MINSIGMA {
                clear::WATER
            } else {
                clear::CLEAR
            },
        }
    }
}

/// Buffered clear-sky temperature window, in degrees C x 100.
#[derive(Clone, Copy, Debug)]
pub struct ThermalStats {
    /// Low clear-land percentile, widened down by the buffer.
    pub t_templ: f32,
    /// High clear-land percentile, widened up by the buffer.
    pub t_temph: f32,
    /// High clear-water percentile, unbuffered.
    pub t_wtemp: f32,
    /// Width of the buffered land window.
    pub temp_l: f32,
}

/// Sample thermal data over the clear-sky pools and reduce it to the
/// percentile window that drives the probability passes.
pub fn temperature_percentiles<S: RowSource>(
    source: &S,
    bufs: &mut RowBuffers,
    clear_mask: &[u8],
    bits: StatBits,
) -> Result<ThermalStats> {
    let meta = source.meta();
    info!("pass 2: clear-sky temperature percentiles");

    let mut f_temp: Vec<i16> = Vec::new();
    let mut f_wtemp: Vec<i16> = Vec::new();
    let mut temp_min = i16::MAX;
    let mut temp_max = i16::MIN;
    let mut wtemp_min = i16::MAX;
    let mut wtemp_max = i16::MIN;

    for row in 0..meta.rows {
        bufs.read_thermal(source, row)?;
        bufs.substitute_thermal(meta);

        for col in 0..meta.cols {
            let index = row * meta.cols + col;
            if clear_mask[index] & clear::FILL != 0 {
                continue;
            }
            let therm = bufs.therm[col];

            if clear_mask[index] & bits.land != 0 {
                temp_min = temp_min.min(therm);
                temp_max = temp_max.max(therm);
                f_temp.push(therm);
            }
            if clear_mask[index] & bits.water != 0 {
                wtemp_min = wtemp_min.min(therm);
                wtemp_max = wtemp_max.max(therm);
                f_wtemp.push(therm);
            }
        }
    }

    // Untouched extrema mean the sample pool stayed empty.
    if temp_min == i16::MAX {
        temp_min = 0;
    }
    if temp_max == i16::MIN {
        temp_max = 0;
    }
    if wtemp_min == i16::MAX {
        wtemp_min = 0;
    }
    if wtemp_max == i16::MIN {
        wtemp_max = 0;
    }

    let mut t_templ = prctile(&f_temp, temp_min, temp_max, LOW_PERCENT_POINT);
    let mut t_temph = prctile(&f_temp, temp_min, temp_max, HIGH_PERCENT_POINT);
    let t_wtemp = prctile(&f_wtemp, wtemp_min, wtemp_max, HIGH_PERCENT_POINT);

    t_templ -= TEMP_BUFFER;
    t_temph += TEMP_BUFFER;
    let temp_l = t_temph - t_templ;

    debug!(t_templ, t_temph, t_wtemp, "temperature window");
    Ok(ThermalStats {
        t_templ,
        t_temph,
        t_wtemp,
        temp_l,
    })
}
