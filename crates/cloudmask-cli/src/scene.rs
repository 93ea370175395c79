//! TOML scene description consumed by `detect`.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use cloudmask_core::consts::FILL_PIXEL;
use cloudmask_core::io::raw::read_band_file;
use cloudmask_core::io::{BandId, MemoryScene, RasterMeta, REFL_BAND_COUNT};
use ndarray::Array2;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SceneConfig {
    pub rows: usize,
    pub cols: usize,
    /// Sentinel marking pixels outside the sensor footprint.
    #[serde(default = "default_fill_value")]
    pub fill_value: i16,
    pub bands: BandPaths,
    /// Raw thermal band file, degrees C x 100.
    pub thermal: PathBuf,
    pub saturation: Option<SaturationConfig>,
}

/// Raw reflective band files, row-major little-endian `i16`.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct BandPaths {
    pub blue: PathBuf,
    pub green: PathBuf,
    pub red: PathBuf,
    pub nir: PathBuf,
    pub swir1: PathBuf,
    pub swir2: PathBuf,
}

impl BandPaths {
    fn path(&self, band: BandId) -> &Path {
        match band {
            BandId::Blue => &self.blue,
            BandId::Green => &self.green,
            BandId::Red => &self.red,
            BandId::Nir => &self.nir,
            BandId::Swir1 => &self.swir1,
            BandId::Swir2 => &self.swir2,
        }
    }
}

/// Saturation metadata from the calibration step.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SaturationConfig {
    pub reflective_ref: [i16; REFL_BAND_COUNT],
    pub reflective_max: [i16; REFL_BAND_COUNT],
    pub thermal_ref: i16,
    pub thermal_max: i16,
}

fn default_fill_value() -> i16 {
    FILL_PIXEL
}

impl SceneConfig {
    pub fn meta(&self) -> RasterMeta {
        let mut meta = RasterMeta::new(self.rows, self.cols);
        meta.fill_value = self.fill_value;
        if let Some(ref satu) = self.saturation {
            meta = meta
                .with_reflective_saturation(satu.reflective_ref, satu.reflective_max)
                .with_thermal_saturation(satu.thermal_ref, satu.thermal_max);
        }
        meta
    }

    /// Load every band file into an in-memory scene.
    pub fn load(&self) -> Result<MemoryScene> {
        let mut bands: [Array2<i16>; REFL_BAND_COUNT] =
            std::array::from_fn(|_| Array2::zeros((0, 0)));
        for band in BandId::ALL {
            let path = self.bands.path(band);
            bands[band.index()] = read_band_file(path, self.rows, self.cols)
                .with_context(|| format!("Failed to read {band} band from {}", path.display()))?;
        }
        let thermal = read_band_file(&self.thermal, self.rows, self.cols)
            .with_context(|| format!("Failed to read thermal band from {}", self.thermal.display()))?;

        Ok(MemoryScene::new(self.meta(), bands, thermal)?)
    }

    /// Example configuration for `cloudmask config`.
    pub fn template() -> Self {
        Self {
            rows: 7000,
            cols: 8000,
            fill_value: FILL_PIXEL,
            bands: BandPaths {
                blue: PathBuf::from("scene/blue.i16"),
                green: PathBuf::from("scene/green.i16"),
                red: PathBuf::from("scene/red.i16"),
                nir: PathBuf::from("scene/nir.i16"),
                swir1: PathBuf::from("scene/swir1.i16"),
                swir2: PathBuf::from("scene/swir2.i16"),
            },
            thermal: PathBuf::from("scene/thermal.i16"),
            saturation: Some(SaturationConfig {
                reflective_ref: [20000; REFL_BAND_COUNT],
                reflective_max: [16000; REFL_BAND_COUNT],
                thermal_ref: 20000,
                thermal_max: 12000,
            }),
        }
    }
}
