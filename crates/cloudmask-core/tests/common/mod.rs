use cloudmask_core::engine::{detect, DetectParams, SceneStats};
use cloudmask_core::io::{MemoryScene, RasterMeta, RowSource, REFL_BAND_COUNT};
use cloudmask_core::mask::{pixel, Confidence};
use ndarray::Array2;

/// One synthetic pixel: six reflective bands plus thermal.
pub type Pixel = ([i16; REFL_BAND_COUNT], i16);

/// Build a scene of the given shape from per-pixel band values, row-major.
pub fn scene_from_pixels(meta: RasterMeta, pixels: &[Pixel]) -> MemoryScene {
    assert_eq!(pixels.len(), meta.rows * meta.cols);
    let shape = (meta.rows, meta.cols);

    let bands: [Array2<i16>; REFL_BAND_COUNT] = std::array::from_fn(|ib| {
        Array2::from_shape_fn(shape, |(row, col)| pixels[row * shape.1 + col].0[ib])
    });
    let thermal = Array2::from_shape_fn(shape, |(row, col)| pixels[row * shape.1 + col].1);

    MemoryScene::new(meta, bands, thermal).expect("valid test scene")
}

/// Run detection with default parameters, returning both masks and the
/// reported statistics.
pub fn run_detect(scene: &MemoryScene) -> (Vec<u8>, Vec<u8>, SceneStats) {
    let count = scene.meta().pixel_count();
    let mut pixel_mask = vec![0u8; count];
    let mut conf_mask = vec![0u8; count];
    let stats = detect(
        scene,
        &DetectParams::default(),
        &mut pixel_mask,
        &mut conf_mask,
    )
    .expect("detection succeeds");
    (pixel_mask, conf_mask, stats)
}

/// Check the cross-pass mask invariants on a finished run.
pub fn assert_invariants(pixel_mask: &[u8], conf_mask: &[u8]) {
    for (index, (&px, &conf)) in pixel_mask.iter().zip(conf_mask).enumerate() {
        if px & pixel::FILL != 0 {
            assert_eq!(px, pixel::FILL, "fill pixel {index} carries other bits");
            assert_eq!(
                conf,
                Confidence::Fill as u8,
                "fill pixel {index} has wrong confidence"
            );
            continue;
        }
        if conf == Confidence::High as u8 {
            assert_ne!(px & pixel::CLOUD, 0, "HIGH pixel {index} lost its cloud bit");
        }
        if conf == Confidence::Med as u8 || conf == Confidence::Low as u8 {
            assert_eq!(px & pixel::CLOUD, 0, "{index}: MED/LOW pixel kept cloud");
        }
        assert!(
            px & pixel::WATER == 0 || px & pixel::CLOUD == 0,
            "pixel {index} is both water and cloud"
        );
    }
}

/// A plain vegetated clear-land pixel.
pub fn vegetation() -> Pixel {
    ([400, 500, 600, 3000, 1500, 800], 2500)
}

/// A dark open-water pixel.
pub fn water() -> Pixel {
    ([500, 500, 400, 200, 100, 50], 2800)
}

/// An all-fill pixel.
pub fn fill(fill_value: i16) -> Pixel {
    ([fill_value; REFL_BAND_COUNT], fill_value)
}
