mod common;

use cloudmask_core::consts::FILL_PIXEL;
use cloudmask_core::engine::{detect, DetectParams};
use cloudmask_core::io::{MemoryScene, RasterMeta};
use cloudmask_core::mask::{pixel, Confidence};

use common::{
    assert_invariants, fill, run_detect, scene_from_pixels, vegetation, water,
};

#[test]
fn test_all_fill_scene_short_circuits() {
    let meta = RasterMeta::new(2, 2);
    let scene = scene_from_pixels(meta, &[fill(FILL_PIXEL); 4]);
    let (pixel_mask, conf_mask, stats) = run_detect(&scene);

    assert_eq!(stats.clear_ptm, 0.0);
    assert_eq!(stats.t_templ, -1.0);
    assert_eq!(stats.t_temph, -1.0);
    for (&px, &conf) in pixel_mask.iter().zip(&conf_mask) {
        assert_eq!(px, pixel::FILL);
        assert_eq!(conf, Confidence::Fill as u8);
    }
    assert_invariants(&pixel_mask, &conf_mask);
}

#[test]
fn test_single_vegetation_pixel_is_clear_low() {
    let meta = RasterMeta::new(1, 1);
    let scene = scene_from_pixels(meta, &[vegetation()]);
    let (pixel_mask, conf_mask, stats) = run_detect(&scene);

    assert_eq!(pixel_mask[0], 0);
    assert_eq!(conf_mask[0], Confidence::Low as u8);
    assert_eq!(stats.clear_ptm, 100.0);
    // The temperature window is the single sample widened by the buffer.
    assert_eq!(stats.t_templ, 2100.0);
    assert_eq!(stats.t_temph, 2900.0);
}

#[test]
fn test_single_snow_pixel_takes_the_all_cloud_path() {
    // NDSI 0.789: snow, but also a survivor of the whole cloud chain, so
    // the lone pixel leaves nothing clear and the shortcut fires.
    let meta = RasterMeta::new(1, 1);
    let scene = scene_from_pixels(meta, &[([8000, 8500, 8000, 4000, 1000, 400], 500)]);
    let (pixel_mask, conf_mask, stats) = run_detect(&scene);

    assert_eq!(pixel_mask[0], pixel::SNOW | pixel::CLOUD);
    assert_eq!(conf_mask[0], 0, "shortcut leaves non-fill confidence unset");
    assert_eq!(stats.t_templ, -1.0);
    assert_eq!(stats.t_temph, -1.0);
}

#[test]
fn test_single_water_pixel() {
    let meta = RasterMeta::new(1, 1);
    let scene = scene_from_pixels(meta, &[water()]);
    let (pixel_mask, conf_mask, stats) = run_detect(&scene);

    assert_eq!(pixel_mask[0], pixel::WATER);
    assert_eq!(conf_mask[0], Confidence::Low as u8);
    assert_eq!(stats.clear_ptm, 100.0);
}

#[test]
fn test_saturated_bright_cloud_is_high_confidence() {
    let meta =
        RasterMeta::new(1, 2).with_reflective_saturation([20000; 6], [16000; 6]);
    let scene = scene_from_pixels(meta, &[([16000; 6], 2000), vegetation()]);
    let (pixel_mask, conf_mask, _stats) = run_detect(&scene);

    assert_ne!(pixel_mask[0] & pixel::CLOUD, 0);
    assert_eq!(conf_mask[0], Confidence::High as u8);
    assert_eq!(conf_mask[1], Confidence::Low as u8);
    assert_invariants(&pixel_mask, &conf_mask);
}

#[test]
fn test_borderline_cloud_downgrades_to_medium() {
    // Warm enough that the probability lands in the 10-point band below the
    // dynamic threshold: MED confidence, cloud bit cleared.
    let meta =
        RasterMeta::new(1, 2).with_reflective_saturation([20000; 6], [16000; 6]);
    let scene = scene_from_pixels(meta, &[([16000; 6], 2600), vegetation()]);
    let (pixel_mask, conf_mask, _stats) = run_detect(&scene);

    assert_eq!(conf_mask[0], Confidence::Med as u8);
    assert_eq!(pixel_mask[0] & pixel::CLOUD, 0);
    assert_invariants(&pixel_mask, &conf_mask);
}

#[test]
fn test_cloud_over_water_drops_the_water_bit() {
    // Bright, white, cold-enough pixel that passes both the water test and
    // the full cloud chain; confidence goes HIGH and cloud wins the flag.
    let meta = RasterMeta::new(1, 2);
    let scene = scene_from_pixels(meta, &[([2000, 2000, 2000, 900, 1000, 400], 2000), vegetation()]);
    let (pixel_mask, conf_mask, _stats) = run_detect(&scene);

    assert_eq!(conf_mask[0], Confidence::High as u8);
    assert_ne!(pixel_mask[0] & pixel::CLOUD, 0);
    assert_eq!(pixel_mask[0] & pixel::WATER, 0);
    assert_invariants(&pixel_mask, &conf_mask);
}

#[test]
fn test_dark_infrared_depression_becomes_shadow() {
    // A 3x3 vegetated patch whose center is darker in both infrared bands;
    // flood fill raises the center to the rim and only it turns shadow.
    let meta = RasterMeta::new(3, 3);
    let mut pixels = vec![vegetation(); 9];
    pixels[4] = ([400, 500, 600, 2000, 800, 800], 2500);
    let scene = scene_from_pixels(meta, &pixels);
    let (pixel_mask, conf_mask, _stats) = run_detect(&scene);

    for (index, &px) in pixel_mask.iter().enumerate() {
        if index == 4 {
            assert_ne!(px & pixel::SHADOW, 0, "center pixel should be shadow");
        } else {
            assert_eq!(px & pixel::SHADOW, 0, "rim pixel {index} flagged shadow");
        }
    }
    assert_invariants(&pixel_mask, &conf_mask);
}

#[test]
fn test_fill_pixels_coexist_with_classification() {
    let meta = RasterMeta::new(1, 3);
    let scene = scene_from_pixels(meta, &[fill(FILL_PIXEL), vegetation(), water()]);
    let (pixel_mask, conf_mask, stats) = run_detect(&scene);

    assert_eq!(pixel_mask[0], pixel::FILL);
    assert_eq!(conf_mask[0], Confidence::Fill as u8);
    assert_eq!(conf_mask[1], Confidence::Low as u8);
    assert_ne!(pixel_mask[2] & pixel::WATER, 0);
    assert_eq!(stats.clear_ptm, 100.0);
    assert_invariants(&pixel_mask, &conf_mask);
}

#[test]
fn test_detection_is_deterministic() {
    let meta = RasterMeta::new(3, 3);
    let mut pixels = vec![vegetation(); 9];
    pixels[4] = ([400, 500, 600, 2000, 800, 800], 2500);
    pixels[8] = water();
    let scene = scene_from_pixels(meta, &pixels);

    let first = run_detect(&scene);
    let second = run_detect(&scene);
    assert_eq!(first.0, second.0);
    assert_eq!(first.1, second.1);
    assert_eq!(first.2.clear_ptm, second.2.clear_ptm);
    assert_eq!(first.2.t_templ, second.2.t_templ);
}

#[test]
fn test_saturation_substitution_is_idempotent() {
    // A scene carrying the saturation sentinel and the same scene with the
    // substitution already applied classify identically.
    let meta = RasterMeta::new(1, 2)
        .with_reflective_saturation([20000; 6], [16000; 6])
        .with_thermal_saturation(20000, 12000);

    let raw = scene_from_pixels(meta.clone(), &[([20000; 6], 20000), vegetation()]);
    let substituted = scene_from_pixels(meta, &[([16000; 6], 12000), vegetation()]);

    let (raw_px, raw_conf, raw_stats) = run_detect(&raw);
    let (sub_px, sub_conf, sub_stats) = run_detect(&substituted);

    assert_eq!(raw_px, sub_px);
    assert_eq!(raw_conf, sub_conf);
    assert_eq!(raw_stats.t_templ, sub_stats.t_templ);
    assert_eq!(raw_stats.t_temph, sub_stats.t_temph);
}

#[test]
fn test_mismatched_mask_length_is_rejected() {
    let meta = RasterMeta::new(2, 2);
    let scene = MemoryScene::uniform(meta, [400, 500, 600, 3000, 1500, 800], 2500).unwrap();

    let mut pixel_mask = vec![0u8; 3];
    let mut conf_mask = vec![0u8; 4];
    let result = detect(
        &scene,
        &DetectParams::default(),
        &mut pixel_mask,
        &mut conf_mask,
    );
    assert!(result.is_err());
}
