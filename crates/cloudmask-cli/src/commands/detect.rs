use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use cloudmask_core::engine::{detect, DetectParams};
use cloudmask_core::io::export::{save_mask_png, save_mask_raw};
use cloudmask_core::mask;

use crate::scene::SceneConfig;

#[derive(Args)]
pub struct DetectArgs {
    /// Scene description TOML (see `cloudmask config`)
    pub scene: PathBuf,

    /// Offset added to the dynamic cloud probability thresholds
    #[arg(long, default_value = "22.5")]
    pub threshold: f32,

    /// Output pixel mask (PNG of the raw mask bytes)
    #[arg(long, default_value = "pixel_mask.png")]
    pub pixel_mask: PathBuf,

    /// Output confidence mask (PNG of the raw mask bytes)
    #[arg(long, default_value = "conf_mask.png")]
    pub conf_mask: PathBuf,

    /// Also dump both masks as raw one-byte-per-pixel files
    #[arg(long)]
    pub raw: bool,
}

pub fn run(args: &DetectArgs) -> Result<()> {
    let text = std::fs::read_to_string(&args.scene)
        .with_context(|| format!("Failed to read scene config {}", args.scene.display()))?;
    let config: SceneConfig = toml::from_str(&text)
        .with_context(|| format!("Failed to parse scene config {}", args.scene.display()))?;
    let scene = config.load()?;

    let count = config.rows * config.cols;
    let mut pixel_mask = vec![0u8; count];
    let mut conf_mask = vec![0u8; count];
    let params = DetectParams {
        cloud_prob_threshold: args.threshold,
    };
    let stats = detect(&scene, &params, &mut pixel_mask, &mut conf_mask)?;

    save_mask_png(&pixel_mask, config.rows, config.cols, &args.pixel_mask)?;
    save_mask_png(&conf_mask, config.rows, config.cols, &args.conf_mask)?;
    if args.raw {
        save_mask_raw(&pixel_mask, &args.pixel_mask.with_extension("dat"))?;
        save_mask_raw(&conf_mask, &args.conf_mask.with_extension("dat"))?;
    }

    let summary = mask::summarize(&pixel_mask);
    println!(
        "Scene {}x{} ({} pixels), clear-sky coverage {:.2}%",
        config.rows, config.cols, count, stats.clear_ptm
    );
    if stats.t_templ >= 0.0 {
        println!(
            "Clear-land temperature window: {:.0}..{:.0} (C x 100)",
            stats.t_templ, stats.t_temph
        );
    } else {
        println!("All-cloud scene: no temperature statistics");
    }

    println!("\n{:>8}  {:>8}", "Class", "Percent");
    println!("{}", "-".repeat(18));
    println!("{:>8}  {:>7.2}%", "fill", summary.fill);
    println!("{:>8}  {:>7.2}%", "cloud", summary.cloud);
    println!("{:>8}  {:>7.2}%", "shadow", summary.shadow);
    println!("{:>8}  {:>7.2}%", "snow", summary.snow);
    println!("{:>8}  {:>7.2}%", "water", summary.water);

    println!("\nPixel mask written to {}", args.pixel_mask.display());
    println!("Confidence mask written to {}", args.conf_mask.display());

    Ok(())
}
