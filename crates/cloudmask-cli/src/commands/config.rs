use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;

use crate::scene::SceneConfig;

#[derive(Args)]
pub struct ConfigArgs {
    /// Write the template to a file instead of stdout
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

/// Print or save a scene description template as TOML.
pub fn run(args: &ConfigArgs) -> Result<()> {
    let config = SceneConfig::template();
    let toml_str = toml::to_string_pretty(&config)?;

    if let Some(ref path) = args.output {
        std::fs::write(path, &toml_str)
            .with_context(|| format!("Failed to write config to {}", path.display()))?;
        println!("Scene template saved to {}", path.display());
    } else {
        print!("{}", toml_str);
    }

    Ok(())
}
