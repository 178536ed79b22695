// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! CLI tool: straighten every image below a directory
//!
//! Usage:
//!   batch-straighten [-o OUTDIR] [-r RESIZE] [--size W H] [-m MAX_ANGLE] [-g] [-d]
//!                    [--config FILE] IMGDIR

use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use std::time::Instant;
use straightener_vision::{straighten_batch, StraightenConfig, ERROR_LOG};
use tracing_subscriber::EnvFilter;

/// Batch runs shrink less than single images by default
const BATCH_RESIZE_FACTOR: f64 = 2.0;

#[derive(Parser, Debug)]
#[command(
    name = "batch-straighten",
    about = "Straighten a set of images",
    version
)]
struct Cli {
    /// Output directory
    #[arg(short = 'o', long = "outdir", default_value = ".")]
    outdir: PathBuf,

    /// Shrinking factor applied before line detection
    #[arg(short = 'r', long = "resize-factor")]
    resize: Option<f64>,

    /// Pad or crop the output images to this size
    #[arg(long = "size", num_args = 2, value_names = ["WIDTH", "HEIGHT"])]
    size: Option<Vec<u32>>,

    /// Maximum expected angle from the vertical/horizontal (in degrees)
    #[arg(short = 'm', long = "max-angle")]
    max_angle: Option<f64>,

    /// Graph the discovered lines into the output directory
    #[arg(short = 'g', long = "graph")]
    graph: bool,

    /// Print debugging info
    #[arg(short = 'd', long = "debug")]
    debug: bool,

    /// JSON configuration file; flags override its values
    #[arg(long = "config")]
    config: Option<PathBuf>,

    /// Input directory
    imgdir: PathBuf,
}

impl Cli {
    fn into_config(self) -> Result<(PathBuf, PathBuf, StraightenConfig)> {
        let mut config = match &self.config {
            Some(path) => StraightenConfig::from_json_file(path)
                .with_context(|| format!("Failed to load config {}", path.display()))?,
            None => StraightenConfig {
                resize_factor: BATCH_RESIZE_FACTOR,
                ..Default::default()
            },
        };
        if let Some(resize) = self.resize {
            config.resize_factor = resize;
        }
        if let Some(max_angle) = self.max_angle {
            config.max_angle = max_angle;
        }
        if let Some(&[width, height]) = self.size.as_deref() {
            config.output_size = Some((width, height));
        }
        if self.graph {
            config.graph_dir = Some(self.outdir.clone());
        }
        Ok((self.imgdir, self.outdir, config))
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let default_filter = if cli.debug { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)),
        )
        .init();

    let (imgdir, outdir, config) = cli.into_config()?;

    let start = Instant::now();
    let report = straighten_batch(&imgdir, &outdir, &config)
        .with_context(|| format!("Failed to straighten images in {}", imgdir.display()))?;

    if !report.failures.is_empty() {
        tracing::warn!(
            failed = report.failures.len(),
            log = %outdir.join(ERROR_LOG).display(),
            "Some images could not be straightened"
        );
    }
    tracing::info!(
        total = report.total(),
        processed = report.processed,
        elapsed_s = start.elapsed().as_secs_f64(),
        "Finished straightening"
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_size_flag_sets_output_size() {
        let cli = Cli::parse_from(["batch-straighten", "--size", "1700", "2200", "scans"]);
        let (imgdir, outdir, config) = cli.into_config().unwrap();

        assert_eq!(imgdir, PathBuf::from("scans"));
        assert_eq!(outdir, PathBuf::from("."));
        assert_eq!(config.output_size, Some((1700, 2200)));
        assert_eq!(config.resize_factor, BATCH_RESIZE_FACTOR);
        assert_eq!(config.graph_dir, None);
    }

    #[test]
    fn test_graph_uses_outdir() {
        let cli = Cli::parse_from(["batch-straighten", "-g", "-o", "out", "-r", "4", "scans"]);
        let (_, _, config) = cli.into_config().unwrap();

        assert_eq!(config.graph_dir, Some(PathBuf::from("out")));
        assert_eq!(config.resize_factor, 4.0);
    }
}
