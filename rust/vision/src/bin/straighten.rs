// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! CLI tool: straighten a single rotated scan
//!
//! Usage:
//!   straighten [-o OUT] [-r RESIZE] [-m MAX_ANGLE] [-g] [-d] [--config FILE] INPUT

use anyhow::{Context, Result};
use clap::Parser;
use std::path::{Path, PathBuf};
use std::time::Instant;
use straightener_vision::{straighten_file, StraightenConfig};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "straighten", about = "Straighten a rotated image", version)]
struct Cli {
    /// Output filename (default: <input stem>-unrotated.<ext>)
    #[arg(short = 'o', long = "output")]
    output: Option<PathBuf>,

    /// Shrinking factor applied before line detection
    #[arg(short = 'r', long = "resize-factor")]
    resize: Option<f64>,

    /// Maximum expected angle from the vertical/horizontal (in degrees)
    #[arg(short = 'm', long = "max-angle")]
    max_angle: Option<f64>,

    /// Graph the discovered lines next to the output
    #[arg(short = 'g', long = "graph")]
    graph: bool,

    /// Print debugging info
    #[arg(short = 'd', long = "debug")]
    debug: bool,

    /// JSON configuration file; flags override its values
    #[arg(long = "config")]
    config: Option<PathBuf>,

    /// Input filename
    input: PathBuf,
}

fn default_output(input: &Path) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let name = match input.extension() {
        Some(ext) => format!("{}-unrotated.{}", stem, ext.to_string_lossy()),
        None => format!("{}-unrotated", stem),
    };
    input.with_file_name(name)
}

fn init_tracing(debug: bool) {
    let default = if debug { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default)),
        )
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.debug);

    let mut config = match &cli.config {
        Some(path) => StraightenConfig::from_json_file(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => StraightenConfig::default(),
    };
    if let Some(resize) = cli.resize {
        config.resize_factor = resize;
    }
    if let Some(max_angle) = cli.max_angle {
        config.max_angle = max_angle;
    }

    let output = cli.output.clone().unwrap_or_else(|| default_output(&cli.input));
    if cli.graph {
        let dir = output
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));
        config.graph_dir = Some(dir.to_path_buf());
    }

    let start = Instant::now();
    let estimate = straighten_file(&cli.input, &output, &config)
        .with_context(|| format!("Failed to straighten {}", cli.input.display()))?;

    tracing::debug!(
        coarse = estimate.coarse,
        fine = estimate.fine,
        elapsed_ms = start.elapsed().as_millis() as u64,
        "Done"
    );
    Ok(())
}
