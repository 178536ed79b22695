// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Straightening of whole directory trees
//!
//! Images are discovered recursively and straightened in parallel on the
//! rayon pool. Output files mirror the input tree and are always PNG. A
//! failing image is recorded and does not stop the batch.

use crate::config::StraightenConfig;
use crate::error::{Result, StraightenError};
use crate::straighten::straighten_file;
use rayon::prelude::*;
use std::borrow::Cow;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

/// File name of the failure log written into the output directory
pub const ERROR_LOG: &str = "_straighten_errors.log";

const IMAGE_EXTENSIONS: [&str; 6] = ["png", "jpg", "jpeg", "tiff", "tif", "bmp"];

/// Whether `path` has a supported image extension (case-insensitive)
pub fn is_image_path(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| {
            IMAGE_EXTENSIONS
                .iter()
                .any(|known| ext.eq_ignore_ascii_case(known))
        })
        .unwrap_or(false)
}

/// All image files below `root`, sorted
pub fn collect_images(root: &Path) -> Result<Vec<PathBuf>> {
    if !root.is_dir() {
        return Err(StraightenError::NotADirectory(root.to_path_buf()));
    }

    let mut images = Vec::new();
    let mut pending = vec![root.to_path_buf()];
    while let Some(dir) = pending.pop() {
        for entry in fs::read_dir(&dir)? {
            let path = entry?.path();
            if path.is_dir() {
                pending.push(path);
            } else if is_image_path(&path) {
                images.push(path);
            }
        }
    }

    images.sort();
    Ok(images)
}

/// Where the straightened copy of `image` goes: the same relative path under
/// `output_root`, with a `.png` extension
pub fn output_path(input_root: &Path, image: &Path, output_root: &Path) -> PathBuf {
    output_root.join(relative_path(input_root, image)).with_extension("png")
}

/// Graph directory for `image`, mirroring its parent directory under
/// `graph_root` so equal file stems in different folders stay apart
pub fn graph_dir_for(input_root: &Path, image: &Path, graph_root: &Path) -> PathBuf {
    match relative_path(input_root, image).parent() {
        Some(parent) => graph_root.join(parent),
        None => graph_root.to_path_buf(),
    }
}

fn relative_path<'a>(input_root: &Path, image: &'a Path) -> &'a Path {
    image
        .strip_prefix(input_root)
        .unwrap_or_else(|_| Path::new(image.file_name().unwrap_or(image.as_os_str())))
}

/// An image that could not be straightened
#[derive(Debug)]
pub struct BatchFailure {
    pub input: PathBuf,
    pub output: PathBuf,
    pub error: StraightenError,
}

/// Outcome of [`straighten_batch`]
#[derive(Debug, Default)]
pub struct BatchReport {
    /// Images written successfully
    pub processed: usize,
    pub failures: Vec<BatchFailure>,
}

impl BatchReport {
    pub fn total(&self) -> usize {
        self.processed + self.failures.len()
    }
}

/// Straighten every image below `input_dir` into `output_dir`
///
/// Per-image failures are collected in the report. Only a missing input
/// directory or an unreadable tree fails the whole call.
pub fn straighten_batch(
    input_dir: &Path,
    output_dir: &Path,
    config: &StraightenConfig,
) -> Result<BatchReport> {
    config.validate()?;
    let images = collect_images(input_dir)?;
    fs::create_dir_all(output_dir)?;

    tracing::info!(
        images = images.len(),
        threads = rayon::current_num_threads(),
        input = %input_dir.display(),
        "Starting batch"
    );

    let outcomes: Vec<std::result::Result<(), BatchFailure>> = images
        .par_iter()
        .map(|image| {
            let output = output_path(input_dir, image, output_dir);
            let config = match &config.graph_dir {
                Some(root) => Cow::Owned(StraightenConfig {
                    graph_dir: Some(graph_dir_for(input_dir, image, root)),
                    ..config.clone()
                }),
                None => Cow::Borrowed(config),
            };
            straighten_file(image, &output, &config)
                .map(|_| ())
                .map_err(|error| {
                    tracing::warn!(input = %image.display(), %error, "Failed to straighten");
                    BatchFailure {
                        input: image.clone(),
                        output,
                        error,
                    }
                })
        })
        .collect();

    let mut report = BatchReport::default();
    for outcome in outcomes {
        match outcome {
            Ok(()) => report.processed += 1,
            Err(failure) => report.failures.push(failure),
        }
    }

    write_error_log(&output_dir.join(ERROR_LOG), &report.failures)?;

    tracing::info!(
        processed = report.processed,
        failed = report.failures.len(),
        "Finished batch"
    );
    Ok(report)
}

/// One numbered line per failure
pub fn write_error_log(path: &Path, failures: &[BatchFailure]) -> Result<()> {
    let mut file = fs::File::create(path)?;
    for (n, failure) in failures.iter().enumerate() {
        writeln!(
            file,
            "{}.) Failed to straighten: {}.",
            n,
            failure.input.display()
        )?;
    }
    Ok(())
}
