// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Single-image straightening pipeline

use crate::border::{find_border, Border};
use crate::config::StraightenConfig;
use crate::error::Result;
use crate::image_ops::{draw_lines, fit_to_size, rotate_clockwise};
use crate::skew::{analyze_rotation, RotationAnalysis, RotationEstimate, SkewEstimate};
use image::{imageops, DynamicImage, ImageReader, Rgb, RgbImage};
use serde::Serialize;
use std::path::Path;

/// A straightened page
#[derive(Debug, Clone)]
pub struct Straightened {
    pub image: RgbImage,
    pub estimate: RotationEstimate,
    /// Page extent found in the rotated canvas, before any resizing
    pub border: Border,
}

/// Rotate `image` back by the estimated skew and crop the rotation border
pub fn straighten(image: &DynamicImage, config: &StraightenConfig) -> Result<Straightened> {
    let analysis = analyze_rotation(&image.to_luma8(), config)?;
    Ok(correct(image, analysis.estimate, config))
}

fn correct(
    image: &DynamicImage,
    estimate: RotationEstimate,
    config: &StraightenConfig,
) -> Straightened {
    let rotated = rotate_clockwise(&image.to_rgb8(), estimate.fine);
    let border = find_border(&imageops::grayscale(&rotated), config.border_threshold);

    let mut page = match border.crop_rect() {
        Some((x, y, w, h)) => imageops::crop_imm(&rotated, x, y, w, h).to_image(),
        None => {
            tracing::warn!(?border, "Border scan collapsed, keeping full canvas");
            rotated
        }
    };

    if let Some((width, height)) = config.output_size {
        page = fit_to_size(&page, width, height, Rgb(config.pad_color));
    }

    tracing::debug!(
        angle = estimate.fine,
        width = page.width(),
        height = page.height(),
        "Straightened page"
    );

    Straightened {
        image: page,
        estimate,
        border,
    }
}

#[derive(Serialize)]
struct LineDump<'a> {
    estimate: RotationEstimate,
    coarse: &'a SkewEstimate,
    fine: &'a SkewEstimate,
}

/// Write the binary map, both line overlays and a JSON line dump for `stem`
fn write_graphs(dir: &Path, stem: &str, analysis: &RotationAnalysis) -> Result<()> {
    std::fs::create_dir_all(dir)?;

    analysis.binary.save(dir.join(format!("binary_{stem}.png")))?;
    draw_lines(&analysis.thumbnail, &analysis.coarse.lines)
        .save(dir.join(format!("lines_{stem}.png")))?;
    draw_lines(&analysis.thumbnail, &analysis.fine.lines)
        .save(dir.join(format!("lines_pass2_{stem}.png")))?;

    let dump = LineDump {
        estimate: analysis.estimate,
        coarse: &analysis.coarse,
        fine: &analysis.fine,
    };
    std::fs::write(
        dir.join(format!("lines_{stem}.json")),
        serde_json::to_string_pretty(&dump)?,
    )?;

    tracing::debug!(dir = %dir.display(), stem, "Wrote line graphs");
    Ok(())
}

/// Straighten the image at `input` and save it to `output`
///
/// The output format follows the extension of `output`.
pub fn straighten_file(
    input: &Path,
    output: &Path,
    config: &StraightenConfig,
) -> Result<RotationEstimate> {
    let image = ImageReader::open(input)?.with_guessed_format()?.decode()?;
    let analysis = analyze_rotation(&image.to_luma8(), config)?;

    if let Some(dir) = &config.graph_dir {
        let stem = input
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "image".to_string());
        write_graphs(dir, &stem, &analysis)?;
    }

    let straightened = correct(&image, analysis.estimate, config);
    if let Some(parent) = output.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    straightened.image.save(output)?;

    tracing::info!(
        input = %input.display(),
        output = %output.display(),
        coarse = straightened.estimate.coarse,
        fine = straightened.estimate.fine,
        "Straightened image"
    );
    Ok(straightened.estimate)
}
