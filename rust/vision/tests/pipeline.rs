// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use approx::assert_abs_diff_eq;
use image::{DynamicImage, Rgb, RgbImage};
use std::fs;
use straightener_vision::image_ops::rotate_clockwise;
use straightener_vision::{
    detect_rotation, straighten, straighten_batch, straighten_file, StraightenConfig, ERROR_LOG,
};

/// White page with dark 3 px rules that descend to the right by `slope_deg`
fn ruled_page(width: u32, height: u32, slope_deg: f64) -> RgbImage {
    let mut page = RgbImage::from_pixel(width, height, Rgb([255, 255, 255]));
    let tan = slope_deg.to_radians().tan();

    for y0 in (40..=260).step_by(20) {
        for x in 0..width {
            let yc = (y0 as f64 + x as f64 * tan).round() as i64;
            for t in 0..3 {
                let y = yc + t;
                if y >= 0 && y < height as i64 {
                    page.put_pixel(x, y as u32, Rgb([20, 20, 20]));
                }
            }
        }
    }
    page
}

fn unscaled() -> StraightenConfig {
    StraightenConfig {
        resize_factor: 1.0,
        ..Default::default()
    }
}

#[test]
fn test_level_page_has_no_rotation() {
    let page = DynamicImage::ImageRgb8(ruled_page(400, 300, 0.0));
    let estimate = detect_rotation(&page.to_luma8(), &unscaled()).unwrap();

    assert_abs_diff_eq!(estimate.coarse, 0.0, epsilon = 0.15);
    assert_abs_diff_eq!(estimate.fine, 0.0, epsilon = 0.1);
}

#[test]
fn test_descending_rules_give_negative_correction() {
    let page = DynamicImage::ImageRgb8(ruled_page(400, 300, 1.5));
    let estimate = detect_rotation(&page.to_luma8(), &unscaled()).unwrap();

    assert_abs_diff_eq!(estimate.coarse, -1.5, epsilon = 0.3);
    assert_abs_diff_eq!(estimate.fine, -1.5, epsilon = 0.3);
}

#[test]
fn test_clockwise_rotation_is_undone() {
    let rotated = rotate_clockwise(&ruled_page(400, 300, 0.0), 1.2);
    let page = DynamicImage::ImageRgb8(rotated);

    let result = straighten(&page, &unscaled()).unwrap();

    assert_abs_diff_eq!(result.estimate.fine, -1.2, epsilon = 0.3);
    let (width, height) = result.image.dimensions();
    assert!(width <= 400 && height <= 300);
}

#[test]
fn test_straighten_file_writes_output_and_graphs() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("scan.png");
    let output = dir.path().join("out").join("scan-unrotated.png");
    let graphs = dir.path().join("graphs");
    ruled_page(400, 300, 1.0).save(&input).unwrap();

    let config = StraightenConfig {
        graph_dir: Some(graphs.clone()),
        ..unscaled()
    };
    let estimate = straighten_file(&input, &output, &config).unwrap();

    assert!(estimate.fine < 0.0);
    assert!(output.is_file());
    for name in [
        "binary_scan.png",
        "lines_scan.png",
        "lines_pass2_scan.png",
        "lines_scan.json",
    ] {
        assert!(graphs.join(name).is_file(), "missing {}", name);
    }

    let dump: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(graphs.join("lines_scan.json")).unwrap()).unwrap();
    assert!(dump["fine"]["lines"].as_array().is_some_and(|l| !l.is_empty()));
}

#[test]
fn test_batch_mirrors_tree_and_logs_failures() {
    let input = tempfile::tempdir().unwrap();
    let output = tempfile::tempdir().unwrap();
    let nested = input.path().join("county");
    fs::create_dir_all(&nested).unwrap();

    ruled_page(400, 300, 0.5).save(nested.join("good.bmp")).unwrap();
    fs::write(input.path().join("broken.png"), b"not an image").unwrap();
    fs::write(input.path().join("notes.txt"), b"skip me").unwrap();

    let config = StraightenConfig {
        output_size: Some((380, 280)),
        ..unscaled()
    };
    let report = straighten_batch(input.path(), output.path(), &config).unwrap();

    assert_eq!(report.processed, 1);
    assert_eq!(report.failures.len(), 1);
    assert_eq!(report.total(), 2);

    let written = image::open(output.path().join("county").join("good.png")).unwrap();
    assert_eq!((written.width(), written.height()), (380, 280));

    let log = fs::read_to_string(output.path().join(ERROR_LOG)).unwrap();
    assert!(log.starts_with("0.) Failed to straighten: "));
    assert!(log.contains("broken.png"));
}

#[test]
fn test_batch_rejects_missing_directory() {
    let output = tempfile::tempdir().unwrap();
    let missing = output.path().join("nope");

    assert!(straighten_batch(&missing, output.path(), &unscaled()).is_err());
}

#[test]
fn test_batch_keeps_graphs_of_equal_stems_apart() {
    let input = tempfile::tempdir().unwrap();
    let output = tempfile::tempdir().unwrap();
    let graphs = output.path().join("graphs");
    for folder in ["a", "b"] {
        fs::create_dir_all(input.path().join(folder)).unwrap();
        ruled_page(400, 300, 0.8)
            .save(input.path().join(folder).join("scan.png"))
            .unwrap();
    }

    let config = StraightenConfig {
        graph_dir: Some(graphs.clone()),
        ..unscaled()
    };
    let report = straighten_batch(input.path(), output.path(), &config).unwrap();
    assert_eq!(report.processed, 2);

    for folder in ["a", "b"] {
        for name in [
            "binary_scan.png",
            "lines_scan.png",
            "lines_pass2_scan.png",
            "lines_scan.json",
        ] {
            let path = graphs.join(folder).join(name);
            assert!(path.is_file(), "missing {}", path.display());
        }
    }
}
