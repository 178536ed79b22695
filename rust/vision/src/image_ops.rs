// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Image processing operations for rotation estimation and correction

use crate::error::{Result, StraightenError};
use image::imageops::{self, FilterType};
use image::{GrayImage, Luma, Rgb, RgbImage};
use imageproc::drawing::draw_line_segment_mut;
use imageproc::geometric_transformations::{rotate_about_center, Interpolation};
use straightener_hough::HoughLine;

/// Remove `margin_x` columns from the left and right and `margin_y` rows from
/// the top and bottom
pub fn crop_margins(image: &GrayImage, margin_x: u32, margin_y: u32) -> Result<GrayImage> {
    let (width, height) = image.dimensions();
    let too_small = || StraightenError::ImageTooSmall {
        width,
        height,
        margin_x,
        margin_y,
    };
    let inner_w = width
        .checked_sub(margin_x.saturating_mul(2))
        .filter(|&w| w > 0)
        .ok_or_else(too_small)?;
    let inner_h = height
        .checked_sub(margin_y.saturating_mul(2))
        .filter(|&h| h > 0)
        .ok_or_else(too_small)?;

    Ok(imageops::crop_imm(image, margin_x, margin_y, inner_w, inner_h).to_image())
}

/// Downsize by `factor` (area-style averaging)
pub fn make_thumbnail(image: &GrayImage, factor: f64) -> GrayImage {
    if factor <= 1.0 {
        return image.clone();
    }
    let width = ((image.width() as f64 / factor) as u32).max(1);
    let height = ((image.height() as f64 / factor) as u32).max(1);
    imageops::resize(image, width, height, FilterType::Triangle)
}

/// Inverted binary map: paper (above `level`) becomes 0, ink becomes 255
pub fn binarize_inverted(image: &GrayImage, level: u8) -> GrayImage {
    let mut result = GrayImage::new(image.width(), image.height());

    for (x, y, pixel) in image.enumerate_pixels() {
        let value = if pixel.0[0] > level { 0 } else { 255 };
        result.put_pixel(x, y, Luma([value]));
    }

    result
}

/// Rotate clockwise (as displayed) by `degrees` about the centre
///
/// The canvas keeps its size; uncovered pixels are black.
pub fn rotate_clockwise(image: &RgbImage, degrees: f64) -> RgbImage {
    if degrees == 0.0 {
        return image.clone();
    }
    rotate_about_center(
        image,
        degrees.to_radians() as f32,
        Interpolation::Bilinear,
        Rgb([0, 0, 0]),
    )
}

/// Centre the image on a `width × height` canvas, cropping or padding with
/// `fill` as needed
pub fn fit_to_size(image: &RgbImage, width: u32, height: u32, fill: Rgb<u8>) -> RgbImage {
    let (src_w, src_h) = image.dimensions();
    if (src_w, src_h) == (width, height) {
        return image.clone();
    }

    // Crop the overflow evenly from both sides
    let crop_x = src_w.saturating_sub(width) / 2;
    let crop_y = src_h.saturating_sub(height) / 2;
    let kept = imageops::crop_imm(
        image,
        crop_x,
        crop_y,
        src_w.min(width),
        src_h.min(height),
    )
    .to_image();

    let mut canvas = RgbImage::from_pixel(width, height, fill);
    let pad_x = width.saturating_sub(src_w) / 2;
    let pad_y = height.saturating_sub(src_h) / 2;
    imageops::replace(&mut canvas, &kept, pad_x as i64, pad_y as i64);
    canvas
}

/// Overlay detected lines in green on a grayscale background
pub fn draw_lines(background: &GrayImage, lines: &[HoughLine]) -> RgbImage {
    let mut canvas = RgbImage::from_fn(background.width(), background.height(), |x, y| {
        let v = background.get_pixel(x, y).0[0];
        Rgb([v, v, v])
    });
    let reach = background.height().max(background.width()) as f64;

    for line in lines {
        let (b, a) = line.angle.sin_cos();
        let x0 = a * line.distance;
        let y0 = b * line.distance;
        let start = ((x0 - reach * b) as f32, (y0 + reach * a) as f32);
        let end = ((x0 + reach * b) as f32, (y0 - reach * a) as f32);
        draw_line_segment_mut(&mut canvas, start, end, Rgb([0, 255, 0]));
    }

    canvas
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_binarize_inverted() {
        let mut img = GrayImage::new(3, 1);
        img.put_pixel(0, 0, Luma([10]));
        img.put_pixel(1, 0, Luma([200]));
        img.put_pixel(2, 0, Luma([201]));

        let bin = binarize_inverted(&img, 200);

        assert_eq!(bin.get_pixel(0, 0).0[0], 255);
        assert_eq!(bin.get_pixel(1, 0).0[0], 255);
        assert_eq!(bin.get_pixel(2, 0).0[0], 0);
    }

    #[test]
    fn test_crop_margins() {
        let img = GrayImage::from_fn(10, 8, |x, y| Luma([(x + 10 * y) as u8]));
        let cropped = crop_margins(&img, 2, 1).unwrap();

        assert_eq!(cropped.dimensions(), (6, 6));
        assert_eq!(cropped.get_pixel(0, 0).0[0], 12);
    }

    #[test]
    fn test_crop_margins_too_large() {
        let img = GrayImage::new(10, 8);
        assert!(matches!(
            crop_margins(&img, 5, 1),
            Err(StraightenError::ImageTooSmall { .. })
        ));
        assert!(crop_margins(&img, 1, 4).is_err());
    }

    #[test]
    fn test_thumbnail_size() {
        let img = GrayImage::new(100, 45);
        assert_eq!(make_thumbnail(&img, 5.0).dimensions(), (20, 9));
        assert_eq!(make_thumbnail(&img, 1.0).dimensions(), (100, 45));
        assert_eq!(make_thumbnail(&img, 1000.0).dimensions(), (1, 1));
    }

    #[test]
    fn test_fit_to_size_pads_and_crops() {
        let img = RgbImage::from_pixel(4, 6, Rgb([9, 9, 9]));
        let fitted = fit_to_size(&img, 8, 2, Rgb([255, 255, 255]));

        assert_eq!(fitted.dimensions(), (8, 2));
        // Padded columns on the left and right
        assert_eq!(fitted.get_pixel(0, 0), &Rgb([255, 255, 255]));
        assert_eq!(fitted.get_pixel(7, 1), &Rgb([255, 255, 255]));
        // Source fills the centre
        assert_eq!(fitted.get_pixel(2, 0), &Rgb([9, 9, 9]));
        assert_eq!(fitted.get_pixel(5, 1), &Rgb([9, 9, 9]));
    }

    #[test]
    fn test_rotate_keeps_canvas() {
        let img = RgbImage::from_pixel(30, 20, Rgb([255, 255, 255]));
        let rotated = rotate_clockwise(&img, 10.0);

        assert_eq!(rotated.dimensions(), (30, 20));
        // Corners come from outside the source and are filled black
        assert_eq!(rotated.get_pixel(0, 0), &Rgb([0, 0, 0]));
        assert_eq!(rotated.get_pixel(15, 10), &Rgb([255, 255, 255]));
    }

    #[test]
    fn test_draw_lines_marks_row() {
        let bg = GrayImage::from_pixel(20, 20, Luma([0]));
        let line = HoughLine {
            distance: 7.0,
            angle: std::f64::consts::FRAC_PI_2,
            votes: 20,
        };
        let overlay = draw_lines(&bg, &[line]);

        assert_eq!(overlay.get_pixel(10, 7), &Rgb([0, 255, 0]));
        assert_eq!(overlay.get_pixel(10, 3), &Rgb([0, 0, 0]));
    }
}
