// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use std::path::PathBuf;
use straightener_hough::HoughError;
use thiserror::Error;

/// Result type for straightening operations
pub type Result<T> = std::result::Result<T, StraightenError>;

/// Errors that can occur while straightening an image
#[derive(Error, Debug)]
pub enum StraightenError {
    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Line detection failed: {0}")]
    Hough(#[from] HoughError),

    #[error("Invalid configuration file: {0}")]
    Config(#[from] serde_json::Error),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Image {width}x{height} is too small for {margin_x}x{margin_y} px margins")]
    ImageTooSmall {
        width: u32,
        height: u32,
        margin_x: u32,
        margin_y: u32,
    },

    #[error("Not a directory: {0}")]
    NotADirectory(PathBuf),
}
