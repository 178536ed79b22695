// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Deskewing of scanned documents
//!
//! This crate provides the pipeline around `straightener-hough`:
//! 1. Crop the margins a rotation could drag into view, shrink and binarise
//! 2. Estimate the skew from near-axis-aligned lines in two passes
//! 3. Rotate the page back and crop the black rotation border
//! 4. Optionally pad or crop to a fixed output size
//!
//! # Usage
//!
//! ```rust,ignore
//! use straightener_vision::{straighten_file, StraightenConfig};
//!
//! let estimate = straighten_file(
//!     Path::new("scan.png"),
//!     Path::new("scan-unrotated.png"),
//!     &StraightenConfig::default(),
//! )?;
//! println!("rotated back by {:.2} degrees", estimate.fine);
//! ```

pub mod batch;
pub mod border;
pub mod config;
pub mod error;
pub mod image_ops;
pub mod skew;
pub mod straighten;

// Re-export commonly used types and functions
pub use batch::{straighten_batch, BatchFailure, BatchReport, ERROR_LOG};
pub use border::{find_border, Border};
pub use config::{AngleAggregate, PassConfig, StraightenConfig};
pub use error::{Result, StraightenError};
pub use skew::{analyze_rotation, detect_rotation, RotationEstimate, SkewEstimate};
pub use straighten::{straighten, straighten_file, Straightened};
