// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use thiserror::Error;

/// Result type for line detection
pub type Result<T> = std::result::Result<T, HoughError>;

/// Errors that can occur while detecting lines
///
/// Every failure is terminal for the call: no partial line list is returned.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum HoughError {
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Cannot allocate {what} ({cells} cells)")]
    Allocation { what: &'static str, cells: usize },

    #[error("Cannot build output sequence: {0}")]
    OutputConstruction(String),
}

impl HoughError {
    pub(crate) fn invalid(msg: impl Into<String>) -> Self {
        HoughError::InvalidArgument(msg.into())
    }
}
