// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Library error types.
//!
//! One error enum covers the whole crate: dataset layout validation,
//! name lookups, positional bounds, lifecycle preconditions, and wrapped
//! I/O, JSON, and image decode causes.

/// Convenience alias used throughout the library.
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("invalid dataset: {0}")]
    Validation(String),

    #[error("{entity} not found: {name}")]
    NotFound { entity: &'static str, name: String },

    #[error("{what} index {index} out of range (len {len})")]
    Bounds {
        what: &'static str,
        index: usize,
        len: usize,
    },

    #[error("no item is currently open")]
    NoCurrentItem,

    #[error("item is not open: {0}")]
    ItemClosed(String),

    #[error("video error: {0}")]
    Video(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("image error: {0}")]
    Image(#[from] image::ImageError),
}

impl Error {
    /// Shorthand for an unknown-name lookup failure.
    pub fn not_found(entity: &'static str, name: impl Into<String>) -> Self {
        Error::NotFound {
            entity,
            name: name.into(),
        }
    }
}
