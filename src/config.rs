// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Tool configuration.
//!
//! An optional YAML file tunes rendering and palette behavior. Every field
//! has a default, so a missing file yields a fully usable configuration.

use crate::error::{Error, Result};
use crate::models::palette::{ColorPalette, DEFAULT_PALETTE_SIZE};
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Number of pre-generated object colors per item.
    #[serde(default = "default_palette_size")]
    pub palette_size: usize,

    /// Fixed palette seed; unset means a fresh random palette per item.
    #[serde(default)]
    pub palette_seed: Option<u64>,

    /// Stroke thickness of contour outlines on the mask-color buffer.
    #[serde(default = "default_outline_thickness")]
    pub outline_thickness: u32,

    /// Blend factor for the highlighted contour in the composite view.
    #[serde(default = "default_highlight_opacity")]
    pub highlight_opacity: f32,

    /// Append bounding-box summary rectangles when autosaving on item switch.
    #[serde(default)]
    pub bounding_box_on_save: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            palette_size: default_palette_size(),
            palette_seed: None,
            outline_thickness: default_outline_thickness(),
            highlight_opacity: default_highlight_opacity(),
            bounding_box_on_save: false,
        }
    }
}

impl Config {
    /// Load from a YAML file; defaults when the file does not exist.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let text = std::fs::read_to_string(path)?;
        serde_yaml::from_str(&text)
            .map_err(|e| Error::Validation(format!("malformed config {}: {e}", path.display())))
    }

    /// Build a fresh color palette per the configured size and seed.
    pub fn palette(&self) -> ColorPalette {
        match self.palette_seed {
            Some(seed) => ColorPalette::seeded(self.palette_size, seed),
            None => ColorPalette::new(self.palette_size),
        }
    }
}

fn default_palette_size() -> usize {
    DEFAULT_PALETTE_SIZE
}

fn default_outline_thickness() -> u32 {
    5
}

fn default_highlight_opacity() -> f32 {
    0.4
}
