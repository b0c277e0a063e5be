// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Object color palette.
//!
//! Colors are pre-generated and handed out in assignment order, one per
//! object. Every channel is sampled from `[1, 255]`: the zero byte is
//! reserved for the black background sentinel the masking logic keys on,
//! so no object color can ever alias it.

use image::Rgb;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Default number of pre-generated colors.
pub const DEFAULT_PALETTE_SIZE: usize = 1000;

/// A fixed table of random object colors owned by one shape store.
#[derive(Debug, Clone)]
pub struct ColorPalette {
    colors: Vec<Rgb<u8>>,
}

impl ColorPalette {
    /// Generate a palette from the thread RNG (non-deterministic across runs).
    pub fn new(size: usize) -> Self {
        Self::generate(size, &mut rand::thread_rng())
    }

    /// Generate a deterministic palette from a fixed seed.
    pub fn seeded(size: usize, seed: u64) -> Self {
        Self::generate(size, &mut StdRng::seed_from_u64(seed))
    }

    fn generate<R: Rng>(size: usize, rng: &mut R) -> Self {
        let colors = (0..size.max(1))
            .map(|_| {
                Rgb([
                    rng.gen_range(1..=255),
                    rng.gen_range(1..=255),
                    rng.gen_range(1..=255),
                ])
            })
            .collect();
        Self { colors }
    }

    /// Color for the n-th registered object. Wraps past the palette size.
    pub fn color(&self, index: usize) -> Rgb<u8> {
        self.colors[index % self.colors.len()]
    }

    pub fn len(&self) -> usize {
        self.colors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }
}

impl Default for ColorPalette {
    fn default() -> Self {
        Self::new(DEFAULT_PALETTE_SIZE)
    }
}
