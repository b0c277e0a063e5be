// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! LOIDS - Lasso Object Identification and Designation System
//!
//! Development front door for the annotation core: loads a dataset folder,
//! prints what it found, and optionally renders one item's derived views.
//! The interactive UI lives in a separate crate and drives the same
//! library API.

use anyhow::{Context, Result};
use loids::{Config, Dataset};
use std::path::Path;

fn main() -> Result<()> {
    // Initialize logging
    env_logger::init();

    let mut args = std::env::args().skip(1);
    let root = args
        .next()
        .context("usage: loids <dataset-root> [item-name]")?;
    let item_name = args.next();

    let root = Path::new(&root);
    let config = Config::load(&root.join("loids.yaml"))?;
    let mut dataset = Dataset::load(root, config)
        .with_context(|| format!("failed to load dataset at {}", root.display()))?;

    println!(
        "{}: {} items, {} keys, {} videos",
        root.display(),
        dataset.item_names().len(),
        dataset.key_names().len(),
        dataset.video_names().len()
    );
    for name in dataset.video_names() {
        println!("  video: {name}");
    }

    if let Some(name) = item_name {
        dataset
            .change_item(&name, false)
            .with_context(|| format!("failed to open item {name}"))?;

        let composite = dataset.current_image()?;
        let mask = dataset.current_mask_image()?;
        let boxes = dataset.current_bounding_box_image()?;

        let out_dir = root.join("masks");
        composite.save(out_dir.join(format!("{name}_composite.png")))?;
        mask.save(out_dir.join(format!("{name}_mask.png")))?;
        boxes.save(out_dir.join(format!("{name}_boxes.png")))?;
        println!(
            "rendered {name}: {} objects",
            dataset.object_names()?.len()
        );
    }

    Ok(())
}
