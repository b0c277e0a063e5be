// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Dataset items.
//!
//! A `DatasetItem` is one annotatable image: the source pixels, the shape
//! store, and the derived raster buffers. Items are enumerated eagerly but
//! hold no buffers until opened; closing releases everything, so at most
//! one item's buffers are live while the dataset enforces its
//! single-current-item transaction.

use crate::config::Config;
use crate::error::{Error, Result};
use crate::io::{media, serialization};
use crate::models::annotation::{Annotation, Point, ShapeType};
use crate::util::draw;
use image::{Rgb, RgbImage};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Fill color of the highlighted contour.
const HIGHLIGHT_COLOR: Rgb<u8> = Rgb([0, 0, 255]);

/// Line width of bounding-box rectangles.
const BOX_LINE_WIDTH: u32 = 2;

/// Everything that only exists while the item is open.
#[derive(Debug)]
struct OpenState {
    img: RgbImage,
    /// Contour outlines, object-colored, on a zeroed canvas.
    mask_color: RgbImage,
    /// At most one filled contour; zeroed on every selection change.
    highlight: RgbImage,
    annotation: Annotation,
    /// label -> (max instance number seen, instance count)
    labels_count: HashMap<String, (u32, u32)>,
    changed: bool,
    outline_thickness: u32,
    highlight_opacity: f32,
}

#[derive(Debug)]
pub struct DatasetItem {
    name: String,
    id: usize,
    img_path: PathBuf,
    annotation_path: PathBuf,
    mask_path: PathBuf,
    open: Option<OpenState>,
}

impl DatasetItem {
    pub fn new(
        name: impl Into<String>,
        img_path: impl Into<PathBuf>,
        annotation_path: impl Into<PathBuf>,
        mask_path: impl Into<PathBuf>,
        id: usize,
    ) -> Self {
        Self {
            name: name.into(),
            id,
            img_path: img_path.into(),
            annotation_path: annotation_path.into(),
            mask_path: mask_path.into(),
            open: None,
        }
    }

    /// Build an item from its image file under the dataset layout.
    pub fn create(dataset_path: &Path, name: &str, file_name: &str, id: usize) -> Self {
        Self::new(
            name,
            dataset_path.join("imgs").join(file_name),
            dataset_path.join("annotations").join(format!("{name}.json")),
            dataset_path.join("masks").join(format!("{name}.jpg")),
            id,
        )
    }

    /// Load the image and annotations, allocate the raster buffers, replay
    /// stored contours onto the mask-color buffer, and rebuild the
    /// per-label instance counter from the stored object ids.
    pub fn open(&mut self, config: &Config) -> Result<()> {
        let img = media::load_image(&self.img_path)?;
        let (width, height) = img.dimensions();

        let annotation = if self.annotation_path.exists() {
            let file = serialization::import_json(&self.annotation_path)?;
            serialization::from_file(&file, config.palette())
        } else {
            Annotation::with_palette(config.palette())
        };

        let mut state = OpenState {
            img,
            mask_color: RgbImage::new(width, height),
            highlight: RgbImage::new(width, height),
            annotation,
            labels_count: HashMap::new(),
            changed: false,
            outline_thickness: config.outline_thickness,
            highlight_opacity: config.highlight_opacity,
        };

        let contours: Vec<(Vec<Point>, Rgb<u8>)> = state
            .annotation
            .all_shapes()
            .map(|s| {
                let color = state.annotation.color_for(&s.group_id)?;
                Ok((s.points.clone(), color))
            })
            .collect::<Result<_>>()?;
        for (points, color) in &contours {
            draw::draw_contour_outline(&mut state.mask_color, points, *color, state.outline_thickness);
        }

        for object_id in state.annotation.object_ids() {
            let Some((label, instance)) = object_id.rsplit_once('_') else {
                log::warn!("Object id {object_id} has no instance suffix, skipping");
                continue;
            };
            let Ok(instance) = instance.parse::<u32>() else {
                log::warn!("Object id {object_id} has a non-numeric instance suffix, skipping");
                continue;
            };
            state
                .labels_count
                .entry(label.to_string())
                .and_modify(|(max_seen, count)| {
                    *max_seen = (*max_seen).max(instance);
                    *count += 1;
                })
                .or_insert((instance, 1));
        }

        log::info!(
            "Opened item {} ({} shapes, {} objects)",
            self.name,
            state.annotation.shape_count(),
            state.annotation.object_count()
        );
        self.open = Some(state);
        Ok(())
    }

    /// Release all buffers and the shape store; resets the changed flag.
    pub fn close(&mut self) {
        if self.open.take().is_some() {
            log::info!("Closed item {}", self.name);
        }
    }

    pub fn is_open(&self) -> bool {
        self.open.is_some()
    }

    pub fn did_change(&self) -> bool {
        self.open.as_ref().is_some_and(|s| s.changed)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn id(&self) -> usize {
        self.id
    }

    pub fn image_path(&self) -> &Path {
        &self.img_path
    }

    pub fn mask_path(&self) -> &Path {
        &self.mask_path
    }

    /// Source pixels with contour outlines replacing them wherever the
    /// mask-color buffer is lit, and the highlighted contour blended on
    /// top. Replacement and blending apply per channel; palette channels
    /// are never zero, so whole outline pixels always replace.
    pub fn composite_image(&self) -> Result<RgbImage> {
        let state = self.state()?;
        let mut out = state.img.clone();
        for (x, y, px) in out.enumerate_pixels_mut() {
            let mask = state.mask_color.get_pixel(x, y);
            for c in 0..3 {
                if mask.0[c] != 0 {
                    px.0[c] = mask.0[c];
                }
            }
            let hl = state.highlight.get_pixel(x, y);
            for c in 0..3 {
                if hl.0[c] != 0 {
                    let blended =
                        px.0[c] as f32 + state.highlight_opacity * hl.0[c] as f32;
                    px.0[c] = blended.clamp(0.0, 255.0) as u8;
                }
            }
        }
        Ok(out)
    }

    /// From-scratch render of every shape filled solid in its object color
    /// on a black canvas. Not cached.
    pub fn mask_image(&self) -> Result<RgbImage> {
        let state = self.state()?;
        let (width, height) = state.img.dimensions();
        let mut out = RgbImage::new(width, height);
        for object_id in state.annotation.object_ids() {
            let color = state.annotation.color_for(object_id)?;
            for shape in state.annotation.shapes_of(object_id) {
                draw::fill_contour(&mut out, &shape.points, color);
            }
        }
        Ok(out)
    }

    /// Source pixels with one union bounding box drawn per object.
    /// Shapeless objects are skipped. Not cached.
    pub fn bounding_box_image(&self) -> Result<RgbImage> {
        let state = self.state()?;
        let mut out = state.img.clone();
        for object_id in state.annotation.object_ids() {
            let Some((x1, y1, x2, y2)) = state.annotation.union_bounding_box(object_id) else {
                continue;
            };
            let color = state.annotation.color_for(object_id)?;
            draw::draw_box_outline(
                &mut out,
                (x1 as i32, y1 as i32, x2 as i32, y2 as i32),
                color,
                BOX_LINE_WIDTH,
            );
        }
        Ok(out)
    }

    /// Append a shape and incrementally draw only its outline onto the
    /// mask-color buffer.
    pub fn add_shape(
        &mut self,
        label: &str,
        shape_type: ShapeType,
        points: Vec<Point>,
        object_id: &str,
    ) -> Result<()> {
        let state = self.state_mut()?;
        let id = state.annotation.add_shape(label, shape_type, points, object_id);
        let color = state.annotation.color_for(object_id)?;
        let stored = state
            .annotation
            .shape(id)
            .map(|s| s.points.clone())
            .unwrap_or_default();
        draw::draw_contour_outline(&mut state.mask_color, &stored, color, state.outline_thickness);
        state.changed = true;
        Ok(())
    }

    /// Delete the contour at `position` and rebuild the mask-color buffer
    /// from the remaining shapes; a drawn outline cannot be subtracted
    /// incrementally. Clears the highlight.
    pub fn delete_contour(&mut self, object_id: &str, position: usize) -> Result<()> {
        let state = self.state_mut()?;
        state.annotation.delete_shape(object_id, position)?;

        let contours: Vec<(Vec<Point>, Rgb<u8>)> = state
            .annotation
            .all_shapes()
            .map(|s| {
                let color = state.annotation.color_for(&s.group_id)?;
                Ok((s.points.clone(), color))
            })
            .collect::<Result<_>>()?;
        state.mask_color = RgbImage::new(state.img.width(), state.img.height());
        for (points, color) in &contours {
            draw::draw_contour_outline(&mut state.mask_color, points, *color, state.outline_thickness);
        }

        state.highlight = RgbImage::new(state.img.width(), state.img.height());
        state.changed = true;
        Ok(())
    }

    /// Replace the highlight buffer with exactly this one contour, filled
    /// solid. At most one contour is ever highlighted.
    pub fn highlight_contour(&mut self, object_id: &str, position: usize) -> Result<()> {
        let state = self.state_mut()?;
        let points = state
            .annotation
            .polygon_shape(object_id, position)?
            .points
            .clone();
        state.highlight = RgbImage::new(state.img.width(), state.img.height());
        draw::fill_contour(&mut state.highlight, &points, HIGHLIGHT_COLOR);
        Ok(())
    }

    /// Per-contour bounding box, forwarded to the shape store.
    pub fn contour_bounding_box(
        &self,
        object_id: &str,
        position: usize,
    ) -> Result<(i32, i32, i32, i32)> {
        self.state()?.annotation.bounding_box_of(object_id, position)
    }

    /// Allocate the next instance number for `label` and register the new
    /// object. Instance numbers are never reused, even after every shape
    /// of an earlier instance is deleted.
    pub fn create_object(&mut self, label: &str) -> Result<String> {
        let state = self.state_mut()?;
        let (max_seen, _) = *state
            .labels_count
            .entry(label.to_string())
            .and_modify(|(max_seen, count)| {
                *max_seen += 1;
                *count += 1;
            })
            .or_insert((1, 1));
        let object_id = format!("{label}_{max_seen}");
        state.annotation.ensure_object(&object_id);
        state.changed = true;
        Ok(object_id)
    }

    pub fn object_names(&self) -> Result<Vec<String>> {
        Ok(self
            .state()?
            .annotation
            .object_ids()
            .map(str::to_string)
            .collect())
    }

    pub fn shapes_for_object(&self, object_id: &str, filter: Option<ShapeType>) -> Result<usize> {
        Ok(self.state()?.annotation.shapes_for_object(object_id, filter))
    }

    /// Serialize the shape store to the annotation path. The recorded image
    /// path is relative (`../imgs/<filename>`), dimensions come from the
    /// live image.
    pub fn save(&self, bbox_summary: bool) -> Result<()> {
        let state = self.state()?;
        let file_name = self
            .img_path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| self.name.clone());
        let (width, height) = state.img.dimensions();
        let file = serialization::to_file(
            &state.annotation,
            &format!("../imgs/{file_name}"),
            width,
            height,
            bbox_summary,
        );
        serialization::export_json(&file, &self.annotation_path)?;
        log::info!("Saved annotations for {}", self.name);
        Ok(())
    }

    fn state(&self) -> Result<&OpenState> {
        self.open
            .as_ref()
            .ok_or_else(|| Error::ItemClosed(self.name.clone()))
    }

    fn state_mut(&mut self) -> Result<&mut OpenState> {
        self.open
            .as_mut()
            .ok_or_else(|| Error::ItemClosed(self.name.clone()))
    }
}
