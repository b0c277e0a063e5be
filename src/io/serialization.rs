// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Annotation file serialization and deserialization.
//!
//! This module defines the labelme-compatible JSON document and converts
//! between it and the in-memory shape store. Saving may append synthesized
//! bounding-box rectangles; loading keeps polygons only, so those summary
//! rectangles are never re-ingested as real contours.

use crate::error::Result;
use crate::models::annotation::{Annotation, Point, Shape, ShapeType};
use crate::models::palette::ColorPalette;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Schema version written into every annotation file.
pub const FORMAT_VERSION: &str = "4.5.6";

/// One shape entry on the wire. `flags` is reserved and always empty.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShapeRecord {
    pub label: String,
    pub points: Vec<[f64; 2]>,
    pub group_id: String,
    pub shape_type: ShapeType,
    #[serde(default)]
    pub flags: serde_json::Map<String, serde_json::Value>,
}

/// The annotation document for one image.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnnotationFile {
    pub version: String,
    #[serde(default)]
    pub flags: serde_json::Map<String, serde_json::Value>,
    pub shapes: Vec<ShapeRecord>,
    #[serde(rename = "imagePath")]
    pub image_path: String,
    #[serde(rename = "imageData")]
    pub image_data: Option<String>,
    #[serde(rename = "imageHeight")]
    pub image_height: u32,
    #[serde(rename = "imageWidth")]
    pub image_width: u32,
}

/// Build the wire document for a shape store.
///
/// With `bbox_summary` set, one extra `rectangle` is appended per object
/// holding at least one shape: the union bounding box across all of that
/// object's shapes, labeled after the object's first shape.
pub fn to_file(
    store: &Annotation,
    image_path: &str,
    width: u32,
    height: u32,
    bbox_summary: bool,
) -> AnnotationFile {
    let mut shapes: Vec<ShapeRecord> = store.all_shapes().map(shape_record).collect();

    if bbox_summary {
        for object_id in store.object_ids() {
            let object_shapes = store.shapes_of(object_id);
            let Some(first) = object_shapes.first() else {
                continue;
            };
            if let Some((x1, y1, x2, y2)) = store.union_bounding_box(object_id) {
                shapes.push(ShapeRecord {
                    label: first.label.clone(),
                    points: vec![[x1, y1], [x2, y2]],
                    group_id: object_id.to_string(),
                    shape_type: ShapeType::Rectangle,
                    flags: serde_json::Map::new(),
                });
            }
        }
    }

    AnnotationFile {
        version: FORMAT_VERSION.to_string(),
        flags: serde_json::Map::new(),
        shapes,
        image_path: image_path.to_string(),
        image_data: None,
        image_height: height,
        image_width: width,
    }
}

/// Rebuild a shape store from a parsed document.
///
/// Replays every `polygon` entry in file order; rectangles (including
/// bounding-box summaries from a prior save) are dropped.
pub fn from_file(file: &AnnotationFile, palette: ColorPalette) -> Annotation {
    let mut store = Annotation::with_palette(palette);
    for record in &file.shapes {
        match record.shape_type {
            ShapeType::Polygon => {
                let points = record.points.iter().map(|[x, y]| Point::new(*x, *y)).collect();
                store.add_shape(&record.label, ShapeType::Polygon, points, &record.group_id);
            }
            ShapeType::Rectangle => {
                log::debug!(
                    "Skipping rectangle shape for {} on load",
                    record.group_id
                );
            }
        }
    }
    store
}

/// Export an annotation document to JSON.
pub fn export_json(file: &AnnotationFile, path: &Path) -> Result<()> {
    let json = serde_json::to_string_pretty(file)?;
    std::fs::write(path, json)?;
    Ok(())
}

/// Import an annotation document from JSON.
pub fn import_json(path: &Path) -> Result<AnnotationFile> {
    let json = std::fs::read_to_string(path)?;
    let file = serde_json::from_str(&json)?;
    Ok(file)
}

fn shape_record(shape: &Shape) -> ShapeRecord {
    ShapeRecord {
        label: shape.label.clone(),
        points: shape.points.iter().map(|p| [p.x, p.y]).collect(),
        group_id: shape.group_id.clone(),
        shape_type: shape.shape_type,
        flags: serde_json::Map::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store_with(shapes: &[(&str, &str, Vec<Point>)]) -> Annotation {
        let mut store = Annotation::with_palette(ColorPalette::seeded(16, 3));
        for (label, object_id, points) in shapes {
            store.add_shape(label, ShapeType::Polygon, points.clone(), object_id);
        }
        store
    }

    fn triangle(offset: f64) -> Vec<Point> {
        vec![
            Point::new(offset, offset),
            Point::new(offset + 5.0, offset),
            Point::new(offset, offset + 5.0),
        ]
    }

    #[test]
    fn test_polygon_round_trip() {
        let store = store_with(&[
            ("cat", "cat_1", triangle(0.0)),
            ("cat", "cat_1", triangle(20.0)),
            ("dog", "dog_1", triangle(40.0)),
        ]);

        let file = to_file(&store, "../imgs/frame.png", 64, 48, false);
        let json = serde_json::to_string_pretty(&file).unwrap();
        let parsed: AnnotationFile = serde_json::from_str(&json).unwrap();
        let reloaded = from_file(&parsed, ColorPalette::seeded(16, 3));

        let original: Vec<_> = store.all_shapes().cloned().collect();
        let restored: Vec<_> = reloaded.all_shapes().cloned().collect();
        assert_eq!(original, restored);
        assert_eq!(parsed.version, FORMAT_VERSION);
        assert_eq!(parsed.image_path, "../imgs/frame.png");
        assert_eq!(parsed.image_width, 64);
        assert_eq!(parsed.image_height, 48);
        assert!(parsed.image_data.is_none());
    }

    #[test]
    fn test_bbox_summary_appends_one_rectangle_per_object() {
        let store = store_with(&[
            ("cat", "cat_1", triangle(0.0)),
            ("cat", "cat_1", triangle(30.0)),
        ]);

        let file = to_file(&store, "../imgs/a.png", 64, 64, true);
        assert_eq!(file.shapes.len(), 3);

        let summary = &file.shapes[2];
        assert_eq!(summary.shape_type, ShapeType::Rectangle);
        assert_eq!(summary.group_id, "cat_1");
        assert_eq!(summary.points, vec![[0.0, 0.0], [35.0, 35.0]]);
    }

    #[test]
    fn test_shapeless_objects_get_no_summary() {
        let mut store = store_with(&[("cat", "cat_1", triangle(0.0))]);
        store.ensure_object("dog_1");

        let file = to_file(&store, "../imgs/a.png", 64, 64, true);
        let rectangles: Vec<_> = file
            .shapes
            .iter()
            .filter(|s| s.shape_type == ShapeType::Rectangle)
            .collect();
        assert_eq!(rectangles.len(), 1);
        assert_eq!(rectangles[0].group_id, "cat_1");
    }

    #[test]
    fn test_rectangles_are_dropped_on_load() {
        let store = store_with(&[("cat", "cat_1", triangle(0.0))]);
        let file = to_file(&store, "../imgs/a.png", 64, 64, true);

        let reloaded = from_file(&file, ColorPalette::seeded(16, 3));
        assert_eq!(reloaded.shape_count(), 1);
        assert_eq!(
            reloaded.shapes_for_object("cat_1", Some(ShapeType::Rectangle)),
            0
        );
    }

    #[test]
    fn test_wire_field_names() {
        let store = store_with(&[("cat", "cat_1", triangle(0.0))]);
        let file = to_file(&store, "../imgs/a.png", 10, 20, false);
        let value = serde_json::to_value(&file).unwrap();

        assert_eq!(value["imagePath"], "../imgs/a.png");
        assert_eq!(value["imageWidth"], 10);
        assert_eq!(value["imageHeight"], 20);
        assert!(value["imageData"].is_null());
        assert_eq!(value["shapes"][0]["shape_type"], "polygon");
        assert_eq!(value["shapes"][0]["group_id"], "cat_1");
    }
}
