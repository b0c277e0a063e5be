// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Annotation data structures.
//!
//! This module defines the core data structures for representing polygon
//! and rectangle shapes, the objects that group them, and the per-item
//! shape store that owns both.

use crate::error::{Error, Result};
use crate::models::palette::ColorPalette;
use crate::util::geometry;
use image::Rgb;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A 2D point in image pixel coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Type of shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShapeType {
    Polygon,
    Rectangle,
}

/// One polygon or rectangle belonging to one object.
///
/// Shapes are immutable once created; the store only ever adds or removes
/// them wholesale.
#[derive(Debug, Clone, PartialEq)]
pub struct Shape {
    pub label: String,
    pub points: Vec<Point>,
    pub group_id: String,
    pub shape_type: ShapeType,
}

/// One labeled object instance: its color and its shapes, in draw order.
#[derive(Debug, Clone)]
struct ObjectEntry {
    id: String,
    color: Rgb<u8>,
    shape_ids: Vec<u64>,
}

/// The per-item shape store.
///
/// Shape ids come from a counter that never decreases and is never reused,
/// so a deleted shape's id stays dead forever and `(object, position)`
/// references remain stable. Objects are kept in registration order, which
/// is also their color-assignment order.
#[derive(Debug)]
pub struct Annotation {
    shapes: BTreeMap<u64, Shape>,
    objects: Vec<ObjectEntry>,
    palette: ColorPalette,
    shape_counter: u64,
}

impl Annotation {
    pub fn new() -> Self {
        Self::with_palette(ColorPalette::default())
    }

    /// Create an empty store drawing object colors from `palette`.
    pub fn with_palette(palette: ColorPalette) -> Self {
        Self {
            shapes: BTreeMap::new(),
            objects: Vec::new(),
            palette,
            shape_counter: 0,
        }
    }

    /// Add a shape under a fresh id and index it under its object.
    ///
    /// Rectangle points are normalized to `[top-left, bottom-right]` corner
    /// order. Point lists are otherwise stored as given; no geometric
    /// validation is performed.
    pub fn add_shape(
        &mut self,
        label: &str,
        shape_type: ShapeType,
        points: Vec<Point>,
        object_id: &str,
    ) -> u64 {
        let points = match shape_type {
            ShapeType::Rectangle if points.len() >= 2 => {
                geometry::rectangle_corners(points[0], points[1]).to_vec()
            }
            _ => points,
        };

        let id = self.shape_counter;
        self.shape_counter += 1;
        self.shapes.insert(
            id,
            Shape {
                label: label.to_string(),
                points,
                group_id: object_id.to_string(),
                shape_type,
            },
        );

        self.ensure_entry(object_id).shape_ids.push(id);

        id
    }

    /// Register an object with zero shapes, assigning its color.
    ///
    /// Idempotent; used by explicit object creation before any lasso action.
    pub fn ensure_object(&mut self, object_id: &str) -> Rgb<u8> {
        self.ensure_entry(object_id).color
    }

    fn ensure_entry(&mut self, object_id: &str) -> &mut ObjectEntry {
        if let Some(pos) = self.objects.iter().position(|e| e.id == object_id) {
            return &mut self.objects[pos];
        }
        let color = self.palette.color(self.objects.len());
        self.objects.push(ObjectEntry {
            id: object_id.to_string(),
            color,
            shape_ids: Vec::new(),
        });
        let last = self.objects.len() - 1;
        &mut self.objects[last]
    }

    /// Remove the shape at `position` within the object's sequence.
    pub fn delete_shape(&mut self, object_id: &str, position: usize) -> Result<()> {
        let entry = self
            .entry_mut(object_id)
            .ok_or_else(|| Error::not_found("object", object_id))?;
        if position >= entry.shape_ids.len() {
            return Err(Error::Bounds {
                what: "contour",
                index: position,
                len: entry.shape_ids.len(),
            });
        }
        let id = entry.shape_ids.remove(position);
        self.shapes.remove(&id);
        Ok(())
    }

    /// Number of shapes for an object, optionally filtered by shape type.
    ///
    /// Unknown objects count zero.
    pub fn shapes_for_object(&self, object_id: &str, filter: Option<ShapeType>) -> usize {
        let Some(entry) = self.entry(object_id) else {
            return 0;
        };
        match filter {
            None => entry.shape_ids.len(),
            Some(wanted) => entry
                .shape_ids
                .iter()
                .filter(|id| self.shapes[*id].shape_type == wanted)
                .count(),
        }
    }

    /// The polygon at `position` within the object's polygon sequence.
    pub fn polygon_shape(&self, object_id: &str, position: usize) -> Result<&Shape> {
        let entry = self
            .entry(object_id)
            .ok_or_else(|| Error::not_found("object", object_id))?;
        let polygons: Vec<&Shape> = entry
            .shape_ids
            .iter()
            .map(|id| &self.shapes[id])
            .filter(|s| s.shape_type == ShapeType::Polygon)
            .collect();
        polygons.get(position).copied().ok_or(Error::Bounds {
            what: "contour",
            index: position,
            len: polygons.len(),
        })
    }

    /// Per-contour bounding box `(min_x, min_y, max_x, max_y)` in integer
    /// pixels, recomputed from the shape's own points on every call.
    pub fn bounding_box_of(&self, object_id: &str, position: usize) -> Result<(i32, i32, i32, i32)> {
        let shape = self.polygon_shape(object_id, position)?;
        Ok(geometry::bounding_box(&shape.points)
            .map(|(x1, y1, x2, y2)| (x1 as i32, y1 as i32, x2 as i32, y2 as i32))
            .unwrap_or((0, 0, 0, 0)))
    }

    /// Union bounding box across all of an object's shapes.
    ///
    /// `None` for unknown objects, shapeless objects, and empty point sets.
    pub fn union_bounding_box(&self, object_id: &str) -> Option<(f64, f64, f64, f64)> {
        let entry = self.entry(object_id)?;
        entry
            .shape_ids
            .iter()
            .filter_map(|id| geometry::bounding_box(&self.shapes[id].points))
            .reduce(geometry::union_box)
    }

    /// The color assigned to an object.
    pub fn color_for(&self, object_id: &str) -> Result<Rgb<u8>> {
        self.entry(object_id)
            .map(|e| e.color)
            .ok_or_else(|| Error::not_found("object", object_id))
    }

    /// Object ids in registration order.
    pub fn object_ids(&self) -> impl Iterator<Item = &str> {
        self.objects.iter().map(|e| e.id.as_str())
    }

    /// An object's shapes in insertion order.
    pub fn shapes_of(&self, object_id: &str) -> Vec<&Shape> {
        match self.entry(object_id) {
            Some(entry) => entry.shape_ids.iter().map(|id| &self.shapes[id]).collect(),
            None => Vec::new(),
        }
    }

    /// All shapes in id (creation) order.
    pub fn all_shapes(&self) -> impl Iterator<Item = &Shape> {
        self.shapes.values()
    }

    pub fn shape(&self, id: u64) -> Option<&Shape> {
        self.shapes.get(&id)
    }

    pub fn shape_count(&self) -> usize {
        self.shapes.len()
    }

    pub fn object_count(&self) -> usize {
        self.objects.len()
    }

    fn entry(&self, object_id: &str) -> Option<&ObjectEntry> {
        self.objects.iter().find(|e| e.id == object_id)
    }

    fn entry_mut(&mut self, object_id: &str) -> Option<&mut ObjectEntry> {
        self.objects.iter_mut().find(|e| e.id == object_id)
    }
}

impl Default for Annotation {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> Annotation {
        Annotation::with_palette(ColorPalette::seeded(16, 99))
    }

    fn triangle(offset: f64) -> Vec<Point> {
        vec![
            Point::new(offset, offset),
            Point::new(offset + 10.0, offset),
            Point::new(offset, offset + 10.0),
        ]
    }

    #[test]
    fn test_shape_count_tracks_adds_and_deletes() {
        let mut store = store();
        store.add_shape("cat", ShapeType::Polygon, triangle(0.0), "cat_1");
        store.add_shape("cat", ShapeType::Polygon, triangle(5.0), "cat_1");
        store.add_shape("dog", ShapeType::Polygon, triangle(20.0), "dog_1");

        assert_eq!(store.shapes_for_object("cat_1", None), 2);
        assert_eq!(store.shapes_for_object("dog_1", None), 1);

        store.delete_shape("cat_1", 0).unwrap();
        assert_eq!(store.shapes_for_object("cat_1", None), 1);
        assert_eq!(store.shape_count(), 2);
    }

    #[test]
    fn test_shape_ids_are_never_reused() {
        let mut store = store();
        let first = store.add_shape("cat", ShapeType::Polygon, triangle(0.0), "cat_1");
        let second = store.add_shape("cat", ShapeType::Polygon, triangle(5.0), "cat_1");
        store.delete_shape("cat_1", 0).unwrap();

        let third = store.add_shape("cat", ShapeType::Polygon, triangle(9.0), "cat_1");
        assert!(third > second);
        assert!(second > first);
    }

    #[test]
    fn test_rectangle_points_are_normalized() {
        let mut store = store();
        let id = store.add_shape(
            "box",
            ShapeType::Rectangle,
            vec![Point::new(10.0, 50.0), Point::new(2.0, 7.0)],
            "box_1",
        );

        let shape = store.shape(id).unwrap();
        assert_eq!(shape.points, vec![Point::new(2.0, 7.0), Point::new(10.0, 50.0)]);
    }

    #[test]
    fn test_type_filtered_counts() {
        let mut store = store();
        store.add_shape("cat", ShapeType::Polygon, triangle(0.0), "cat_1");
        store.add_shape(
            "cat",
            ShapeType::Rectangle,
            vec![Point::new(0.0, 0.0), Point::new(4.0, 4.0)],
            "cat_1",
        );

        assert_eq!(store.shapes_for_object("cat_1", Some(ShapeType::Polygon)), 1);
        assert_eq!(
            store.shapes_for_object("cat_1", Some(ShapeType::Rectangle)),
            1
        );
        assert_eq!(store.shapes_for_object("cat_1", None), 2);
    }

    #[test]
    fn test_color_lookup_requires_registration() {
        let mut store = store();
        assert!(matches!(
            store.color_for("cat_1"),
            Err(Error::NotFound { .. })
        ));

        store.add_shape("cat", ShapeType::Polygon, triangle(0.0), "cat_1");
        let assigned = store.color_for("cat_1").unwrap();

        // Stable across calls and across later registrations.
        store.add_shape("dog", ShapeType::Polygon, triangle(5.0), "dog_1");
        assert_eq!(store.color_for("cat_1").unwrap(), assigned);
        assert_ne!(store.color_for("dog_1").unwrap(), assigned);
    }

    #[test]
    fn test_explicitly_created_object_has_color_but_no_shapes() {
        let mut store = store();
        store.ensure_object("cat_1");

        assert!(store.color_for("cat_1").is_ok());
        assert_eq!(store.shapes_for_object("cat_1", None), 0);
        assert_eq!(store.object_ids().collect::<Vec<_>>(), vec!["cat_1"]);
        assert!(store.union_bounding_box("cat_1").is_none());
    }

    #[test]
    fn test_per_contour_bounding_box_is_not_a_union() {
        let mut store = store();
        store.add_shape("cat", ShapeType::Polygon, triangle(0.0), "cat_1");
        store.add_shape("cat", ShapeType::Polygon, triangle(50.0), "cat_1");

        assert_eq!(store.bounding_box_of("cat_1", 0).unwrap(), (0, 0, 10, 10));
        assert_eq!(store.bounding_box_of("cat_1", 1).unwrap(), (50, 50, 60, 60));
        assert_eq!(
            store.union_bounding_box("cat_1").unwrap(),
            (0.0, 0.0, 60.0, 60.0)
        );
    }

    #[test]
    fn test_delete_shape_errors() {
        let mut store = store();
        store.add_shape("cat", ShapeType::Polygon, triangle(0.0), "cat_1");

        assert!(matches!(
            store.delete_shape("dog_1", 0),
            Err(Error::NotFound { .. })
        ));
        assert!(matches!(
            store.delete_shape("cat_1", 1),
            Err(Error::Bounds { .. })
        ));
    }
}
