// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Geometric utility functions.
//!
//! This module provides bounding-box computations over point sets and
//! corner normalization for rectangle shapes.

use crate::models::annotation::Point;

/// Axis-aligned bounding box of a point set as `(min_x, min_y, max_x, max_y)`.
///
/// Returns `None` for an empty point set.
pub fn bounding_box(points: &[Point]) -> Option<(f64, f64, f64, f64)> {
    let first = points.first()?;
    let mut bbox = (first.x, first.y, first.x, first.y);
    for p in &points[1..] {
        bbox.0 = bbox.0.min(p.x);
        bbox.1 = bbox.1.min(p.y);
        bbox.2 = bbox.2.max(p.x);
        bbox.3 = bbox.3.max(p.y);
    }
    Some(bbox)
}

/// Union of two bounding boxes.
pub fn union_box(a: (f64, f64, f64, f64), b: (f64, f64, f64, f64)) -> (f64, f64, f64, f64) {
    (a.0.min(b.0), a.1.min(b.1), a.2.max(b.2), a.3.max(b.3))
}

/// Normalize two rectangle corners into `[top-left, bottom-right]` order.
pub fn rectangle_corners(a: Point, b: Point) -> [Point; 2] {
    [
        Point {
            x: a.x.min(b.x),
            y: a.y.min(b.y),
        },
        Point {
            x: a.x.max(b.x),
            y: a.y.max(b.y),
        },
    ]
}
