// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Contour rasterization helpers.
//!
//! Thin wrappers around `imageproc` drawing primitives: thick contour
//! outlines, solid contour fills, and hollow rectangles. All helpers clip
//! to the image bounds and accept degenerate point sets without panicking.

use crate::models::annotation::Point;
use image::{Rgb, RgbImage};
use imageproc::drawing::{
    draw_filled_circle_mut, draw_hollow_rect_mut, draw_line_segment_mut, draw_polygon_mut,
    BresenhamLineIter,
};
use imageproc::point::Point as PixelPoint;
use imageproc::rect::Rect;

/// Draw the closed outline of a contour with the given stroke thickness.
pub fn draw_contour_outline(img: &mut RgbImage, points: &[Point], color: Rgb<u8>, thickness: u32) {
    if points.is_empty() {
        return;
    }
    let radius = (thickness / 2) as i32;
    let n = points.len();
    for i in 0..n {
        let a = points[i];
        let b = points[(i + 1) % n];
        stroke_segment(img, a, b, color, radius);
    }
}

fn stroke_segment(img: &mut RgbImage, a: Point, b: Point, color: Rgb<u8>, radius: i32) {
    let start = (a.x as f32, a.y as f32);
    let end = (b.x as f32, b.y as f32);
    if radius <= 0 {
        draw_line_segment_mut(img, start, end, color);
        return;
    }
    // Stamp a disc along the rasterized segment to get a rounded stroke.
    for (x, y) in BresenhamLineIter::new(start, end) {
        draw_filled_circle_mut(img, (x, y), radius, color);
    }
}

/// Fill a contour solid.
///
/// Degenerate contours (fewer than three distinct vertices) collapse to a
/// line or a single pixel instead of a filled region.
pub fn fill_contour(img: &mut RgbImage, points: &[Point], color: Rgb<u8>) {
    let mut poly: Vec<PixelPoint<i32>> = points
        .iter()
        .map(|p| PixelPoint::new(p.x as i32, p.y as i32))
        .collect();
    poly.dedup();
    // draw_polygon_mut requires an open ring
    while poly.len() > 1 && poly.first() == poly.last() {
        poly.pop();
    }

    match poly.len() {
        0 => {}
        1 | 2 => {
            let first = poly[0];
            let last = poly[poly.len() - 1];
            draw_line_segment_mut(
                img,
                (first.x as f32, first.y as f32),
                (last.x as f32, last.y as f32),
                color,
            );
        }
        _ => draw_polygon_mut(img, &poly, color),
    }
}

/// Draw a hollow rectangle outline with the given line width.
pub fn draw_box_outline(
    img: &mut RgbImage,
    bbox: (i32, i32, i32, i32),
    color: Rgb<u8>,
    line_width: u32,
) {
    let (x1, y1, x2, y2) = bbox;
    let (x_min, x_max) = (x1.min(x2), x1.max(x2));
    let (y_min, y_max) = (y1.min(y2), y1.max(y2));
    for t in 0..line_width as i32 {
        let w = (x_max - x_min - 2 * t).max(1) as u32;
        let h = (y_max - y_min - 2 * t).max(1) as u32;
        draw_hollow_rect_mut(img, Rect::at(x_min + t, y_min + t).of_size(w, h), color);
    }
}
