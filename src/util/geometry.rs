// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Geometric utility functions.
//!
//! This module provides the coordinate transform shared by every surface
//! (pointer, canvas and image space), shape hit testing, boundary
//! intersection for connector starts, and resize-handle math.

use crate::models::annotation::{Annotation, AnnotationKind, Point, Rect, Size};

const EPSILON: f64 = 1e-9;

/// Translation plus per-axis scale: `out = in * scale + translate`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    pub scale_x: f64,
    pub scale_y: f64,
    pub translate_x: f64,
    pub translate_y: f64,
}

impl Default for Transform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Transform {
    pub const IDENTITY: Transform = Transform {
        scale_x: 1.0,
        scale_y: 1.0,
        translate_x: 0.0,
        translate_y: 0.0,
    };

    pub fn translation(dx: f64, dy: f64) -> Self {
        Self {
            translate_x: dx,
            translate_y: dy,
            ..Self::IDENTITY
        }
    }

    pub fn scaling(scale_x: f64, scale_y: f64) -> Self {
        Self {
            scale_x,
            scale_y,
            ..Self::IDENTITY
        }
    }

    /// Uniform scale that fits `content` inside `viewport`, centered.
    pub fn fit(content: Size, viewport: Rect) -> Self {
        if content.width <= EPSILON || content.height <= EPSILON {
            return Self::translation(viewport.x, viewport.y);
        }
        let scale = (viewport.width / content.width).min(viewport.height / content.height);
        let scale = if scale > EPSILON { scale } else { 1.0 };
        Self::scaling(scale, scale).then(&Self::translation(
            viewport.x + (viewport.width - content.width * scale) / 2.0,
            viewport.y + (viewport.height - content.height * scale) / 2.0,
        ))
    }

    pub fn apply(&self, point: Point) -> Point {
        Point::new(
            point.x * self.scale_x + self.translate_x,
            point.y * self.scale_y + self.translate_y,
        )
    }

    pub fn apply_rect(&self, rect: Rect) -> Rect {
        let a = self.apply(Point::new(rect.x, rect.y));
        let b = self.apply(Point::new(rect.right(), rect.bottom()));
        Rect::from_corners(a, b)
    }

    /// Apply `self`, then `next`.
    pub fn then(&self, next: &Transform) -> Transform {
        Transform {
            scale_x: self.scale_x * next.scale_x,
            scale_y: self.scale_y * next.scale_y,
            translate_x: self.translate_x * next.scale_x + next.translate_x,
            translate_y: self.translate_y * next.scale_y + next.translate_y,
        }
    }

    /// Inverse mapping, or `None` for a degenerate (zero) scale.
    pub fn inverse(&self) -> Option<Transform> {
        if self.scale_x.abs() < EPSILON || self.scale_y.abs() < EPSILON {
            return None;
        }
        Some(Transform {
            scale_x: 1.0 / self.scale_x,
            scale_y: 1.0 / self.scale_y,
            translate_x: -self.translate_x / self.scale_x,
            translate_y: -self.translate_y / self.scale_y,
        })
    }

    /// Smallest axis scale, used to convert screen tolerances into logical units.
    pub fn min_scale(&self) -> f64 {
        self.scale_x.abs().min(self.scale_y.abs())
    }
}

/// Convert a device-space pointer position into the logical space that
/// `surface` maps onto the device.
pub fn to_logical_coords(pointer: Point, surface: &Transform) -> Option<Point> {
    surface.inverse().map(|inverse| inverse.apply(pointer))
}

/// Whether `point` lies inside a closed shape. Freehand strokes never match.
pub fn point_in_shape(point: Point, annotation: &Annotation) -> bool {
    let bounds = annotation.bounds();
    match annotation.kind {
        AnnotationKind::Rectangle => bounds.contains(point),
        AnnotationKind::Circle | AnnotationKind::Dot => {
            let rx = bounds.width / 2.0;
            let ry = bounds.height / 2.0;
            if rx <= EPSILON || ry <= EPSILON {
                return false;
            }
            let center = bounds.center();
            let nx = (point.x - center.x) / rx;
            let ny = (point.y - center.y) / ry;
            nx * nx + ny * ny <= 1.0
        }
        AnnotationKind::Freehand => false,
    }
}

/// Whether `point` is within `tolerance` of any segment of a stroke.
pub fn point_near_path(point: Point, points: &[Point], tolerance: f64) -> bool {
    match points {
        [] => false,
        [single] => single.distance(point) <= tolerance,
        _ => points
            .windows(2)
            .any(|pair| distance_to_segment(point, pair[0], pair[1]) <= tolerance),
    }
}

fn distance_to_segment(point: Point, a: Point, b: Point) -> f64 {
    let (abx, aby) = a.delta(b);
    let (apx, apy) = a.delta(point);
    let len_sq = abx * abx + aby * aby;
    if len_sq <= EPSILON {
        return a.distance(point);
    }
    let t = ((apx * abx + apy * aby) / len_sq).clamp(0.0, 1.0);
    point.distance(Point::new(a.x + abx * t, a.y + aby * t))
}

/// Point on the shape's boundary along the ray from its center toward `toward`.
///
/// Freehand strokes have no closed boundary; the stroke vertex nearest to
/// `toward` is used instead.
pub fn nearest_boundary_point(annotation: &Annotation, toward: Point) -> Point {
    if annotation.kind == AnnotationKind::Freehand {
        return annotation
            .points
            .iter()
            .copied()
            .min_by(|a, b| a.distance(toward).total_cmp(&b.distance(toward)))
            .unwrap_or(annotation.position);
    }

    let bounds = annotation.bounds();
    let center = bounds.center();
    let (dx, dy) = center.delta(toward);
    let half_w = bounds.width / 2.0;
    let half_h = bounds.height / 2.0;
    if (dx.abs() < EPSILON && dy.abs() < EPSILON) || half_w <= EPSILON || half_h <= EPSILON {
        return center;
    }

    if annotation.kind.is_elliptical() {
        let t = 1.0 / ((dx / half_w).powi(2) + (dy / half_h).powi(2)).sqrt();
        return Point::new(center.x + dx * t, center.y + dy * t);
    }

    if (dx / half_w).abs() >= (dy / half_h).abs() {
        // Left or right edge.
        let t = half_w / dx.abs();
        Point::new(center.x + half_w * dx.signum(), center.y + dy * t)
    } else {
        let t = half_h / dy.abs();
        Point::new(center.x + dx * t, center.y + half_h * dy.signum())
    }
}

/// One of the eight resize handles around a shape's bounding box.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Handle {
    NorthWest,
    North,
    NorthEast,
    East,
    SouthEast,
    South,
    SouthWest,
    West,
}

impl Handle {
    pub const ALL: [Handle; 8] = [
        Handle::NorthWest,
        Handle::North,
        Handle::NorthEast,
        Handle::East,
        Handle::SouthEast,
        Handle::South,
        Handle::SouthWest,
        Handle::West,
    ];

    /// Position of this handle on `rect`.
    pub fn position(self, rect: &Rect) -> Point {
        let c = rect.center();
        match self {
            Handle::NorthWest => Point::new(rect.x, rect.y),
            Handle::North => Point::new(c.x, rect.y),
            Handle::NorthEast => Point::new(rect.right(), rect.y),
            Handle::East => Point::new(rect.right(), c.y),
            Handle::SouthEast => Point::new(rect.right(), rect.bottom()),
            Handle::South => Point::new(c.x, rect.bottom()),
            Handle::SouthWest => Point::new(rect.x, rect.bottom()),
            Handle::West => Point::new(rect.x, c.y),
        }
    }

    fn moves_left(self) -> bool {
        matches!(self, Handle::NorthWest | Handle::West | Handle::SouthWest)
    }

    fn moves_right(self) -> bool {
        matches!(self, Handle::NorthEast | Handle::East | Handle::SouthEast)
    }

    fn moves_top(self) -> bool {
        matches!(self, Handle::NorthWest | Handle::North | Handle::NorthEast)
    }

    fn moves_bottom(self) -> bool {
        matches!(self, Handle::SouthWest | Handle::South | Handle::SouthEast)
    }
}

/// Whether the annotation can be resized through handles.
pub fn is_resizable(annotation: &Annotation) -> bool {
    matches!(
        annotation.kind,
        AnnotationKind::Rectangle | AnnotationKind::Circle
    )
}

/// The handle under `point`, if any, within `tolerance` on both axes.
pub fn hit_handle(annotation: &Annotation, point: Point, tolerance: f64) -> Option<Handle> {
    if !is_resizable(annotation) {
        return None;
    }
    let bounds = annotation.bounds();
    Handle::ALL.into_iter().find(|handle| {
        let p = handle.position(&bounds);
        (p.x - point.x).abs() <= tolerance && (p.y - point.y).abs() <= tolerance
    })
}

/// New bounds after dragging `handle` of `original` to `pointer`.
///
/// Edges not controlled by the handle stay fixed; the result is never
/// smaller than `min_size` on either axis.
pub fn resize_with_handle(original: Rect, handle: Handle, pointer: Point, min_size: f64) -> Rect {
    let mut left = original.x;
    let mut top = original.y;
    let mut right = original.right();
    let mut bottom = original.bottom();

    if handle.moves_left() {
        left = pointer.x.min(right - min_size);
    }
    if handle.moves_right() {
        right = pointer.x.max(left + min_size);
    }
    if handle.moves_top() {
        top = pointer.y.min(bottom - min_size);
    }
    if handle.moves_bottom() {
        bottom = pointer.y.max(top + min_size);
    }

    Rect::new(left, top, right - left, bottom - top)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::annotation::LabelSide;

    fn shape(kind: AnnotationKind, x: f64, y: f64, w: f64, h: f64) -> Annotation {
        Annotation {
            id: 1,
            kind,
            number: 1,
            position: Point::new(x, y),
            size: Size::new(w, h),
            points: Vec::new(),
            color: "red".to_string(),
            text: String::new(),
            label_position: None,
        }
    }

    fn approx(a: Point, b: Point) -> bool {
        (a.x - b.x).abs() < 1e-6 && (a.y - b.y).abs() < 1e-6
    }

    #[test]
    fn test_to_logical_inverts_non_uniform_scale() {
        let surface = Transform::translation(120.0, 40.0)
            .then(&Transform::scaling(0.5, 0.25))
            .then(&Transform::translation(10.0, 8.0));
        let logical = Point::new(333.0, 71.5);
        let device = surface.apply(logical);
        let back = to_logical_coords(device, &surface).unwrap();
        assert!(approx(back, logical));
    }

    #[test]
    fn test_to_logical_degenerate_scale() {
        assert!(to_logical_coords(Point::ZERO, &Transform::scaling(0.0, 1.0)).is_none());
    }

    #[test]
    fn test_fit_centers_content() {
        let t = Transform::fit(Size::new(200.0, 100.0), Rect::new(0.0, 0.0, 400.0, 400.0));
        assert_eq!(t.scale_x, 2.0);
        assert!(approx(t.apply(Point::new(0.0, 0.0)), Point::new(0.0, 100.0)));
        assert!(approx(t.apply(Point::new(200.0, 100.0)), Point::new(400.0, 300.0)));
    }

    #[test]
    fn test_point_in_rectangle() {
        let rect = shape(AnnotationKind::Rectangle, 10.0, 20.0, 30.0, 40.0);
        assert!(point_in_shape(Point::new(11.0, 21.0), &rect));
        assert!(point_in_shape(Point::new(39.9, 59.9), &rect));
        assert!(!point_in_shape(Point::new(9.9, 30.0), &rect));
        assert!(!point_in_shape(Point::new(20.0, 60.1), &rect));
    }

    #[test]
    fn test_point_in_ellipse() {
        let ellipse = shape(AnnotationKind::Circle, 0.0, 0.0, 100.0, 50.0);
        assert!(point_in_shape(Point::new(50.0, 25.0), &ellipse));
        assert!(point_in_shape(Point::new(99.0, 25.0), &ellipse));
        // Inside the bounding box corner, outside the ellipse.
        assert!(!point_in_shape(Point::new(5.0, 5.0), &ellipse));
    }

    #[test]
    fn test_freehand_excluded_from_point_in_shape() {
        let mut stroke = shape(AnnotationKind::Freehand, 0.0, 0.0, 0.0, 0.0);
        stroke.points = vec![Point::new(0.0, 0.0), Point::new(100.0, 0.0)];
        assert!(!point_in_shape(Point::new(50.0, 0.0), &stroke));
        assert!(point_near_path(Point::new(50.0, 3.0), &stroke.points, 6.0));
        assert!(!point_near_path(Point::new(50.0, 9.0), &stroke.points, 6.0));
    }

    #[test]
    fn test_boundary_point_rectangle_edges() {
        let rect = shape(AnnotationKind::Rectangle, 0.0, 0.0, 100.0, 50.0);
        // Straight right hits the right edge midpoint.
        assert!(approx(
            nearest_boundary_point(&rect, Point::new(500.0, 25.0)),
            Point::new(100.0, 25.0)
        ));
        // Steep direction hits the bottom edge.
        assert!(approx(
            nearest_boundary_point(&rect, Point::new(60.0, 225.0)),
            Point::new(51.25, 50.0)
        ));
        // Shallow direction to the left hits the left edge.
        assert!(approx(
            nearest_boundary_point(&rect, Point::new(-450.0, 75.0)),
            Point::new(0.0, 30.0)
        ));
    }

    #[test]
    fn test_boundary_point_ellipse() {
        let circle = shape(AnnotationKind::Circle, 0.0, 0.0, 100.0, 100.0);
        let p = nearest_boundary_point(&circle, Point::new(150.0, 150.0));
        let expected = 50.0 + 50.0 / 2f64.sqrt();
        assert!(approx(p, Point::new(expected, expected)));

        let ellipse = shape(AnnotationKind::Circle, 0.0, 0.0, 200.0, 100.0);
        assert!(approx(
            nearest_boundary_point(&ellipse, Point::new(100.0, -300.0)),
            Point::new(100.0, 0.0)
        ));
    }

    #[test]
    fn test_boundary_point_freehand_nearest_vertex() {
        let mut stroke = shape(AnnotationKind::Freehand, 0.0, 0.0, 0.0, 0.0);
        stroke.points = vec![
            Point::new(10.0, 10.0),
            Point::new(60.0, 10.0),
            Point::new(90.0, 40.0),
        ];
        assert_eq!(
            nearest_boundary_point(&stroke, Point::new(200.0, 40.0)),
            Point::new(90.0, 40.0)
        );
        assert_eq!(stroke.auto_side(200.0), LabelSide::Left);
    }

    #[test]
    fn test_hit_handle_corners_and_edges() {
        let rect = shape(AnnotationKind::Rectangle, 100.0, 100.0, 80.0, 40.0);
        assert_eq!(hit_handle(&rect, Point::new(104.0, 97.0), 8.0), Some(Handle::NorthWest));
        assert_eq!(hit_handle(&rect, Point::new(140.0, 141.0), 8.0), Some(Handle::South));
        assert_eq!(hit_handle(&rect, Point::new(140.0, 120.0), 8.0), None);

        let dot = shape(AnnotationKind::Dot, 100.0, 100.0, 14.0, 14.0);
        assert_eq!(hit_handle(&dot, Point::new(100.0, 100.0), 8.0), None);
    }

    #[test]
    fn test_resize_south_east_clamps_to_minimum() {
        let original = Rect::new(50.0, 50.0, 100.0, 70.0);
        let resized = resize_with_handle(original, Handle::SouthEast, Point::new(20.0, 10.0), 10.0);
        assert_eq!(resized, Rect::new(50.0, 50.0, 10.0, 10.0));
    }

    #[test]
    fn test_resize_north_west_moves_origin() {
        let original = Rect::new(50.0, 50.0, 100.0, 70.0);
        let grown = resize_with_handle(original, Handle::NorthWest, Point::new(30.0, 40.0), 10.0);
        assert_eq!(grown, Rect::new(30.0, 40.0, 120.0, 80.0));

        let collapsed = resize_with_handle(original, Handle::NorthWest, Point::new(400.0, 400.0), 10.0);
        assert_eq!(collapsed, Rect::new(140.0, 110.0, 10.0, 10.0));
    }

    #[test]
    fn test_resize_edge_changes_one_dimension() {
        let original = Rect::new(50.0, 50.0, 100.0, 70.0);
        let resized = resize_with_handle(original, Handle::East, Point::new(300.0, 999.0), 10.0);
        assert_eq!(resized, Rect::new(50.0, 50.0, 250.0, 70.0));
        let resized = resize_with_handle(original, Handle::North, Point::new(0.0, 60.0), 10.0);
        assert_eq!(resized, Rect::new(50.0, 60.0, 100.0, 60.0));
    }
}
