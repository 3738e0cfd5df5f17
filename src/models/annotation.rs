// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Annotation data structures.
//!
//! This module defines the core data structures for representing
//! shape annotations, their labels, and the primitive geometry types
//! they are built from. All coordinates are in image space.

use serde::{Deserialize, Serialize};

/// Unique, stable identity of an annotation.
pub type AnnotationId = u64;

/// A 2D point in image space (pixels, origin at top-left).
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const ZERO: Point = Point { x: 0.0, y: 0.0 };

    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn offset(self, dx: f64, dy: f64) -> Self {
        Self::new(self.x + dx, self.y + dy)
    }

    /// Vector from `self` to `other`.
    pub fn delta(self, other: Point) -> (f64, f64) {
        (other.x - self.x, other.y - self.y)
    }

    pub fn distance(self, other: Point) -> f64 {
        let (dx, dy) = self.delta(other);
        (dx * dx + dy * dy).sqrt()
    }
}

/// Width and height in image-space units.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

impl Size {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }
}

/// Axis-aligned rectangle.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Rectangle spanning two arbitrary corners.
    pub fn from_corners(a: Point, b: Point) -> Self {
        let x = a.x.min(b.x);
        let y = a.y.min(b.y);
        Self::new(x, y, (a.x - b.x).abs(), (a.y - b.y).abs())
    }

    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    pub fn center(&self) -> Point {
        Point::new(self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    pub fn contains(&self, point: Point) -> bool {
        point.x >= self.x && point.x <= self.right() && point.y >= self.y && point.y <= self.bottom()
    }
}

/// Type of annotation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnnotationKind {
    Rectangle,
    Circle,
    /// Fixed-size solid circle.
    Dot,
    Freehand,
}

impl AnnotationKind {
    /// Whether the shape is drawn as an ellipse inscribed in its box.
    pub fn is_elliptical(self) -> bool {
        matches!(self, AnnotationKind::Circle | AnnotationKind::Dot)
    }

    pub fn name(self) -> &'static str {
        match self {
            AnnotationKind::Rectangle => "rectangle",
            AnnotationKind::Circle => "circle",
            AnnotationKind::Dot => "dot",
            AnnotationKind::Freehand => "freehand",
        }
    }
}

/// Which margin a label is placed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LabelSide {
    Left,
    Right,
}

/// A user-placed mark with its label.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Annotation {
    pub id: AnnotationId,
    pub kind: AnnotationKind,
    /// Display order, assigned at creation and never reused.
    pub number: u32,
    #[serde(default)]
    pub position: Point,
    #[serde(default)]
    pub size: Size,
    /// Stroke points, only populated for freehand annotations.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub points: Vec<Point>,
    pub color: String,
    #[serde(default)]
    pub text: String,
    /// Top-left of a manually dragged label box, relative to the image origin.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label_position: Option<Point>,
}

impl Annotation {
    /// Bounding box of the shape.
    pub fn bounds(&self) -> Rect {
        match self.kind {
            AnnotationKind::Freehand => {
                let Some(first) = self.points.first() else {
                    return Rect::new(self.position.x, self.position.y, 0.0, 0.0);
                };
                let (mut min_x, mut min_y, mut max_x, mut max_y) = (first.x, first.y, first.x, first.y);
                for p in &self.points[1..] {
                    min_x = min_x.min(p.x);
                    min_y = min_y.min(p.y);
                    max_x = max_x.max(p.x);
                    max_y = max_y.max(p.y);
                }
                Rect::new(min_x, min_y, max_x - min_x, max_y - min_y)
            }
            _ => Rect::new(
                self.position.x,
                self.position.y,
                self.size.width,
                self.size.height,
            ),
        }
    }

    /// Reference point used for side assignment and connector routing:
    /// the box center for closed shapes, the first point for freehand.
    pub fn anchor(&self) -> Point {
        match self.kind {
            AnnotationKind::Freehand => self.points.first().copied().unwrap_or(self.position),
            _ => self.bounds().center(),
        }
    }

    /// Side assigned from the anchor's position relative to the image midline.
    pub fn auto_side(&self, image_width: f64) -> LabelSide {
        if self.anchor().x < image_width / 2.0 {
            LabelSide::Left
        } else {
            LabelSide::Right
        }
    }

    /// Patch that moves this annotation by `(dx, dy)`.
    pub fn translation_patch(&self, dx: f64, dy: f64) -> AnnotationPatch {
        match self.kind {
            AnnotationKind::Freehand => AnnotationPatch {
                points: Some(self.points.iter().map(|p| p.offset(dx, dy)).collect()),
                ..Default::default()
            },
            _ => AnnotationPatch {
                position: Some(self.position.offset(dx, dy)),
                ..Default::default()
            },
        }
    }

    /// Merge the set fields of `patch` into this record.
    pub fn apply(&mut self, patch: &AnnotationPatch) {
        if let Some(position) = patch.position {
            self.position = position;
        }
        if let Some(size) = patch.size {
            self.size = size;
        }
        if let Some(points) = &patch.points {
            self.points = points.clone();
        }
        if let Some(color) = &patch.color {
            self.color = color.clone();
        }
        if let Some(text) = &patch.text {
            self.text = text.clone();
        }
        if let Some(label_position) = patch.label_position {
            self.label_position = label_position;
        }
    }
}

/// Fields of a new annotation; identity and number are assigned by the store.
#[derive(Debug, Clone, PartialEq)]
pub struct AnnotationDraft {
    pub kind: AnnotationKind,
    pub position: Point,
    pub size: Size,
    pub points: Vec<Point>,
    pub color: String,
    pub text: String,
}

impl AnnotationDraft {
    /// Draft for a rectangle or circle spanning `rect`.
    pub fn shape(kind: AnnotationKind, rect: Rect, color: &str) -> Self {
        Self {
            kind,
            position: Point::new(rect.x, rect.y),
            size: Size::new(rect.width, rect.height),
            points: Vec::new(),
            color: color.to_string(),
            text: String::new(),
        }
    }

    /// Draft for a fixed-size dot centered on `center`.
    pub fn dot(center: Point, diameter: f64, color: &str) -> Self {
        let radius = diameter / 2.0;
        Self::shape(
            AnnotationKind::Dot,
            Rect::new(center.x - radius, center.y - radius, diameter, diameter),
            color,
        )
    }

    /// Draft for a freehand stroke.
    pub fn freehand(points: Vec<Point>, color: &str) -> Self {
        Self {
            kind: AnnotationKind::Freehand,
            position: Point::ZERO,
            size: Size::default(),
            points,
            color: color.to_string(),
            text: String::new(),
        }
    }
}

/// Partial update: every `Some` field replaces the stored value.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AnnotationPatch {
    pub position: Option<Point>,
    pub size: Option<Size>,
    pub points: Option<Vec<Point>>,
    pub color: Option<String>,
    pub text: Option<String>,
    /// `Some(None)` clears a manual label position.
    pub label_position: Option<Option<Point>>,
}

impl AnnotationPatch {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            ..Default::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rectangle(x: f64, y: f64, w: f64, h: f64) -> Annotation {
        Annotation {
            id: 1,
            kind: AnnotationKind::Rectangle,
            number: 1,
            position: Point::new(x, y),
            size: Size::new(w, h),
            points: Vec::new(),
            color: "#e53e3e".to_string(),
            text: String::new(),
            label_position: None,
        }
    }

    #[test]
    fn test_anchor_is_box_center() {
        let annotation = rectangle(50.0, 50.0, 100.0, 70.0);
        assert_eq!(annotation.anchor(), Point::new(100.0, 85.0));
    }

    #[test]
    fn test_freehand_anchor_is_first_point() {
        let mut annotation = rectangle(0.0, 0.0, 0.0, 0.0);
        annotation.kind = AnnotationKind::Freehand;
        annotation.points = vec![Point::new(700.0, 20.0), Point::new(10.0, 30.0)];
        assert_eq!(annotation.anchor(), Point::new(700.0, 20.0));
        assert_eq!(annotation.bounds(), Rect::new(10.0, 20.0, 690.0, 10.0));
    }

    #[test]
    fn test_side_assignment_from_midline() {
        assert_eq!(rectangle(80.0, 0.0, 40.0, 40.0).auto_side(800.0), LabelSide::Left);
        assert_eq!(rectangle(680.0, 0.0, 40.0, 40.0).auto_side(800.0), LabelSide::Right);
    }

    #[test]
    fn test_translation_patch_moves_freehand_points() {
        let mut annotation = rectangle(0.0, 0.0, 0.0, 0.0);
        annotation.kind = AnnotationKind::Freehand;
        annotation.points = vec![Point::new(1.0, 2.0), Point::new(3.0, 4.0)];
        let patch = annotation.translation_patch(10.0, -1.0);
        annotation.apply(&patch);
        assert_eq!(annotation.points, vec![Point::new(11.0, 1.0), Point::new(13.0, 3.0)]);
        assert_eq!(annotation.position, Point::ZERO);
    }

    #[test]
    fn test_serializes_camel_case_fields() {
        let mut annotation = rectangle(1.0, 2.0, 3.0, 4.0);
        annotation.label_position = Some(Point::new(-120.0, 10.0));
        let json = serde_json::to_string(&annotation).unwrap();
        assert!(json.contains("\"labelPosition\""));
        assert!(json.contains("\"kind\":\"rectangle\""));
        assert!(!json.contains("\"points\""));

        let back: Annotation = serde_json::from_str(&json).unwrap();
        assert_eq!(back, annotation);
    }
}
