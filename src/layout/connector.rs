// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Connector routing from shapes to their labels.
//!
//! Each connector leaves the shape boundary horizontally, turns at an
//! elbow x-coordinate and enters the label box horizontally. Connectors
//! sharing a side get their elbows spread across a fixed window so their
//! vertical runs do not sit on top of each other.

use std::fmt::Write as _;

use super::config::LayoutConfig;
use super::labels::LabelPlacement;
use crate::models::annotation::{Annotation, AnnotationId, LabelSide, Point};
use crate::util::geometry::{nearest_boundary_point, Transform};

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PathSegment {
    Line(Point),
    Cubic { ctrl1: Point, ctrl2: Point, to: Point },
}

impl PathSegment {
    fn end(&self) -> Point {
        match *self {
            PathSegment::Line(to) | PathSegment::Cubic { to, .. } => to,
        }
    }
}

/// A path made of straight and cubic segments, in canvas space.
#[derive(Debug, Clone, PartialEq)]
pub struct ConnectorPath {
    pub start: Point,
    pub segments: Vec<PathSegment>,
}

impl ConnectorPath {
    pub fn has_curve(&self) -> bool {
        self.segments
            .iter()
            .any(|segment| matches!(segment, PathSegment::Cubic { .. }))
    }

    /// SVG path data (`d` attribute).
    pub fn to_svg_data(&self) -> String {
        let mut d = format!("M {:.2} {:.2}", self.start.x, self.start.y);
        for segment in &self.segments {
            let _ = match segment {
                PathSegment::Line(p) => write!(d, " L {:.2} {:.2}", p.x, p.y),
                PathSegment::Cubic { ctrl1, ctrl2, to } => write!(
                    d,
                    " C {:.2} {:.2} {:.2} {:.2} {:.2} {:.2}",
                    ctrl1.x, ctrl1.y, ctrl2.x, ctrl2.y, to.x, to.y
                ),
            };
        }
        d
    }

    /// Polyline approximation with `steps` samples per curve.
    pub fn flatten(&self, steps: usize) -> Vec<Point> {
        let steps = steps.max(1);
        let mut points = vec![self.start];
        let mut current = self.start;
        for segment in &self.segments {
            match *segment {
                PathSegment::Line(to) => points.push(to),
                PathSegment::Cubic { ctrl1, ctrl2, to } => {
                    for step in 1..=steps {
                        let t = step as f64 / steps as f64;
                        points.push(cubic_point(current, ctrl1, ctrl2, to, t));
                    }
                }
            }
            current = segment.end();
        }
        points
    }
}

fn cubic_point(p0: Point, p1: Point, p2: Point, p3: Point, t: f64) -> Point {
    let u = 1.0 - t;
    let (a, b, c, d) = (u * u * u, 3.0 * u * u * t, 3.0 * u * t * t, t * t * t);
    Point::new(
        a * p0.x + b * p1.x + c * p2.x + d * p3.x,
        a * p0.y + b * p1.y + c * p2.y + d * p3.y,
    )
}

/// Routed connector for one annotation.
#[derive(Debug, Clone, PartialEq)]
pub struct Connector {
    pub annotation_id: AnnotationId,
    pub side: LabelSide,
    pub elbow_x: f64,
    pub path: ConnectorPath,
}

/// Elbow x for connector `index` of `count` on one side.
///
/// Elbows are spread evenly over `spread` centered on the midpoint between
/// `start_x` and `end_x`, and never leave that horizontal span.
pub fn elbow_x(start_x: f64, end_x: f64, index: usize, count: usize, spread: f64) -> f64 {
    let mid = (start_x + end_x) / 2.0;
    let offset = if count > 1 {
        -spread / 2.0 + spread * index as f64 / (count - 1) as f64
    } else {
        0.0
    };
    let (lo, hi) = (start_x.min(end_x), start_x.max(end_x));
    (mid + offset).clamp(lo, hi)
}

/// Path from `start` to `end` turning at `elbow`.
///
/// Short vertical runs become a two-segment polyline; longer ones a
/// horizontal run, an S-curve centered on the elbow, and a horizontal run
/// into the label.
pub fn route(start: Point, end: Point, elbow: f64, config: &LayoutConfig) -> ConnectorPath {
    if (end.y - start.y).abs() < config.curve_threshold {
        return ConnectorPath {
            start,
            segments: vec![
                PathSegment::Line(Point::new(elbow, start.y)),
                PathSegment::Line(end),
            ],
        };
    }

    let direction = if end.x < start.x { -1.0 } else { 1.0 };
    let (lo, hi) = (start.x.min(end.x), start.x.max(end.x));
    let half = config.curve_width / 2.0;
    let curve_start = (elbow - direction * half).clamp(lo, hi);
    let curve_end = (elbow + direction * half).clamp(lo, hi);

    ConnectorPath {
        start,
        segments: vec![
            PathSegment::Line(Point::new(curve_start, start.y)),
            PathSegment::Cubic {
                ctrl1: Point::new(elbow, start.y),
                ctrl2: Point::new(elbow, end.y),
                to: Point::new(curve_end, end.y),
            },
            PathSegment::Line(end),
        ],
    }
}

/// Route a connector for every label.
///
/// `image_to_canvas` maps image space onto the canvas the labels live in.
pub fn route_connectors(
    annotations: &[Annotation],
    labels: &[LabelPlacement],
    image_to_canvas: &Transform,
    config: &LayoutConfig,
) -> Vec<Connector> {
    let Some(canvas_to_image) = image_to_canvas.inverse() else {
        return Vec::new();
    };

    let mut connectors = Vec::with_capacity(labels.len());
    for side in [LabelSide::Left, LabelSide::Right] {
        let mut on_side: Vec<(&LabelPlacement, &Annotation)> = labels
            .iter()
            .filter(|label| label.anchor_side == side)
            .filter_map(|label| {
                annotations
                    .iter()
                    .find(|a| a.id == label.annotation_id)
                    .map(|a| (label, a))
            })
            .collect();
        on_side.sort_by(|a, b| {
            a.0.connector_anchor
                .y
                .total_cmp(&b.0.connector_anchor.y)
                .then(a.0.number.cmp(&b.0.number))
        });

        let count = on_side.len();
        for (index, (label, annotation)) in on_side.into_iter().enumerate() {
            let end = label.connector_anchor;
            let start = image_to_canvas.apply(nearest_boundary_point(
                annotation,
                canvas_to_image.apply(end),
            ));
            let elbow = elbow_x(start.x, end.x, index, count, config.elbow_spread);
            connectors.push(Connector {
                annotation_id: annotation.id,
                side,
                elbow_x: elbow,
                path: route(start, end, elbow, config),
            });
        }
    }

    // Keep the annotation order so renderers can pair by index.
    connectors.sort_by_key(|connector| {
        labels
            .iter()
            .position(|label| label.annotation_id == connector.annotation_id)
    });
    connectors
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_connector_elbow_at_midpoint() {
        assert_eq!(elbow_x(300.0, 100.0, 0, 1, 80.0), 200.0);
    }

    #[test]
    fn test_elbows_spread_across_window() {
        let elbows: Vec<f64> = (0..3).map(|i| elbow_x(100.0, 500.0, i, 3, 80.0)).collect();
        assert_eq!(elbows, vec![260.0, 300.0, 340.0]);
    }

    #[test]
    fn test_elbow_clamped_to_span() {
        assert_eq!(elbow_x(100.0, 120.0, 0, 2, 80.0), 100.0);
        assert_eq!(elbow_x(100.0, 120.0, 1, 2, 80.0), 120.0);
    }

    #[test]
    fn test_short_vertical_run_is_polyline() {
        let config = LayoutConfig::default();
        let path = route(Point::new(300.0, 100.0), Point::new(80.0, 120.0), 190.0, &config);
        assert!(!path.has_curve());
        assert_eq!(
            path.segments,
            vec![
                PathSegment::Line(Point::new(190.0, 100.0)),
                PathSegment::Line(Point::new(80.0, 120.0)),
            ]
        );
    }

    #[test]
    fn test_long_vertical_run_curves() {
        let config = LayoutConfig::default();
        let start = Point::new(300.0, 100.0);
        let end = Point::new(80.0, 400.0);
        let path = route(start, end, 190.0, &config);
        assert!(path.has_curve());
        assert_eq!(path.start, start);
        assert_eq!(path.flatten(1).last(), Some(&end));
        assert_eq!(path.segments[0], PathSegment::Line(Point::new(202.0, 100.0)));

        let flat = path.flatten(8);
        assert_eq!(flat.first(), Some(&start));
        assert_eq!(flat.last(), Some(&end));
        // The curve stays between the two horizontal runs.
        assert!(flat.iter().all(|p| p.y >= 100.0 - 1e-9 && p.y <= 400.0 + 1e-9));
    }

    #[test]
    fn test_svg_path_data() {
        let config = LayoutConfig::default();
        let path = route(Point::new(0.0, 0.0), Point::new(100.0, 10.0), 50.0, &config);
        assert_eq!(path.to_svg_data(), "M 0.00 0.00 L 50.00 0.00 L 100.00 10.00");
    }
}
