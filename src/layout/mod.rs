// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Label layout engine.
//!
//! Given the annotation list and image size, computes label font size,
//! margins, label boxes and connector paths. The result is derived data:
//! it is recomputed after every mutation and never stored.

pub mod config;
pub mod connector;
pub mod labels;
pub mod text;

use crate::models::annotation::{Annotation, AnnotationId, Point, Size};
use crate::util::geometry::Transform;
use config::LayoutConfig;
use connector::{route_connectors, Connector};
use labels::{place_labels, LabelPlacement, Margins};

/// Layout of all labels and connectors around one image.
#[derive(Debug, Clone, PartialEq)]
pub struct LayoutResult {
    pub image_size: Size,
    pub font_size: f64,
    pub margins: Margins,
    /// Image plus margins.
    pub canvas_size: Size,
    pub labels: Vec<LabelPlacement>,
    pub connectors: Vec<Connector>,
}

impl LayoutResult {
    /// Top-left of the image on the canvas.
    pub fn image_origin(&self) -> Point {
        Point::new(self.margins.left, self.margins.top)
    }

    /// Maps image space onto canvas space.
    pub fn image_to_canvas(&self) -> Transform {
        Transform::translation(self.margins.left, self.margins.top)
    }

    pub fn label(&self, id: AnnotationId) -> Option<&LabelPlacement> {
        self.labels.iter().find(|label| label.annotation_id == id)
    }

    pub fn connector(&self, id: AnnotationId) -> Option<&Connector> {
        self.connectors.iter().find(|c| c.annotation_id == id)
    }

    /// Topmost label whose box contains a canvas-space point.
    pub fn label_at(&self, point: Point) -> Option<&LabelPlacement> {
        self.labels.iter().rev().find(|label| label.bounds.contains(point))
    }
}

/// Label font size for an image: `image_height / divisor`, rounded and clamped.
pub fn font_size_for(image_height: f64, config: &LayoutConfig) -> f64 {
    let divisor = if config.font_size_divisor > 0.0 {
        config.font_size_divisor
    } else {
        1.0
    };
    (image_height / divisor)
        .round()
        .min(config.font_size_max)
        .max(config.font_size_min)
}

/// Compute the full layout, or `None` while the image has no usable size.
pub fn compute_layout(
    annotations: &[Annotation],
    image_size: Size,
    config: &LayoutConfig,
) -> Option<LayoutResult> {
    if image_size.width < config.min_image_dimension
        || image_size.height < config.min_image_dimension
    {
        log::warn!(
            "Skipping label layout for {}x{} image",
            image_size.width,
            image_size.height
        );
        return None;
    }

    let font_size = font_size_for(image_size.height, config);
    let placed = place_labels(annotations, image_size, font_size, config);
    let image_to_canvas = Transform::translation(placed.margins.left, placed.margins.top);
    let connectors = route_connectors(annotations, &placed.labels, &image_to_canvas, config);
    let margins = placed.margins;

    log::debug!(
        "Layout: {} labels, margins l={:.1} r={:.1}, font {}",
        placed.labels.len(),
        margins.left,
        margins.right,
        font_size
    );

    Some(LayoutResult {
        image_size,
        font_size,
        margins,
        canvas_size: Size::new(
            margins.left + image_size.width + margins.right,
            margins.top + image_size.height + margins.bottom,
        ),
        labels: placed.labels,
        connectors,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::annotation::{AnnotationKind, LabelSide};
    use crate::util::geometry::nearest_boundary_point;

    fn shape(id: u64, kind: AnnotationKind, x: f64, y: f64, w: f64, h: f64, text: &str) -> Annotation {
        Annotation {
            id,
            kind,
            number: id as u32,
            position: Point::new(x, y),
            size: Size::new(w, h),
            points: Vec::new(),
            color: "#38a169".to_string(),
            text: text.to_string(),
            label_position: None,
        }
    }

    fn sample() -> Vec<Annotation> {
        let mut stroke = shape(5, AnnotationKind::Freehand, 0.0, 0.0, 0.0, 0.0, "stroke");
        stroke.points = vec![Point::new(600.0, 500.0), Point::new(650.0, 540.0)];
        vec![
            shape(1, AnnotationKind::Rectangle, 50.0, 50.0, 100.0, 70.0, "roof line"),
            shape(2, AnnotationKind::Circle, 80.0, 400.0, 60.0, 60.0, ""),
            shape(3, AnnotationKind::Rectangle, 620.0, 60.0, 80.0, 40.0, "antenna on the far right side of the building"),
            shape(4, AnnotationKind::Dot, 700.0, 90.0, 14.0, 14.0, "bolt"),
            stroke,
        ]
    }

    #[test]
    fn test_font_size_clamped() {
        let config = LayoutConfig::default();
        assert_eq!(font_size_for(100.0, &config), 18.0);
        assert_eq!(font_size_for(770.0, &config), 22.0);
        assert_eq!(font_size_for(4000.0, &config), 28.0);
    }

    #[test]
    fn test_tiny_image_skips_layout() {
        let config = LayoutConfig::default();
        assert!(compute_layout(&sample(), Size::new(1.0, 600.0), &config).is_none());
        assert!(compute_layout(&sample(), Size::new(800.0, 0.0), &config).is_none());
    }

    #[test]
    fn test_empty_layout_is_native_size() {
        let layout = compute_layout(&[], Size::new(800.0, 600.0), &LayoutConfig::default()).unwrap();
        assert_eq!(layout.canvas_size, Size::new(800.0, 600.0));
        assert_eq!(layout.image_origin(), Point::ZERO);
        assert!(layout.connectors.is_empty());
    }

    #[test]
    fn test_connector_endpoints() {
        let annotations = sample();
        let layout = compute_layout(&annotations, Size::new(800.0, 600.0), &LayoutConfig::default()).unwrap();
        assert_eq!(layout.connectors.len(), annotations.len());

        let to_canvas = layout.image_to_canvas();
        let to_image = to_canvas.inverse().unwrap();
        for annotation in &annotations {
            let label = layout.label(annotation.id).unwrap();
            let connector = layout.connector(annotation.id).unwrap();
            let expected_start = to_canvas.apply(nearest_boundary_point(
                annotation,
                to_image.apply(label.connector_anchor),
            ));
            assert!(connector.path.start.distance(expected_start) < 1e-9);
            assert_eq!(connector.path.flatten(1).last(), Some(&label.connector_anchor));
        }
    }

    #[test]
    fn test_connectors_follow_annotation_order() {
        let layout = compute_layout(&sample(), Size::new(800.0, 600.0), &LayoutConfig::default()).unwrap();
        let ids: Vec<u64> = layout.connectors.iter().map(|c| c.annotation_id).collect();
        assert_eq!(ids, vec![1, 2, 3, 4, 5]);
        assert_eq!(layout.connector(3).map(|c| c.side), Some(LabelSide::Right));
    }

    #[test]
    fn test_canvas_includes_margins() {
        let layout = compute_layout(&sample(), Size::new(800.0, 600.0), &LayoutConfig::default()).unwrap();
        assert_eq!(
            layout.canvas_size.width,
            layout.margins.left + 800.0 + layout.margins.right
        );
        assert!(layout.labels.iter().all(|l| l.bounds.x >= 0.0
            && l.bounds.right() <= layout.canvas_size.width + 1e-9));
    }

    #[test]
    fn test_label_at_hits_box() {
        let layout = compute_layout(&sample(), Size::new(800.0, 600.0), &LayoutConfig::default()).unwrap();
        let label = layout.label(1).unwrap();
        let hit = layout.label_at(label.bounds.center()).map(|l| l.annotation_id);
        assert_eq!(hit, Some(1));
        assert!(layout.label_at(Point::new(-5.0, -5.0)).is_none());
    }
}
