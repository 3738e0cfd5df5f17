// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Label placement in the canvas margins.
//!
//! Labels are assigned to the left or right margin by their shape's anchor,
//! stacked per side in anchor order without overlap, and the margins are
//! sized to fit the widest label on each side. All output coordinates are
//! in canvas space, where the image's top-left sits at
//! `(margins.left, margins.top)`.

use super::config::LayoutConfig;
use super::text::{wrap_label, TextMeasure};
use crate::models::annotation::{Annotation, AnnotationId, LabelSide, Point, Rect, Size};

/// Horizontal alignment of label text relative to `text_x`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextAlign {
    Left,
    Right,
}

/// Space added around the image.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Margins {
    pub left: f64,
    pub right: f64,
    pub top: f64,
    pub bottom: f64,
}

/// Computed geometry of one annotation's label.
#[derive(Debug, Clone, PartialEq)]
pub struct LabelPlacement {
    pub annotation_id: AnnotationId,
    pub number: u32,
    /// Side from the anchor position; drives margin sizing.
    pub side: LabelSide,
    /// Side the connector attaches to; differs from `side` only for dragged labels.
    pub anchor_side: LabelSide,
    /// Placed from a user-dragged position instead of the stacking pass.
    pub manual: bool,
    pub lines: Vec<String>,
    pub is_placeholder: bool,
    pub bounds: Rect,
    pub text_x: f64,
    pub text_align: TextAlign,
    pub line_height: f64,
    /// Where the connector ends: middle of the box edge facing the image.
    pub connector_anchor: Point,
}

impl LabelPlacement {
    /// Baseline-independent top of line `index`.
    pub fn line_top(&self, index: usize, padding_y: f64) -> f64 {
        self.bounds.y + padding_y + index as f64 * self.line_height
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct LabelLayout {
    pub margins: Margins,
    pub labels: Vec<LabelPlacement>,
}

struct Pending {
    placement: LabelPlacement,
    anchor: Point,
}

/// Place every annotation's label around an image of `image` size.
pub fn place_labels(
    annotations: &[Annotation],
    image: Size,
    font_size: f64,
    config: &LayoutConfig,
) -> LabelLayout {
    if annotations.is_empty() {
        return LabelLayout {
            margins: Margins::default(),
            labels: Vec::new(),
        };
    }

    let measure = TextMeasure::new(font_size, config);
    let mut pending: Vec<Pending> = annotations
        .iter()
        .map(|annotation| measure_label(annotation, image, &measure, config))
        .collect();

    let mut margins = side_margins(&pending, config);
    let canvas_width = margins.left + image.width + margins.right;
    let top_bound = margins.top;
    let bottom_bound = margins.top + image.height;

    for item in pending.iter_mut() {
        let placement = &mut item.placement;
        let width = placement.bounds.width;
        let height = placement.bounds.height;
        placement.bounds.x = match placement.side {
            LabelSide::Left => config.edge_padding,
            LabelSide::Right => canvas_width - config.edge_padding - width,
        };
        let natural = margins.top + item.anchor.y - height / 2.0;
        placement.bounds.y = natural.min(bottom_bound - height).max(top_bound);
    }

    for side in [LabelSide::Left, LabelSide::Right] {
        stack_side(&mut pending, side, bottom_bound, config.min_gap);
    }
    grow_top_margin(&mut pending, &mut margins);

    let image_mid = margins.left + image.width / 2.0;
    let labels = pending
        .into_iter()
        .zip(annotations)
        .map(|(item, annotation)| {
            let mut placement = item.placement;
            if let Some(position) = annotation.label_position {
                placement.bounds.x = margins.left + position.x;
                placement.bounds.y = margins.top + position.y;
                placement.anchor_side = if placement.bounds.center().x < image_mid {
                    LabelSide::Left
                } else {
                    LabelSide::Right
                };
            }
            finish_placement(&mut placement, config);
            placement
        })
        .collect();

    LabelLayout { margins, labels }
}

fn measure_label(
    annotation: &Annotation,
    image: Size,
    measure: &TextMeasure,
    config: &LayoutConfig,
) -> Pending {
    let wrapped = wrap_label(&annotation.text, config.words_per_line, &config.placeholder);
    let width = measure.widest(&wrapped.lines) + 2.0 * config.label_padding_x;
    let height = measure.block_height(wrapped.lines.len()) + 2.0 * config.label_padding_y;
    let side = annotation.auto_side(image.width);
    Pending {
        placement: LabelPlacement {
            annotation_id: annotation.id,
            number: annotation.number,
            side,
            anchor_side: side,
            manual: annotation.label_position.is_some(),
            lines: wrapped.lines,
            is_placeholder: wrapped.is_placeholder,
            bounds: Rect::new(0.0, 0.0, width, height),
            text_x: 0.0,
            text_align: TextAlign::Left,
            line_height: measure.line_height(),
            connector_anchor: Point::ZERO,
        },
        anchor: annotation.anchor(),
    }
}

/// Widest box per side plus paddings; a side without labels keeps only the buffer.
fn side_margins(pending: &[Pending], config: &LayoutConfig) -> Margins {
    let widest = |side: LabelSide| {
        pending
            .iter()
            .filter(|item| item.placement.side == side)
            .map(|item| item.placement.bounds.width)
            .reduce(f64::max)
    };
    let side_margin = |side| match widest(side) {
        Some(width) => width + config.edge_padding + config.margin_buffer,
        None => config.margin_buffer,
    };
    Margins {
        left: side_margin(LabelSide::Left),
        right: side_margin(LabelSide::Right),
        top: config.vertical_margin,
        bottom: config.vertical_margin,
    }
}

/// Push overlapping labels down in anchor order, then lift the whole side
/// if the last label runs past `bottom_bound`. Dragged labels are skipped.
fn stack_side(pending: &mut [Pending], side: LabelSide, bottom_bound: f64, min_gap: f64) {
    let mut order: Vec<usize> = (0..pending.len())
        .filter(|&i| pending[i].placement.side == side && !pending[i].placement.manual)
        .collect();
    order.sort_by(|&a, &b| {
        pending[a]
            .anchor
            .y
            .total_cmp(&pending[b].anchor.y)
            .then(pending[a].placement.number.cmp(&pending[b].placement.number))
    });

    let mut previous_bottom: Option<f64> = None;
    for &i in &order {
        let bounds = &mut pending[i].placement.bounds;
        if let Some(floor) = previous_bottom {
            bounds.y = bounds.y.max(floor + min_gap);
        }
        previous_bottom = Some(bounds.bottom());
    }

    if let Some(last_bottom) = previous_bottom {
        let overflow = last_bottom - bottom_bound;
        if overflow > 0.0 {
            for &i in &order {
                pending[i].placement.bounds.y -= overflow;
            }
        }
    }
}

/// A lifted stack can start above the canvas; push the image and every
/// stacked label down until the highest box sits at the canvas top.
fn grow_top_margin(pending: &mut [Pending], margins: &mut Margins) {
    let highest = pending
        .iter()
        .filter(|item| !item.placement.manual)
        .map(|item| item.placement.bounds.y)
        .reduce(f64::min);
    let Some(highest) = highest.filter(|y| *y < 0.0) else {
        return;
    };
    margins.top -= highest;
    for item in pending.iter_mut().filter(|item| !item.placement.manual) {
        item.placement.bounds.y -= highest;
    }
}

fn finish_placement(placement: &mut LabelPlacement, config: &LayoutConfig) {
    let bounds = placement.bounds;
    let center_y = bounds.center().y;
    match placement.anchor_side {
        LabelSide::Left => {
            placement.text_align = TextAlign::Left;
            placement.text_x = bounds.x + config.label_padding_x;
            placement.connector_anchor = Point::new(bounds.right(), center_y);
        }
        LabelSide::Right => {
            placement.text_align = TextAlign::Right;
            placement.text_x = bounds.right() - config.label_padding_x;
            placement.connector_anchor = Point::new(bounds.x, center_y);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::annotation::AnnotationKind;

    fn annotation(id: u64, center: Point, text: &str) -> Annotation {
        Annotation {
            id,
            kind: AnnotationKind::Rectangle,
            number: id as u32,
            position: Point::new(center.x - 10.0, center.y - 10.0),
            size: Size::new(20.0, 20.0),
            points: Vec::new(),
            color: "#3182ce".to_string(),
            text: text.to_string(),
            label_position: None,
        }
    }

    fn image() -> Size {
        Size::new(800.0, 600.0)
    }

    #[test]
    fn test_no_annotations_no_margins() {
        let layout = place_labels(&[], image(), 20.0, &LayoutConfig::default());
        assert_eq!(layout.margins, Margins::default());
        assert!(layout.labels.is_empty());
    }

    #[test]
    fn test_side_assignment() {
        let annotations = vec![
            annotation(1, Point::new(100.0, 300.0), "left"),
            annotation(2, Point::new(700.0, 300.0), "right"),
        ];
        let layout = place_labels(&annotations, image(), 20.0, &LayoutConfig::default());
        assert_eq!(layout.labels[0].side, LabelSide::Left);
        assert_eq!(layout.labels[1].side, LabelSide::Right);
        assert_eq!(layout.labels[0].text_align, TextAlign::Left);
        assert_eq!(layout.labels[1].text_align, TextAlign::Right);
    }

    #[test]
    fn test_one_sided_margin_collapses_to_buffer() {
        let config = LayoutConfig::default();
        let annotations = vec![annotation(1, Point::new(100.0, 300.0), "only left")];
        let layout = place_labels(&annotations, image(), 20.0, &config);
        assert_eq!(layout.margins.right, config.margin_buffer);
        assert!(layout.margins.left > config.margin_buffer);
    }

    #[test]
    fn test_margin_fits_widest_line() {
        let config = LayoutConfig::default();
        let font_size = 20.0;
        let annotations = vec![
            annotation(1, Point::new(100.0, 100.0), "a fairly long label sentence here"),
            annotation(2, Point::new(100.0, 400.0), "short"),
        ];
        let layout = place_labels(&annotations, image(), font_size, &config);
        let measure = TextMeasure::new(font_size, &config);
        let widest = measure.line_width("a fairly long label sentence here");
        assert!(layout.margins.left >= widest + 2.0 * config.label_padding_x);
        for label in &layout.labels {
            assert!(label.bounds.x >= 0.0);
            assert!(label.text_x - config.label_padding_x >= 0.0);
            assert!(label.bounds.right() <= layout.margins.left - config.margin_buffer + 1e-9);
        }
    }

    #[test]
    fn test_dense_labels_stack_without_overlap() {
        let config = LayoutConfig::default();
        let annotations: Vec<Annotation> = (0..12)
            .map(|i| annotation(i + 1, Point::new(100.0, 580.0 - i as f64), "dense label"))
            .collect();
        let layout = place_labels(&annotations, image(), 20.0, &config);

        let mut boxes: Vec<Rect> = layout.labels.iter().map(|l| l.bounds).collect();
        boxes.sort_by(|a, b| a.y.total_cmp(&b.y));
        for pair in boxes.windows(2) {
            assert!(pair[1].y >= pair[0].bottom() + config.min_gap - 1e-9);
        }
        let bottom_bound = layout.margins.top + 600.0;
        assert!(boxes.iter().all(|b| b.bottom() <= bottom_bound + 1e-9));
    }

    #[test]
    fn test_overfull_side_grows_top_margin() {
        let config = LayoutConfig::default();
        let annotations: Vec<Annotation> = (0..20)
            .map(|i| annotation(i + 1, Point::new(100.0, 560.0 + i as f64), "dense label"))
            .collect();
        let layout = place_labels(&annotations, image(), 20.0, &config);
        assert!(layout.margins.top > config.vertical_margin);

        let canvas_height = layout.margins.top + 600.0 + layout.margins.bottom;
        let mut boxes: Vec<Rect> = layout.labels.iter().map(|l| l.bounds).collect();
        boxes.sort_by(|a, b| a.y.total_cmp(&b.y));
        assert!(boxes[0].y.abs() < 1e-9);
        assert!(boxes.iter().all(|b| b.bottom() <= canvas_height + 1e-9));
        for pair in boxes.windows(2) {
            assert!(pair[1].y >= pair[0].bottom() + config.min_gap - 1e-9);
        }
    }

    #[test]
    fn test_overfull_side_keeps_manual_label_on_image() {
        let config = LayoutConfig::default();
        let mut annotations: Vec<Annotation> = (0..20)
            .map(|i| annotation(i + 1, Point::new(100.0, 560.0 + i as f64), "dense label"))
            .collect();
        let mut dragged = annotation(21, Point::new(700.0, 100.0), "dragged");
        dragged.label_position = Some(Point::new(500.0, 40.0));
        annotations.push(dragged);

        let layout = place_labels(&annotations, image(), 20.0, &config);
        let manual = layout.labels.last().unwrap();
        assert_eq!(manual.bounds.y, layout.margins.top + 40.0);
    }

    #[test]
    fn test_stacking_preserves_anchor_order() {
        let annotations = vec![
            annotation(1, Point::new(100.0, 300.0), "lower"),
            annotation(2, Point::new(120.0, 290.0), "upper"),
        ];
        let layout = place_labels(&annotations, image(), 20.0, &LayoutConfig::default());
        assert!(layout.labels[1].bounds.y < layout.labels[0].bounds.y);
    }

    #[test]
    fn test_label_centered_on_anchor_when_free() {
        let config = LayoutConfig::default();
        let annotations = vec![annotation(1, Point::new(600.0, 300.0), "centered")];
        let layout = place_labels(&annotations, image(), 20.0, &config);
        let label = &layout.labels[0];
        assert!((label.bounds.center().y - (config.vertical_margin + 300.0)).abs() < 1e-9);
        let canvas_width = layout.margins.left + 800.0 + layout.margins.right;
        assert!((label.bounds.right() - (canvas_width - config.edge_padding)).abs() < 1e-9);
        assert_eq!(label.connector_anchor, Point::new(label.bounds.x, label.bounds.center().y));
    }

    #[test]
    fn test_manual_label_keeps_auto_side_for_margins() {
        let config = LayoutConfig::default();
        let mut dragged = annotation(1, Point::new(100.0, 300.0), "dragged right");
        dragged.label_position = Some(Point::new(850.0, 40.0));
        let layout = place_labels(&[dragged], image(), 20.0, &config);
        let label = &layout.labels[0];
        assert!(label.manual);
        assert_eq!(label.side, LabelSide::Left);
        assert_eq!(label.anchor_side, LabelSide::Right);
        assert_eq!(label.bounds.x, layout.margins.left + 850.0);
        assert_eq!(label.bounds.y, layout.margins.top + 40.0);
        assert_eq!(layout.margins.right, config.margin_buffer);
    }

    #[test]
    fn test_placeholder_for_empty_text() {
        let config = LayoutConfig::default();
        let layout = place_labels(&[annotation(1, Point::new(10.0, 10.0), "")], image(), 20.0, &config);
        assert!(layout.labels[0].is_placeholder);
        assert_eq!(layout.labels[0].lines, vec![config.placeholder.clone()]);
    }
}
