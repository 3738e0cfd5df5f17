// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Toolkit-independent display list.
//!
//! A [`Scene`] holds everything visible on the canvas in canvas space and
//! paint order. The egui canvas and the SVG exporter both draw from it, so
//! an export contains exactly what the editor shows minus the editing chrome.

use serde::{Deserialize, Serialize};

use super::color::{parse_color_or, Rgba};
use crate::layout::config::LayoutConfig;
use crate::layout::connector::ConnectorPath;
use crate::layout::labels::TextAlign;
use crate::layout::LayoutResult;
use crate::models::annotation::{Annotation, AnnotationDraft, AnnotationId, AnnotationKind, Point, Rect};
use crate::util::geometry::{is_resizable, Handle, Transform};

/// Connector line pattern.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConnectorStyle {
    #[default]
    Solid,
    Dashed,
    Dotted,
}

/// Visual parameters that do not affect layout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderStyle {
    pub connector_style: ConnectorStyle,
    pub connector_width: f64,
    /// Width of the selected annotation's connector.
    pub emphasized_width: f64,
    pub shape_stroke_width: f64,
    pub label_color: String,
    pub placeholder_color: String,
    pub background_color: String,
}

impl Default for RenderStyle {
    fn default() -> Self {
        Self {
            connector_style: ConnectorStyle::Solid,
            connector_width: 1.5,
            emphasized_width: 3.0,
            shape_stroke_width: 3.0,
            label_color: "#1a202c".to_string(),
            placeholder_color: "#a0aec0".to_string(),
            background_color: "#ffffff".to_string(),
        }
    }
}

/// A shape outline, dot or stroke.
#[derive(Debug, Clone, PartialEq)]
pub struct ShapeItem {
    /// `None` for the in-progress preview.
    pub annotation_id: Option<AnnotationId>,
    pub kind: AnnotationKind,
    pub rect: Rect,
    pub points: Vec<Point>,
    pub color: Rgba,
    pub stroke_width: f64,
    pub selected: bool,
}

impl ShapeItem {
    pub fn filled(&self) -> bool {
        self.kind == AnnotationKind::Dot
    }
}

/// One line of label text; `x` is the alignment edge.
#[derive(Debug, Clone, PartialEq)]
pub struct TextLine {
    pub text: String,
    pub x: f64,
    pub top: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LabelItem {
    pub annotation_id: AnnotationId,
    pub bounds: Rect,
    pub lines: Vec<TextLine>,
    pub align: TextAlign,
    pub font_size: f64,
    pub color: Rgba,
    pub placeholder: bool,
    pub selected: bool,
    /// An edit overlay covers this label.
    pub editing: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SceneItem {
    Background {
        rect: Rect,
        color: Rgba,
    },
    Image {
        rect: Rect,
    },
    Connector {
        annotation_id: AnnotationId,
        path: ConnectorPath,
        color: Rgba,
        width: f64,
        style: ConnectorStyle,
    },
    Shape(ShapeItem),
    Badge {
        annotation_id: AnnotationId,
        center: Point,
        radius: f64,
        number: u32,
        fill: Rgba,
        text: Rgba,
    },
    Label(LabelItem),
    Preview(ShapeItem),
    Handle {
        handle: Handle,
        center: Point,
    },
}

/// Editor state that changes what is drawn.
#[derive(Debug, Clone, Default)]
pub struct SceneOptions {
    pub selection: Option<AnnotationId>,
    pub editing: Option<AnnotationId>,
    pub show_handles: bool,
    pub preview: Option<AnnotationDraft>,
}

/// Everything drawn on the canvas, in paint order.
#[derive(Debug, Clone, PartialEq)]
pub struct Scene {
    /// Canvas extent: image plus margins.
    pub width: f64,
    pub height: f64,
    pub items: Vec<SceneItem>,
}

const FALLBACK_COLOR: Rgba = Rgba::rgb(229, 62, 62);

/// Build the display list for the current annotations and layout.
pub fn build_scene(
    annotations: &[Annotation],
    layout: &LayoutResult,
    config: &LayoutConfig,
    style: &RenderStyle,
    options: &SceneOptions,
) -> Scene {
    let to_canvas = layout.image_to_canvas();
    let origin = layout.image_origin();
    let mut items = Vec::with_capacity(annotations.len() * 4 + 2);

    items.push(SceneItem::Background {
        rect: Rect::new(0.0, 0.0, layout.canvas_size.width, layout.canvas_size.height),
        color: parse_color_or(&style.background_color, Rgba::WHITE),
    });
    items.push(SceneItem::Image {
        rect: Rect::new(origin.x, origin.y, layout.image_size.width, layout.image_size.height),
    });

    for annotation in annotations {
        let Some(connector) = layout.connector(annotation.id) else {
            continue;
        };
        let selected = options.selection == Some(annotation.id);
        items.push(SceneItem::Connector {
            annotation_id: annotation.id,
            path: connector.path.clone(),
            color: parse_color_or(&annotation.color, FALLBACK_COLOR),
            width: if selected {
                style.emphasized_width
            } else {
                style.connector_width
            },
            style: style.connector_style,
        });
    }

    for annotation in annotations {
        let selected = options.selection == Some(annotation.id);
        items.push(SceneItem::Shape(shape_item(
            Some(annotation.id),
            annotation.kind,
            annotation.bounds(),
            &annotation.points,
            &annotation.color,
            style.shape_stroke_width,
            selected,
            &to_canvas,
        )));
    }

    // Badges sit on the box corner so they never cover the marked area.
    let badge_radius = (layout.font_size * 0.5).max(8.0);
    for annotation in annotations {
        let fill = parse_color_or(&annotation.color, FALLBACK_COLOR);
        let at = match annotation.kind {
            AnnotationKind::Freehand => annotation.anchor(),
            _ => {
                let bounds = annotation.bounds();
                Point::new(bounds.x, bounds.y)
            }
        };
        items.push(SceneItem::Badge {
            annotation_id: annotation.id,
            center: to_canvas.apply(at),
            radius: badge_radius,
            number: annotation.number,
            fill,
            text: fill.contrasting(),
        });
    }

    let text_color = parse_color_or(&style.label_color, Rgba::BLACK);
    let placeholder_color = parse_color_or(&style.placeholder_color, Rgba::rgb(160, 174, 192));
    for label in &layout.labels {
        let lines = label
            .lines
            .iter()
            .enumerate()
            .map(|(index, text)| TextLine {
                text: text.clone(),
                x: label.text_x,
                top: label.line_top(index, config.label_padding_y),
            })
            .collect();
        items.push(SceneItem::Label(LabelItem {
            annotation_id: label.annotation_id,
            bounds: label.bounds,
            lines,
            align: label.text_align,
            font_size: layout.font_size,
            color: if label.is_placeholder {
                placeholder_color
            } else {
                text_color
            },
            placeholder: label.is_placeholder,
            selected: options.selection == Some(label.annotation_id),
            editing: options.editing == Some(label.annotation_id),
        }));
    }

    if let Some(draft) = &options.preview {
        let rect = Rect::new(draft.position.x, draft.position.y, draft.size.width, draft.size.height);
        items.push(SceneItem::Preview(shape_item(
            None,
            draft.kind,
            rect,
            &draft.points,
            &draft.color,
            style.shape_stroke_width,
            false,
            &to_canvas,
        )));
    }

    if options.show_handles {
        let selected = options
            .selection
            .and_then(|id| annotations.iter().find(|a| a.id == id))
            .filter(|annotation| is_resizable(annotation));
        if let Some(annotation) = selected {
            let bounds = to_canvas.apply_rect(annotation.bounds());
            items.extend(Handle::ALL.into_iter().map(|handle| SceneItem::Handle {
                handle,
                center: handle.position(&bounds),
            }));
        }
    }

    Scene {
        width: layout.canvas_size.width,
        height: layout.canvas_size.height,
        items,
    }
}

#[allow(clippy::too_many_arguments)]
fn shape_item(
    annotation_id: Option<AnnotationId>,
    kind: AnnotationKind,
    bounds: Rect,
    points: &[Point],
    color: &str,
    stroke_width: f64,
    selected: bool,
    to_canvas: &Transform,
) -> ShapeItem {
    ShapeItem {
        annotation_id,
        kind,
        rect: to_canvas.apply_rect(bounds),
        points: points.iter().map(|p| to_canvas.apply(*p)).collect(),
        color: parse_color_or(color, FALLBACK_COLOR),
        stroke_width,
        selected,
    }
}

/// Points approximating an ellipse inscribed in `rect`.
pub fn ellipse_points(rect: Rect, segments: usize) -> Vec<Point> {
    let segments = segments.max(8);
    let center = rect.center();
    let (rx, ry) = (rect.width / 2.0, rect.height / 2.0);
    (0..segments)
        .map(|i| {
            let angle = i as f64 / segments as f64 * std::f64::consts::TAU;
            Point::new(center.x + rx * angle.cos(), center.y + ry * angle.sin())
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::compute_layout;
    use crate::models::annotation::Size;

    fn annotation(id: u64, kind: AnnotationKind, x: f64, text: &str) -> Annotation {
        Annotation {
            id,
            kind,
            number: id as u32,
            position: Point::new(x, 100.0),
            size: Size::new(60.0, 40.0),
            points: Vec::new(),
            color: "#3182ce".to_string(),
            text: text.to_string(),
            label_position: None,
        }
    }

    fn scene(annotations: &[Annotation], options: &SceneOptions) -> Scene {
        let config = LayoutConfig::default();
        let layout = compute_layout(annotations, Size::new(800.0, 600.0), &config).unwrap();
        build_scene(annotations, &layout, &config, &RenderStyle::default(), options)
    }

    fn kinds(scene: &Scene) -> Vec<&'static str> {
        scene
            .items
            .iter()
            .map(|item| match item {
                SceneItem::Background { .. } => "background",
                SceneItem::Image { .. } => "image",
                SceneItem::Connector { .. } => "connector",
                SceneItem::Shape(_) => "shape",
                SceneItem::Badge { .. } => "badge",
                SceneItem::Label(_) => "label",
                SceneItem::Preview(_) => "preview",
                SceneItem::Handle { .. } => "handle",
            })
            .collect()
    }

    #[test]
    fn test_paint_order() {
        let annotations = vec![annotation(1, AnnotationKind::Rectangle, 100.0, "a")];
        let scene = scene(&annotations, &SceneOptions::default());
        assert_eq!(
            kinds(&scene),
            vec!["background", "image", "connector", "shape", "badge", "label"]
        );
    }

    #[test]
    fn test_badge_positions() {
        let mut stroke = annotation(2, AnnotationKind::Freehand, 0.0, "s");
        stroke.points = vec![Point::new(600.0, 300.0), Point::new(650.0, 320.0)];
        let annotations = vec![annotation(1, AnnotationKind::Circle, 100.0, "c"), stroke];
        let config = LayoutConfig::default();
        let layout = compute_layout(&annotations, Size::new(800.0, 600.0), &config).unwrap();
        let scene = build_scene(
            &annotations,
            &layout,
            &config,
            &RenderStyle::default(),
            &SceneOptions::default(),
        );
        let to_canvas = layout.image_to_canvas();
        let badges: Vec<Point> = scene
            .items
            .iter()
            .filter_map(|item| match item {
                SceneItem::Badge { center, .. } => Some(*center),
                _ => None,
            })
            .collect();
        assert_eq!(
            badges,
            vec![
                to_canvas.apply(Point::new(100.0, 100.0)),
                to_canvas.apply(Point::new(600.0, 300.0)),
            ]
        );
    }

    #[test]
    fn test_image_offset_by_margins() {
        let annotations = vec![annotation(1, AnnotationKind::Rectangle, 100.0, "a")];
        let scene = scene(&annotations, &SceneOptions::default());
        let image = scene
            .items
            .iter()
            .find_map(|item| match item {
                SceneItem::Image { rect } => Some(*rect),
                _ => None,
            })
            .unwrap();
        assert!(image.x > 0.0);
        assert_eq!(image.width, 800.0);
        assert_eq!(scene.width, image.x + 800.0 + 48.0);
    }

    #[test]
    fn test_selected_connector_emphasized() {
        let annotations = vec![
            annotation(1, AnnotationKind::Rectangle, 100.0, "a"),
            annotation(2, AnnotationKind::Circle, 600.0, "b"),
        ];
        let options = SceneOptions {
            selection: Some(2),
            ..Default::default()
        };
        let widths: Vec<(u64, f64)> = scene(&annotations, &options)
            .items
            .iter()
            .filter_map(|item| match item {
                SceneItem::Connector {
                    annotation_id, width, ..
                } => Some((*annotation_id, *width)),
                _ => None,
            })
            .collect();
        assert_eq!(widths, vec![(1, 1.5), (2, 3.0)]);
    }

    #[test]
    fn test_placeholder_label_is_muted() {
        let annotations = vec![annotation(1, AnnotationKind::Rectangle, 100.0, "")];
        let scene = scene(&annotations, &SceneOptions::default());
        let label = scene.items.iter().find_map(|item| match item {
            SceneItem::Label(label) => Some(label.clone()),
            _ => None,
        });
        let label = label.unwrap();
        assert!(label.placeholder);
        assert_eq!(label.color, Rgba::rgb(0xa0, 0xae, 0xc0));
        assert_eq!(label.lines[0].text, "Add note…");
    }

    #[test]
    fn test_handles_for_selected_resizable_shape() {
        let annotations = vec![
            annotation(1, AnnotationKind::Rectangle, 100.0, "a"),
            annotation(2, AnnotationKind::Dot, 300.0, "b"),
        ];
        let mut options = SceneOptions {
            selection: Some(1),
            show_handles: true,
            ..Default::default()
        };
        let count = |scene: &Scene| {
            scene
                .items
                .iter()
                .filter(|item| matches!(item, SceneItem::Handle { .. }))
                .count()
        };
        assert_eq!(count(&scene(&annotations, &options)), 8);

        options.selection = Some(2);
        assert_eq!(count(&scene(&annotations, &options)), 0);
    }

    #[test]
    fn test_preview_drawn_above_shapes() {
        let options = SceneOptions {
            preview: Some(AnnotationDraft::shape(
                AnnotationKind::Circle,
                Rect::new(10.0, 10.0, 50.0, 50.0),
                "red",
            )),
            ..Default::default()
        };
        let scene = scene(&[], &options);
        assert_eq!(kinds(&scene), vec!["background", "image", "preview"]);
    }

    #[test]
    fn test_ellipse_points_on_boundary() {
        let rect = Rect::new(0.0, 0.0, 100.0, 50.0);
        for p in ellipse_points(rect, 32) {
            let v = ((p.x - 50.0) / 50.0).powi(2) + ((p.y - 25.0) / 25.0).powi(2);
            assert!((v - 1.0).abs() < 1e-9);
        }
    }
}
