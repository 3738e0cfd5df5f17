// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Drawing canvas for the annotated image.
//!
//! This module maps pointer input into image space for the controller,
//! paints the current scene and places the label text editor exactly over
//! the label being edited.

use egui::{Align2, Color32, FontId, Key, Modifiers, Pos2, Sense, Shape, Stroke};

use crate::config::AppConfig;
use crate::editor::controller::{Controller, KeyInput};
use crate::layout::labels::TextAlign;
use crate::layout::{compute_layout, LayoutResult};
use crate::models::annotation::{AnnotationKind, Point, Rect, Size};
use crate::models::store::AnnotationStore;
use crate::render::color::Rgba;
use crate::render::scene::{
    build_scene, ellipse_points, ConnectorStyle, Scene, SceneItem, SceneOptions, ShapeItem,
};
use crate::util::geometry::{to_logical_coords, Transform};

const HANDLE_SIZE: f32 = 8.0;
const MIN_ZOOM: f32 = 0.25;
const MAX_ZOOM: f32 = 8.0;
const SELECTION_COLOR: Color32 = Color32::from_rgb(66, 153, 225);

/// Zoom and pan applied on top of fit-to-viewport.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewState {
    pub zoom: f32,
    pub pan: egui::Vec2,
}

impl Default for ViewState {
    fn default() -> Self {
        Self {
            zoom: 1.0,
            pan: egui::Vec2::ZERO,
        }
    }
}

impl ViewState {
    pub fn zoom_by(&mut self, factor: f32) {
        self.zoom = (self.zoom * factor).clamp(MIN_ZOOM, MAX_ZOOM);
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Canvas-to-screen transform for a canvas of `canvas_size` shown in `viewport`.
    fn canvas_to_screen(&self, canvas_size: Size, viewport: egui::Rect) -> Transform {
        let center = viewport.center() + self.pan;
        let zoomed = egui::Rect::from_center_size(center, viewport.size() * self.zoom);
        Transform::fit(canvas_size, to_rect(zoomed))
    }
}

/// Everything the canvas reads or drives for one frame.
pub struct Canvas<'a> {
    pub store: &'a mut AnnotationStore,
    pub controller: &'a mut Controller,
    pub config: &'a AppConfig,
    pub texture: &'a egui::TextureHandle,
    pub image_size: Size,
    pub view: &'a mut ViewState,
}

/// Display the canvas and route pointer and label-editing input.
pub fn show(ui: &mut egui::Ui, canvas: Canvas<'_>) {
    let Canvas {
        store,
        controller,
        config,
        texture,
        image_size,
        view,
    } = canvas;

    let viewport = ui.available_rect_before_wrap();
    let response = ui.allocate_rect(viewport, Sense::click_and_drag());

    let Some(layout) = compute_layout(store.annotations(), image_size, &config.layout) else {
        ui.painter().text(
            viewport.center(),
            Align2::CENTER_CENTER,
            "Image has no usable size",
            FontId::proportional(16.0),
            Color32::from_gray(200),
        );
        return;
    };

    handle_view_input(ui, &response, view);
    let canvas_to_screen = view.canvas_to_screen(layout.canvas_size, viewport);
    let image_to_screen = layout.image_to_canvas().then(&canvas_to_screen);
    controller.set_view_scale(image_to_screen.min_scale());

    handle_pointer(ui, &response, store, controller, &layout, &image_to_screen);

    // Input may have changed the annotations; lay out again before painting.
    let Some(layout) = compute_layout(store.annotations(), image_size, &config.layout) else {
        return;
    };
    let canvas_to_screen = view.canvas_to_screen(layout.canvas_size, viewport);
    let options = SceneOptions {
        selection: controller.selection(),
        editing: controller.editing_id(),
        show_handles: controller.capabilities().resize && !controller.is_editing_text(),
        preview: controller.drawing_preview(),
    };
    let scene = build_scene(
        store.annotations(),
        &layout,
        &config.layout,
        &config.render,
        &options,
    );

    let painter = ui.painter_at(viewport);
    paint_scene(&painter, &scene, texture, &canvas_to_screen);

    if controller.is_editing_text() {
        show_label_editor(ui, store, controller, &layout, &config.layout.placeholder, &canvas_to_screen);
    }
}

fn handle_view_input(ui: &egui::Ui, response: &egui::Response, view: &mut ViewState) {
    if response.dragged_by(egui::PointerButton::Secondary)
        || response.dragged_by(egui::PointerButton::Middle)
    {
        view.pan += response.drag_delta();
    }
    if response.hovered() {
        let zoom_delta = ui.input(|i| i.zoom_delta());
        if zoom_delta != 1.0 {
            view.zoom_by(zoom_delta);
        }
    }
}

fn handle_pointer(
    ui: &egui::Ui,
    response: &egui::Response,
    store: &mut AnnotationStore,
    controller: &mut Controller,
    layout: &LayoutResult,
    image_to_screen: &Transform,
) {
    let (pressed, released, double_clicked, position) = ui.input(|i| {
        (
            i.pointer.primary_pressed(),
            i.pointer.primary_released(),
            i.pointer.button_double_clicked(egui::PointerButton::Primary),
            i.pointer.interact_pos(),
        )
    });
    let Some(point) = position.and_then(|pos| to_logical_coords(to_point(pos), image_to_screen))
    else {
        return;
    };

    if pressed && response.hovered() {
        controller.pointer_down(store, point, Some(layout));
    }
    if controller.is_gesture_active() {
        controller.pointer_move(store, point);
        ui.ctx().request_repaint();
    }
    if released {
        controller.pointer_up(store, point);
    }
    if double_clicked && response.hovered() {
        controller.double_click(store, point);
    }
}

/// Text field laid over the label being edited.
fn show_label_editor(
    ui: &mut egui::Ui,
    store: &mut AnnotationStore,
    controller: &mut Controller,
    layout: &LayoutResult,
    placeholder: &str,
    canvas_to_screen: &Transform,
) {
    let Some(label) = controller.editing_id().and_then(|id| layout.label(id)) else {
        return;
    };
    let scale = canvas_to_screen.min_scale() as f32;
    let mut rect = to_egui_rect(canvas_to_screen.apply_rect(label.bounds));
    rect.set_width(rect.width().max(160.0));
    rect.set_height(rect.height().max(layout.font_size as f32 * scale * 1.5));
    let align = match label.text_align {
        TextAlign::Left => egui::Align::LEFT,
        TextAlign::Right => egui::Align::RIGHT,
    };

    let multiline = controller.capabilities().multiline_labels;
    let shift_held = ui.input(|i| i.modifiers.shift);
    let commit = !(multiline && shift_held)
        && ui.input_mut(|i| i.consume_key(Modifiers::NONE, Key::Enter));
    let cancel = ui.input_mut(|i| i.consume_key(Modifiers::NONE, Key::Escape));

    let Some(buffer) = controller.edit_buffer_mut() else {
        return;
    };
    let editor = if multiline {
        egui::TextEdit::multiline(buffer)
    } else {
        egui::TextEdit::singleline(buffer)
    };
    let response = ui.put(
        rect,
        editor
            .id(egui::Id::new("label_editor"))
            .font(FontId::proportional(layout.font_size as f32 * scale))
            .horizontal_align(align)
            .desired_width(rect.width())
            .hint_text(placeholder),
    );
    let blurred = response.lost_focus();
    if !response.has_focus() && !blurred {
        response.request_focus();
    }

    if cancel {
        controller.key(store, KeyInput::Escape);
    } else if commit {
        controller.key(store, KeyInput::Enter { shift: false });
    } else if blurred {
        controller.commit_label_edit(store);
    }
}

fn paint_scene(
    painter: &egui::Painter,
    scene: &Scene,
    texture: &egui::TextureHandle,
    to_screen: &Transform,
) {
    let scale = to_screen.min_scale() as f32;
    let pos = |p: Point| to_pos(to_screen.apply(p));

    for item in &scene.items {
        match item {
            SceneItem::Background { rect, color } => {
                painter.rect_filled(to_egui_rect(to_screen.apply_rect(*rect)), 0.0, to_color(*color));
            }
            SceneItem::Image { rect } => {
                painter.image(
                    texture.id(),
                    to_egui_rect(to_screen.apply_rect(*rect)),
                    egui::Rect::from_min_max(egui::pos2(0.0, 0.0), egui::pos2(1.0, 1.0)),
                    Color32::WHITE,
                );
            }
            SceneItem::Connector {
                path,
                color,
                width,
                style,
                ..
            } => {
                let steps = if path.has_curve() { 16 } else { 1 };
                let points: Vec<Pos2> = path.flatten(steps).into_iter().map(pos).collect();
                let width = *width as f32 * scale;
                let color = to_color(*color);
                match style {
                    ConnectorStyle::Solid => {
                        painter.add(Shape::line(points, Stroke::new(width, color)));
                    }
                    ConnectorStyle::Dashed => {
                        painter.extend(Shape::dashed_line(
                            &points,
                            Stroke::new(width, color),
                            width * 4.0,
                            width * 3.0,
                        ));
                    }
                    ConnectorStyle::Dotted => {
                        painter.extend(Shape::dotted_line(&points, color, width * 2.5, width / 2.0));
                    }
                }
            }
            SceneItem::Shape(shape) => paint_shape(painter, shape, to_screen, 255),
            SceneItem::Preview(shape) => paint_shape(painter, shape, to_screen, 160),
            SceneItem::Badge {
                center,
                radius,
                number,
                fill,
                text,
                ..
            } => {
                let radius = *radius as f32 * scale;
                painter.circle_filled(pos(*center), radius, to_color(*fill));
                painter.text(
                    pos(*center),
                    Align2::CENTER_CENTER,
                    number.to_string(),
                    FontId::proportional(radius * 1.1),
                    to_color(*text),
                );
            }
            SceneItem::Label(label) => {
                let bounds = to_egui_rect(to_screen.apply_rect(label.bounds));
                if label.selected {
                    painter.rect_filled(bounds, 4.0, SELECTION_COLOR.gamma_multiply(0.15));
                }
                if label.editing {
                    continue;
                }
                let anchor = match label.align {
                    TextAlign::Left => Align2::LEFT_TOP,
                    TextAlign::Right => Align2::RIGHT_TOP,
                };
                let font = FontId::proportional(label.font_size as f32 * scale);
                for line in &label.lines {
                    painter.text(
                        pos(Point::new(line.x, line.top)),
                        anchor,
                        &line.text,
                        font.clone(),
                        to_color(label.color),
                    );
                }
            }
            SceneItem::Handle { center, .. } => {
                let rect = egui::Rect::from_center_size(pos(*center), egui::vec2(HANDLE_SIZE, HANDLE_SIZE));
                painter.rect_filled(rect, 1.0, Color32::WHITE);
                painter.rect_stroke(rect, 1.0, Stroke::new(1.0, SELECTION_COLOR));
            }
        }
    }
}

fn paint_shape(painter: &egui::Painter, shape: &ShapeItem, to_screen: &Transform, alpha: u8) {
    let scale = to_screen.min_scale() as f32;
    let color = to_color(shape.color.with_alpha(alpha.min(shape.color.a)));
    let stroke = Stroke::new(shape.stroke_width as f32 * scale, color);
    let screen_rect = to_screen.apply_rect(shape.rect);

    match shape.kind {
        AnnotationKind::Rectangle => {
            painter.rect_stroke(to_egui_rect(screen_rect), 0.0, stroke);
        }
        AnnotationKind::Circle => {
            let points = ellipse_points(screen_rect, 64).into_iter().map(to_pos).collect();
            painter.add(Shape::closed_line(points, stroke));
        }
        AnnotationKind::Dot => {
            let points = ellipse_points(screen_rect, 24).into_iter().map(to_pos).collect();
            painter.add(Shape::convex_polygon(points, color, Stroke::NONE));
        }
        AnnotationKind::Freehand => {
            let points: Vec<Pos2> = shape
                .points
                .iter()
                .map(|p| to_pos(to_screen.apply(*p)))
                .collect();
            painter.add(Shape::line(points, stroke));
        }
    }

    if shape.selected {
        let outline = to_egui_rect(screen_rect).expand(4.0);
        painter.extend(Shape::dashed_line(
            &[
                outline.left_top(),
                outline.right_top(),
                outline.right_bottom(),
                outline.left_bottom(),
                outline.left_top(),
            ],
            Stroke::new(1.0, SELECTION_COLOR),
            4.0,
            3.0,
        ));
    }
}

fn to_point(pos: Pos2) -> Point {
    Point::new(f64::from(pos.x), f64::from(pos.y))
}

fn to_pos(point: Point) -> Pos2 {
    egui::pos2(point.x as f32, point.y as f32)
}

fn to_rect(rect: egui::Rect) -> Rect {
    Rect::new(
        f64::from(rect.min.x),
        f64::from(rect.min.y),
        f64::from(rect.width()),
        f64::from(rect.height()),
    )
}

fn to_egui_rect(rect: Rect) -> egui::Rect {
    egui::Rect::from_min_max(
        to_pos(Point::new(rect.x, rect.y)),
        to_pos(Point::new(rect.right(), rect.bottom())),
    )
}

fn to_color(color: Rgba) -> Color32 {
    Color32::from_rgba_unmultiplied(color.r, color.g, color.b, color.a)
}
