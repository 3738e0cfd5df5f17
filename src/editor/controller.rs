// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Shape interaction controller.
//!
//! One state machine, keyed by the active tool and the current mode, turns
//! pointer and key input into annotation store mutations. Which tools and
//! gestures are available is decided once through [`ControllerBuilder`].
//!
//! Pointer positions are passed in image space. Label hit testing uses the
//! most recent [`LayoutResult`], whose boxes are in canvas space.

use serde::{Deserialize, Serialize};

use crate::layout::LayoutResult;
use crate::models::annotation::{
    Annotation, AnnotationDraft, AnnotationId, AnnotationKind, AnnotationPatch, Point, Rect,
    Size,
};
use crate::models::store::{AnnotationStore, Snapshot};
use crate::util::geometry::{
    hit_handle, point_in_shape, point_near_path, resize_with_handle, Handle,
};

/// Pointer travel (image units) below which a press-release is a click.
const CLICK_SLOP: f64 = 3.0;

/// Current drawing tool selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tool {
    Pointer,
    Rectangle,
    Circle,
    Dot,
    Pencil,
}

impl Tool {
    pub const ALL: [Tool; 5] = [
        Tool::Pointer,
        Tool::Rectangle,
        Tool::Circle,
        Tool::Dot,
        Tool::Pencil,
    ];

    fn kind(self) -> Option<AnnotationKind> {
        match self {
            Tool::Pointer => None,
            Tool::Rectangle => Some(AnnotationKind::Rectangle),
            Tool::Circle => Some(AnnotationKind::Circle),
            Tool::Dot => Some(AnnotationKind::Dot),
            Tool::Pencil => Some(AnnotationKind::Freehand),
        }
    }
}

/// Optional gestures supported by a controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Capabilities {
    pub freehand: bool,
    pub label_dragging: bool,
    pub multiline_labels: bool,
    pub resize: bool,
}

impl Default for Capabilities {
    fn default() -> Self {
        Self {
            freehand: true,
            label_dragging: true,
            multiline_labels: true,
            resize: true,
        }
    }
}

/// Distances and sizes used by gestures, in image units unless noted.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InteractionSettings {
    /// Resize handle hit tolerance, in screen pixels.
    pub handle_tolerance: f64,
    pub min_resize_size: f64,
    /// Drawn rectangles and circles must exceed this on both axes.
    pub min_draw_size: f64,
    pub dot_size: f64,
    /// Stroke proximity for selecting freehand annotations, in screen pixels.
    pub freehand_tolerance: f64,
}

impl Default for InteractionSettings {
    fn default() -> Self {
        Self {
            handle_tolerance: 8.0,
            min_resize_size: 10.0,
            min_draw_size: 5.0,
            dot_size: 14.0,
            freehand_tolerance: 6.0,
        }
    }
}

/// Keys the controller reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyInput {
    Delete,
    Backspace,
    Escape,
    Enter { shift: bool },
}

/// Interaction mode.
#[derive(Debug, Clone)]
pub enum Mode {
    Idle,
    Drawing {
        start: Point,
        current: Point,
        points: Vec<Point>,
    },
    DraggingShape {
        id: AnnotationId,
        grab: Point,
        original: Annotation,
        before: Snapshot,
    },
    DraggingLabel {
        id: AnnotationId,
        grab: Point,
        label_origin: Point,
        moved: bool,
        before: Snapshot,
    },
    Resizing {
        id: AnnotationId,
        handle: Handle,
        original: Rect,
        before: Snapshot,
    },
    EditingLabelText {
        id: AnnotationId,
        buffer: String,
    },
}

/// Builder for a [`Controller`] with a chosen tool set and capabilities.
#[derive(Debug, Clone)]
pub struct ControllerBuilder {
    capabilities: Capabilities,
    settings: InteractionSettings,
    color: String,
}

impl Default for ControllerBuilder {
    fn default() -> Self {
        Self {
            capabilities: Capabilities::default(),
            settings: InteractionSettings::default(),
            color: "#e53e3e".to_string(),
        }
    }
}

impl ControllerBuilder {
    pub fn capabilities(mut self, capabilities: Capabilities) -> Self {
        self.capabilities = capabilities;
        self
    }

    pub fn settings(mut self, settings: InteractionSettings) -> Self {
        self.settings = settings;
        self
    }

    pub fn color(mut self, color: impl Into<String>) -> Self {
        self.color = color.into();
        self
    }

    pub fn build(self) -> Controller {
        Controller {
            capabilities: self.capabilities,
            settings: self.settings,
            color: self.color,
            tool: Tool::Pointer,
            mode: Mode::Idle,
            selection: None,
            view_scale: 1.0,
        }
    }
}

/// Drives draw, select, drag, resize and label-edit gestures.
#[derive(Debug, Clone)]
pub struct Controller {
    capabilities: Capabilities,
    settings: InteractionSettings,
    color: String,
    tool: Tool,
    mode: Mode,
    selection: Option<AnnotationId>,
    /// Screen pixels per image unit.
    view_scale: f64,
}

impl Controller {
    pub fn builder() -> ControllerBuilder {
        ControllerBuilder::default()
    }

    pub fn capabilities(&self) -> Capabilities {
        self.capabilities
    }

    pub fn tool(&self) -> Tool {
        self.tool
    }

    pub fn mode(&self) -> &Mode {
        &self.mode
    }

    pub fn selection(&self) -> Option<AnnotationId> {
        self.selection
    }

    pub fn color(&self) -> &str {
        &self.color
    }

    pub fn set_color(&mut self, color: impl Into<String>) {
        self.color = color.into();
    }

    pub fn set_view_scale(&mut self, scale: f64) {
        if scale > 0.0 {
            self.view_scale = scale;
        }
    }

    pub fn is_tool_available(&self, tool: Tool) -> bool {
        tool != Tool::Pencil || self.capabilities.freehand
    }

    pub fn available_tools(&self) -> Vec<Tool> {
        Tool::ALL
            .into_iter()
            .filter(|&tool| self.is_tool_available(tool))
            .collect()
    }

    /// Switch tools. Only allowed while idle and for available tools.
    pub fn set_tool(&mut self, tool: Tool) -> bool {
        if !self.is_tool_available(tool) || !matches!(self.mode, Mode::Idle) {
            return false;
        }
        self.tool = tool;
        if tool != Tool::Pointer {
            self.selection = None;
        }
        true
    }

    pub fn select(&mut self, id: Option<AnnotationId>) {
        self.selection = id;
    }

    /// A pointer gesture is in progress and wants move/release events.
    pub fn is_gesture_active(&self) -> bool {
        !matches!(self.mode, Mode::Idle | Mode::EditingLabelText { .. })
    }

    pub fn is_editing_text(&self) -> bool {
        matches!(self.mode, Mode::EditingLabelText { .. })
    }

    pub fn editing_id(&self) -> Option<AnnotationId> {
        match &self.mode {
            Mode::EditingLabelText { id, .. } => Some(*id),
            _ => None,
        }
    }


    pub fn edit_buffer_mut(&mut self) -> Option<&mut String> {
        match &mut self.mode {
            Mode::EditingLabelText { buffer, .. } => Some(buffer),
            _ => None,
        }
    }

    /// Shape being drawn, for preview rendering.
    pub fn drawing_preview(&self) -> Option<AnnotationDraft> {
        let Mode::Drawing {
            start,
            current,
            points,
        } = &self.mode
        else {
            return None;
        };
        match self.tool {
            Tool::Rectangle | Tool::Circle => Some(AnnotationDraft::shape(
                self.tool.kind()?,
                Rect::from_corners(*start, *current),
                &self.color,
            )),
            Tool::Dot => Some(AnnotationDraft::dot(*start, self.settings.dot_size, &self.color)),
            Tool::Pencil => Some(AnnotationDraft::freehand(points.clone(), &self.color)),
            Tool::Pointer => None,
        }
    }

    pub fn pointer_down(
        &mut self,
        store: &mut AnnotationStore,
        point: Point,
        layout: Option<&LayoutResult>,
    ) {
        if self.is_editing_text() {
            self.commit_label_edit(store);
        }
        if !matches!(self.mode, Mode::Idle) {
            return;
        }

        if self.tool != Tool::Pointer {
            self.selection = None;
            self.mode = Mode::Drawing {
                start: point,
                current: point,
                points: vec![point],
            };
            return;
        }

        if let Some(mode) = self.try_begin_resize(store, point) {
            self.mode = mode;
            return;
        }

        if let Some(layout) = layout {
            let canvas_point = layout.image_to_canvas().apply(point);
            if let Some(label) = layout.label_at(canvas_point) {
                let id = label.annotation_id;
                self.selection = Some(id);
                let origin = layout.image_origin();
                self.mode = Mode::DraggingLabel {
                    id,
                    grab: point,
                    label_origin: Point::new(label.bounds.x - origin.x, label.bounds.y - origin.y),
                    moved: false,
                    before: store.checkpoint(),
                };
                return;
            }
        }

        match self.pick(store, point) {
            Some(id) => {
                self.selection = Some(id);
                if let Some(annotation) = store.get(id) {
                    self.mode = Mode::DraggingShape {
                        id,
                        grab: point,
                        original: annotation.clone(),
                        before: store.checkpoint(),
                    };
                }
            }
            None => self.selection = None,
        }
    }

    pub fn pointer_move(&mut self, store: &mut AnnotationStore, point: Point) {
        let min_resize = self.settings.min_resize_size;
        let label_dragging = self.capabilities.label_dragging;
        match &mut self.mode {
            Mode::Drawing {
                current, points, ..
            } => {
                *current = point;
                if self.tool == Tool::Pencil && points.last() != Some(&point) {
                    points.push(point);
                }
            }
            Mode::DraggingShape {
                id, grab, original, ..
            } => {
                let (dx, dy) = grab.delta(point);
                store.update_live(*id, &original.translation_patch(dx, dy));
            }
            Mode::DraggingLabel {
                id,
                grab,
                label_origin,
                moved,
                ..
            } => {
                if !label_dragging || (!*moved && grab.distance(point) < CLICK_SLOP) {
                    return;
                }
                *moved = true;
                let (dx, dy) = grab.delta(point);
                let patch = AnnotationPatch {
                    label_position: Some(Some(label_origin.offset(dx, dy))),
                    ..Default::default()
                };
                store.update_live(*id, &patch);
            }
            Mode::Resizing {
                id,
                handle,
                original,
                ..
            } => {
                let rect = resize_with_handle(*original, *handle, point, min_resize);
                let patch = AnnotationPatch {
                    position: Some(Point::new(rect.x, rect.y)),
                    size: Some(Size::new(rect.width, rect.height)),
                    ..Default::default()
                };
                store.update_live(*id, &patch);
            }
            Mode::Idle | Mode::EditingLabelText { .. } => {}
        }
    }

    pub fn pointer_up(&mut self, store: &mut AnnotationStore, point: Point) {
        match std::mem::replace(&mut self.mode, Mode::Idle) {
            Mode::Drawing { start, points, .. } => {
                self.finish_drawing(store, start, point, points);
            }
            Mode::DraggingShape { before, .. } | Mode::Resizing { before, .. } => {
                store.commit(before);
            }
            Mode::DraggingLabel {
                id, moved, before, ..
            } => {
                if moved {
                    store.commit(before);
                } else {
                    self.begin_label_edit(store, id);
                }
            }
            editing @ Mode::EditingLabelText { .. } => self.mode = editing,
            Mode::Idle => {}
        }
    }

    /// Double-clicking a shape edits its label.
    pub fn double_click(&mut self, store: &mut AnnotationStore, point: Point) {
        if self.tool != Tool::Pointer || !matches!(self.mode, Mode::Idle) {
            return;
        }
        if let Some(id) = self.pick(store, point) {
            self.begin_label_edit(store, id);
        }
    }

    /// Handle a key press. Returns true if it was consumed.
    pub fn key(&mut self, store: &mut AnnotationStore, key: KeyInput) -> bool {
        if let Mode::EditingLabelText { buffer, .. } = &mut self.mode {
            return match key {
                KeyInput::Escape => {
                    self.cancel_label_edit();
                    true
                }
                KeyInput::Enter { shift: true } if self.capabilities.multiline_labels => {
                    buffer.push('\n');
                    true
                }
                KeyInput::Enter { .. } => {
                    self.commit_label_edit(store);
                    true
                }
                // Text editing keys belong to the text field.
                KeyInput::Delete | KeyInput::Backspace => false,
            };
        }

        if !matches!(self.mode, Mode::Idle) {
            return false;
        }

        match key {
            KeyInput::Delete | KeyInput::Backspace => self.delete_selected(store),
            KeyInput::Escape => {
                let had_selection = self.selection.is_some();
                self.selection = None;
                had_selection
            }
            KeyInput::Enter { .. } => match self.selection {
                Some(id) => self.begin_label_edit(store, id),
                None => false,
            },
        }
    }

    /// Enter label-edit mode for `id`, starting from its current text.
    pub fn begin_label_edit(&mut self, store: &AnnotationStore, id: AnnotationId) -> bool {
        let Some(annotation) = store.get(id) else {
            return false;
        };
        self.selection = Some(id);
        self.mode = Mode::EditingLabelText {
            id,
            buffer: annotation.text.clone(),
        };
        true
    }

    /// Write the edit buffer to the store and return to idle.
    pub fn commit_label_edit(&mut self, store: &mut AnnotationStore) {
        if let Mode::EditingLabelText { id, buffer } = std::mem::replace(&mut self.mode, Mode::Idle) {
            let changed = store.get(id).is_some_and(|a| a.text != buffer);
            if changed {
                store.update(id, &AnnotationPatch::text(buffer));
            }
        }
    }

    /// Leave label-edit mode without touching the store.
    pub fn cancel_label_edit(&mut self) {
        if self.is_editing_text() {
            self.mode = Mode::Idle;
        }
    }

    pub fn delete_selected(&mut self, store: &mut AnnotationStore) -> bool {
        if self.is_editing_text() {
            return false;
        }
        match self.selection.take() {
            Some(id) => store.delete(id),
            None => false,
        }
    }

    pub fn clear_all(&mut self, store: &mut AnnotationStore) {
        self.mode = Mode::Idle;
        self.selection = None;
        store.clear();
    }

    /// Resynchronize after the store was replaced wholesale (undo, redo, load).
    pub fn sync_with_store(&mut self, store: &AnnotationStore) {
        self.mode = Mode::Idle;
        if let Some(id) = self.selection {
            if store.get(id).is_none() {
                self.selection = None;
            }
        }
    }

    fn try_begin_resize(&self, store: &AnnotationStore, point: Point) -> Option<Mode> {
        if !self.capabilities.resize {
            return None;
        }
        let id = self.selection?;
        let annotation = store.get(id)?;
        let tolerance = self.settings.handle_tolerance / self.view_scale;
        let handle = hit_handle(annotation, point, tolerance)?;
        Some(Mode::Resizing {
            id,
            handle,
            original: annotation.bounds(),
            before: store.checkpoint(),
        })
    }

    /// Topmost annotation under `point`; later annotations win.
    fn pick(&self, store: &AnnotationStore, point: Point) -> Option<AnnotationId> {
        let stroke_tolerance = self.settings.freehand_tolerance / self.view_scale;
        store
            .annotations()
            .iter()
            .rev()
            .find(|annotation| match annotation.kind {
                AnnotationKind::Freehand => {
                    point_near_path(point, &annotation.points, stroke_tolerance)
                }
                _ => point_in_shape(point, annotation),
            })
            .map(|annotation| annotation.id)
    }

    fn finish_drawing(
        &mut self,
        store: &mut AnnotationStore,
        start: Point,
        end: Point,
        mut points: Vec<Point>,
    ) {
        let draft = match self.tool {
            Tool::Rectangle | Tool::Circle => {
                let rect = Rect::from_corners(start, end);
                let min = self.settings.min_draw_size;
                if rect.width <= min || rect.height <= min {
                    log::debug!("Discarded {}x{} shape gesture", rect.width, rect.height);
                    return;
                }
                match self.tool.kind() {
                    Some(kind) => AnnotationDraft::shape(kind, rect, &self.color),
                    None => return,
                }
            }
            Tool::Dot => AnnotationDraft::dot(start, self.settings.dot_size, &self.color),
            Tool::Pencil => {
                if points.last() != Some(&end) {
                    points.push(end);
                }
                if points.len() < 2 {
                    log::debug!("Discarded single-point stroke");
                    return;
                }
                AnnotationDraft::freehand(points, &self.color)
            }
            Tool::Pointer => return,
        };

        let id = store.add(draft);
        self.begin_label_edit(store, id);
    }
}
