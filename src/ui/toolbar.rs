// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Toolbar and tool selection UI.
//!
//! This module provides the toolbar interface for selecting drawing
//! tools and the color used for new annotations.

use crate::editor::controller::{Controller, Tool};
use crate::render::color::parse_color;

/// Result of toolbar interaction.
pub enum ToolbarAction {
    None,
    /// A palette color was picked.
    SetColor(String),
}

fn tool_label(tool: Tool) -> &'static str {
    match tool {
        Tool::Pointer => "⬆ Select",
        Tool::Rectangle => "▭ Rectangle",
        Tool::Circle => "◯ Circle",
        Tool::Dot => "● Dot",
        Tool::Pencil => "✏ Pencil",
    }
}

/// Display the toolbar with tool selection buttons.
pub fn show(ui: &mut egui::Ui, controller: &mut Controller, palette: &[String]) -> ToolbarAction {
    let mut action = ToolbarAction::None;

    ui.horizontal(|ui| {
        ui.spacing_mut().item_spacing.x = 8.0;

        ui.label("Tools:");

        ui.separator();

        for tool in controller.available_tools() {
            if ui
                .selectable_label(controller.tool() == tool, tool_label(tool))
                .clicked()
            {
                controller.set_tool(tool);
            }
        }

        ui.separator();

        for color in palette {
            let Some(rgba) = parse_color(color) else {
                continue;
            };
            let fill = egui::Color32::from_rgba_unmultiplied(rgba.r, rgba.g, rgba.b, rgba.a);
            let (rect, response) =
                ui.allocate_exact_size(egui::vec2(18.0, 18.0), egui::Sense::click());
            ui.painter().rect_filled(rect, 3.0, fill);
            if controller.color().eq_ignore_ascii_case(color) {
                ui.painter()
                    .rect_stroke(rect.expand(2.0), 3.0, egui::Stroke::new(2.0, ui.visuals().strong_text_color()));
            }
            if response.on_hover_text(color).clicked() {
                controller.set_color(color.clone());
                action = ToolbarAction::SetColor(color.clone());
            }
        }

        ui.separator();

        // Tool description
        let tool_text = match controller.tool() {
            Tool::Pointer => "Click to select, drag to move, drag a label to place it",
            Tool::Rectangle | Tool::Circle => "Drag to draw, then type a label",
            Tool::Dot => "Click to drop a dot, then type a label",
            Tool::Pencil => "Drag to draw a freehand stroke",
        };

        ui.label(egui::RichText::new(tool_text).italics().weak());
    });

    action
}
