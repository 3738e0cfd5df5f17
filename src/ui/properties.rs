// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Annotation list panel.
//!
//! Lists annotations by display number with their kind and label text,
//! and lets the user select, edit or delete them.

use crate::models::annotation::AnnotationId;
use crate::models::store::AnnotationStore;

/// Result of panel interaction.
pub enum PropertiesAction {
    None,
    SelectAnnotation(AnnotationId),
    EditLabel(AnnotationId),
    DeleteAnnotation(AnnotationId),
}

/// Display the annotation list.
pub fn show(
    ui: &mut egui::Ui,
    store: &AnnotationStore,
    selection: Option<AnnotationId>,
) -> PropertiesAction {
    let mut action = PropertiesAction::None;

    ui.heading("Annotations");
    ui.separator();

    if store.is_empty() {
        ui.label(egui::RichText::new("Nothing annotated yet").weak());
        return action;
    }

    egui::ScrollArea::vertical().show(ui, |ui| {
        for annotation in store.annotations() {
            let selected = selection == Some(annotation.id);
            let text = if annotation.text.is_empty() {
                egui::RichText::new("(no label)").italics().weak()
            } else {
                egui::RichText::new(annotation.text.replace('\n', " "))
            };

            ui.horizontal(|ui| {
                let heading = format!("{}. {}", annotation.number, annotation.kind.name());
                if ui.selectable_label(selected, heading).clicked() {
                    action = PropertiesAction::SelectAnnotation(annotation.id);
                }
                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    if ui.small_button("🗑").on_hover_text("Delete").clicked() {
                        action = PropertiesAction::DeleteAnnotation(annotation.id);
                    }
                    if ui.small_button("✏").on_hover_text("Edit label").clicked() {
                        action = PropertiesAction::EditLabel(annotation.id);
                    }
                });
            });
            ui.label(text);
            ui.add_space(4.0);
        }
    });

    ui.separator();
    ui.label(format!("{} annotations", store.len()));

    action
}
