// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Main application state and egui App implementation.
//!
//! This module contains the main application structure that implements
//! the egui::App trait, managing the overall application state and
//! coordinating between the UI components, the controller and the store.

use std::path::{Path, PathBuf};
use std::sync::mpsc::{channel, Receiver};

use anyhow::{Context, Result};

use crate::config::AppConfig;
use crate::editor::controller::{Controller, KeyInput};
use crate::io::media::{load_image, thumbnail_data_uri, LoadedImage};
use crate::io::{serialization, svg};
use crate::layout::compute_layout;
use crate::models::annotation::{AnnotationPatch, Size};
use crate::models::project::ProjectData;
use crate::models::store::AnnotationStore;
use crate::render::scene::{build_scene, SceneOptions};
use crate::ui::canvas::{self, Canvas, ViewState};
use crate::ui::{properties, toolbar};

const THUMBNAIL_SIZE: u32 = 256;

/// Result of background image loading operation.
struct LoadedImageData {
    image: LoadedImage,
    project: ProjectData,
}

/// Main application state.
pub struct MarginaliaApp {
    config: AppConfig,

    /// Annotations with undo/redo history
    store: AnnotationStore,

    /// Tool, selection and gesture state
    controller: Controller,

    /// Current project data (if an image is loaded)
    project: Option<ProjectData>,

    /// Decoded image, kept for export
    image: Option<LoadedImage>,

    /// Loaded image texture for display
    image_texture: Option<egui::TextureHandle>,

    view: ViewState,

    /// Receiver for background image loading
    image_loader: Option<Receiver<Result<LoadedImageData, String>>>,

    /// Loading state message
    loading_message: Option<String>,

    /// Last error or notice shown in the status bar
    status: Option<String>,
}

impl Default for MarginaliaApp {
    fn default() -> Self {
        Self::new(AppConfig::default())
    }
}

impl MarginaliaApp {
    /// Create a new application instance.
    pub fn new(config: AppConfig) -> Self {
        Self {
            store: config.editor.store(),
            controller: config.editor.controller(),
            config,
            project: None,
            image: None,
            image_texture: None,
            view: ViewState::default(),
            image_loader: None,
            loading_message: None,
            status: None,
        }
    }

    fn report_error(&mut self, what: &str, error: &anyhow::Error) {
        log::error!("{}: {:#}", what, error);
        self.status = Some(format!("{}: {:#}", what, error));
    }

    fn image_size(&self) -> Option<Size> {
        self.image
            .as_ref()
            .map(|image| Size::new(f64::from(image.width), f64::from(image.height)))
    }

    fn undo(&mut self) {
        if self.store.undo() {
            self.controller.sync_with_store(&self.store);
        }
    }

    fn redo(&mut self) {
        if self.store.redo() {
            self.controller.sync_with_store(&self.store);
        }
    }

    fn delete_selected(&mut self) {
        self.controller.delete_selected(&mut self.store);
    }

    fn clear_all(&mut self) {
        self.controller.clear_all(&mut self.store);
    }

    /// Save the project to a YAML or JSON file.
    fn save_project(&mut self, path: PathBuf) {
        let Some(project) = self.project.as_mut() else {
            return;
        };
        project.set_annotations(self.store.current_state());
        if let Some(image) = &self.image {
            match thumbnail_data_uri(image, THUMBNAIL_SIZE) {
                Ok(uri) => project.thumbnail = Some(uri),
                Err(e) => log::warn!("Skipping thumbnail: {:#}", e),
            }
        }

        let result = serialization::save_project(project, &path);
        match result {
            Ok(()) => self.status = Some(format!("Saved {}", path.display())),
            Err(e) => self.report_error("Failed to save project", &e),
        }
    }

    /// Export the annotated image as a standalone SVG.
    fn export_svg(&mut self, path: PathBuf) {
        let result = self.write_svg(&path);
        match result {
            Ok(()) => self.status = Some(format!("Exported {}", path.display())),
            Err(e) => self.report_error("Failed to export SVG", &e),
        }
    }

    fn write_svg(&self, path: &Path) -> Result<()> {
        let image = self.image.as_ref().context("No image loaded")?;
        let image_size = Size::new(f64::from(image.width), f64::from(image.height));
        let layout = compute_layout(self.store.annotations(), image_size, &self.config.layout)
            .context("Image is too small to lay out labels")?;
        let scene = build_scene(
            self.store.annotations(),
            &layout,
            &self.config.layout,
            &self.config.render,
            &SceneOptions::default(),
        );
        svg::export_svg(&scene, &image.data_uri(), path)
    }

    /// Load a project file and the image it references (asynchronously).
    fn open_project(&mut self, path: PathBuf) {
        let (sender, receiver) = channel();
        self.image_loader = Some(receiver);
        self.loading_message = Some("Loading project and image...".to_string());

        // Spawn background thread for loading
        std::thread::spawn(move || {
            let result = (|| -> Result<LoadedImageData> {
                let project = serialization::load_project(&path)?;

                // Relative image paths are relative to the project file
                let mut image_path = PathBuf::from(&project.image);
                if image_path.is_relative() {
                    if let Some(dir) = path.parent() {
                        image_path = dir.join(image_path);
                    }
                }
                let image = load_image(&image_path)?;
                log::info!("Loaded image: {}", image_path.display());

                Ok(LoadedImageData { image, project })
            })()
            .map_err(|e| format!("{:#}", e));

            let _ = sender.send(result);
        });
    }

    /// Load an image file and start a new project for it (asynchronously).
    pub fn load_image_file(&mut self, path: PathBuf) {
        let (sender, receiver) = channel();
        self.image_loader = Some(receiver);
        self.loading_message = Some("Loading image...".to_string());

        // Spawn background thread for loading
        std::thread::spawn(move || {
            let result = load_image(&path)
                .map(|image| {
                    log::info!(
                        "Loaded image: {} ({}x{})",
                        path.display(),
                        image.width,
                        image.height
                    );
                    let project = ProjectData::new(
                        path.to_string_lossy().into_owned(),
                        image.width,
                        image.height,
                    );
                    LoadedImageData { image, project }
                })
                .map_err(|e| format!("{:#}", e));

            let _ = sender.send(result);
        });
    }

    fn poll_loader(&mut self, ctx: &egui::Context) {
        let Some(receiver) = &self.image_loader else {
            return;
        };
        let Ok(result) = receiver.try_recv() else {
            return;
        };
        self.image_loader = None;
        self.loading_message = None;

        match result {
            Ok(loaded) => {
                // Create egui texture from the loaded image data
                let size = [loaded.image.width as usize, loaded.image.height as usize];
                let color_image =
                    egui::ColorImage::from_rgba_unmultiplied(size, &loaded.image.pixels);
                let texture =
                    ctx.load_texture("loaded_image", color_image, egui::TextureOptions::LINEAR);

                self.store.load(loaded.project.annotations.clone());
                self.controller.sync_with_store(&self.store);
                self.controller.select(None);
                self.image_texture = Some(texture);
                self.image = Some(loaded.image);
                self.project = Some(loaded.project);
                self.view.reset();
                self.status = None;
                log::info!("Image loaded successfully");
            }
            Err(e) => {
                log::error!("Failed to load: {}", e);
                self.status = Some(format!("Failed to load: {}", e));
            }
        }
    }

    fn menu_bar(&mut self, ui: &mut egui::Ui) {
        egui::menu::bar(ui, |ui| {
            ui.menu_button("File", |ui| {
                if ui.button("Open Image...").clicked() {
                    // Open native file picker
                    if let Some(path) = rfd::FileDialog::new()
                        .add_filter("Images", &["jpg", "jpeg", "png", "bmp", "gif", "webp", "tiff", "tif"])
                        .pick_file()
                    {
                        self.load_image_file(path);
                    }
                    ui.close_menu();
                }
                if ui.button("Open Project...").clicked() {
                    if let Some(path) = rfd::FileDialog::new()
                        .add_filter("Projects", &["json", "yaml", "yml"])
                        .pick_file()
                    {
                        self.open_project(path);
                    }
                    ui.close_menu();
                }
                ui.separator();
                let has_project = self.project.is_some();
                if ui
                    .add_enabled(has_project, egui::Button::new("Save Project..."))
                    .clicked()
                {
                    let name = self
                        .project
                        .as_ref()
                        .map(|p| format!("{}.json", p.title))
                        .unwrap_or_else(|| "project.json".to_string());
                    if let Some(path) = rfd::FileDialog::new()
                        .add_filter("JSON", &["json"])
                        .add_filter("YAML", &["yaml", "yml"])
                        .set_file_name(name)
                        .save_file()
                    {
                        self.save_project(path);
                    }
                    ui.close_menu();
                }
                if ui
                    .add_enabled(has_project, egui::Button::new("Export SVG..."))
                    .clicked()
                {
                    if let Some(path) = rfd::FileDialog::new()
                        .add_filter("SVG", &["svg"])
                        .set_file_name("annotated.svg")
                        .save_file()
                    {
                        self.export_svg(path);
                    }
                    ui.close_menu();
                }
                ui.separator();
                if ui.button("Quit").clicked() {
                    ui.ctx().send_viewport_cmd(egui::ViewportCommand::Close);
                }
            });

            ui.menu_button("Edit", |ui| {
                if ui
                    .add_enabled(self.store.can_undo(), egui::Button::new("Undo (Ctrl+Z)"))
                    .clicked()
                {
                    self.undo();
                    ui.close_menu();
                }
                if ui
                    .add_enabled(self.store.can_redo(), egui::Button::new("Redo (Ctrl+Shift+Z)"))
                    .clicked()
                {
                    self.redo();
                    ui.close_menu();
                }

                ui.separator();

                let has_selection = self.controller.selection().is_some();
                if ui
                    .add_enabled(has_selection, egui::Button::new("Delete Selected"))
                    .clicked()
                {
                    self.delete_selected();
                    ui.close_menu();
                }
                if ui
                    .add_enabled(!self.store.is_empty(), egui::Button::new("Clear All"))
                    .clicked()
                {
                    self.clear_all();
                    ui.close_menu();
                }
            });

            ui.menu_button("View", |ui| {
                if ui.button("Zoom In").clicked() {
                    self.view.zoom_by(1.25);
                    ui.close_menu();
                }
                if ui.button("Zoom Out").clicked() {
                    self.view.zoom_by(0.8);
                    ui.close_menu();
                }
                if ui.button("Reset Zoom").clicked() {
                    self.view.reset();
                    ui.close_menu();
                }
            });

            ui.menu_button("Help", |ui| {
                if ui.button("About").clicked() {
                    self.status = Some(format!(
                        "Marginalia {}: annotate images with margin labels",
                        env!("CARGO_PKG_VERSION")
                    ));
                    ui.close_menu();
                }
            });
        });
    }

    fn handle_shortcuts(&mut self, ctx: &egui::Context) {
        // Text fields own the keyboard while focused
        if ctx.wants_keyboard_input() {
            return;
        }

        if ctx.input(|i| i.key_pressed(egui::Key::Escape)) {
            self.controller.key(&mut self.store, KeyInput::Escape);
        }

        if ctx.input(|i| i.key_pressed(egui::Key::Enter)) {
            self.controller.key(&mut self.store, KeyInput::Enter { shift: false });
        }

        if ctx.input(|i| i.key_pressed(egui::Key::Delete)) {
            self.controller.key(&mut self.store, KeyInput::Delete);
        }
        if ctx.input(|i| i.key_pressed(egui::Key::Backspace)) {
            self.controller.key(&mut self.store, KeyInput::Backspace);
        }

        // Handle undo (Ctrl+Z)
        if ctx.input(|i| i.modifiers.command && i.key_pressed(egui::Key::Z) && !i.modifiers.shift) {
            self.undo();
        }

        // Handle redo (Ctrl+Shift+Z or Ctrl+Y)
        if ctx.input(|i| {
            (i.modifiers.command && i.modifiers.shift && i.key_pressed(egui::Key::Z))
                || (i.modifiers.command && i.key_pressed(egui::Key::Y))
        }) {
            self.redo();
        }
    }

    fn status_bar(&self, ui: &mut egui::Ui) {
        ui.horizontal(|ui| {
            ui.label(format!("Tool: {:?}", self.controller.tool()));
            ui.separator();
            match &self.project {
                Some(project) => {
                    ui.label(format!(
                        "{} ({}x{})",
                        project.title, project.image_width, project.image_height
                    ));
                    ui.separator();
                    ui.label(format!("{} annotations", self.store.len()));
                    ui.separator();
                    ui.label(format!("{:.0}%", self.view.zoom * 100.0));
                }
                None => {
                    ui.label("No image loaded");
                }
            }
            if let Some(status) = &self.status {
                ui.separator();
                ui.label(egui::RichText::new(status).weak());
            }
        });
    }
}

impl eframe::App for MarginaliaApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.poll_loader(ctx);

        // Request repaint if still loading (to update spinner)
        if self.loading_message.is_some() {
            ctx.request_repaint();
        }

        egui::TopBottomPanel::top("menu_bar").show(ctx, |ui| self.menu_bar(ui));

        let palette = self.config.editor.palette.clone();
        let toolbar_action = egui::TopBottomPanel::top("toolbar")
            .show(ctx, |ui| toolbar::show(ui, &mut self.controller, &palette))
            .inner;
        if let toolbar::ToolbarAction::SetColor(color) = toolbar_action {
            // Recolor the selection too
            if let Some(id) = self.controller.selection() {
                let patch = AnnotationPatch {
                    color: Some(color),
                    ..Default::default()
                };
                self.store.update(id, &patch);
            }
        }

        egui::TopBottomPanel::bottom("status_bar").show(ctx, |ui| self.status_bar(ui));

        // Annotation list (right side)
        let properties_action = egui::SidePanel::right("properties")
            .default_width(250.0)
            .show(ctx, |ui| {
                properties::show(ui, &self.store, self.controller.selection())
            })
            .inner;

        match properties_action {
            properties::PropertiesAction::SelectAnnotation(id) => {
                self.controller.commit_label_edit(&mut self.store);
                self.controller.select(Some(id));
            }
            properties::PropertiesAction::EditLabel(id) => {
                self.controller.commit_label_edit(&mut self.store);
                self.controller.begin_label_edit(&self.store, id);
            }
            properties::PropertiesAction::DeleteAnnotation(id) => {
                self.controller.commit_label_edit(&mut self.store);
                self.controller.select(Some(id));
                self.delete_selected();
            }
            properties::PropertiesAction::None => {}
        }

        self.handle_shortcuts(ctx);

        let image_size = self.image_size();
        egui::CentralPanel::default().show(ctx, |ui| {
            // Show loading overlay if loading
            if let Some(ref message) = self.loading_message {
                ui.centered_and_justified(|ui| {
                    ui.vertical_centered(|ui| {
                        ui.add_space(20.0);
                        ui.spinner();
                        ui.add_space(10.0);
                        ui.label(
                            egui::RichText::new(message)
                                .size(16.0)
                                .color(egui::Color32::from_gray(200)),
                        );
                    });
                });
                return;
            }

            match (&self.image_texture, image_size) {
                (Some(texture), Some(image_size)) => canvas::show(
                    ui,
                    Canvas {
                        store: &mut self.store,
                        controller: &mut self.controller,
                        config: &self.config,
                        texture,
                        image_size,
                        view: &mut self.view,
                    },
                ),
                _ => welcome(ui),
            }
        });
    }
}

/// Shown when no image is loaded.
fn welcome(ui: &mut egui::Ui) {
    ui.centered_and_justified(|ui| {
        ui.vertical_centered(|ui| {
            ui.add_space(20.0);
            ui.heading(
                egui::RichText::new("Marginalia")
                    .size(32.0)
                    .color(egui::Color32::from_gray(200)),
            );
            ui.add_space(20.0);
            ui.label(
                egui::RichText::new("Open an image to begin annotating")
                    .color(egui::Color32::from_gray(180)),
            );
            ui.add_space(10.0);
            ui.label(
                egui::RichText::new("File → Open Image...")
                    .weak()
                    .color(egui::Color32::from_gray(130)),
            );
        });
    });
}
