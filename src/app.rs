use std::path::PathBuf;
use std::sync::Arc;

use egui::{Key, KeyboardShortcut, Modifiers, Rect};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::canvas::{CanvasSignal, DrawingCanvas};
use crate::config::CanvasConfig;
use crate::dispatch::OutputFormat;
use crate::file_handler::FileHandler;
use crate::input::InputHandler;
use crate::math::BuiltinEngine;
use crate::panels;
use crate::recognition::{CommandRecognizer, RecognitionJob, RecognitionOutcome, RecognitionPipeline};
use crate::texture_manager::CanvasTexture;
use crate::tools::ToolConfig;

const NEW_FILE: KeyboardShortcut = KeyboardShortcut::new(Modifiers::COMMAND, Key::N);
const OPEN: KeyboardShortcut = KeyboardShortcut::new(Modifiers::COMMAND, Key::O);
const SAVE: KeyboardShortcut = KeyboardShortcut::new(Modifiers::COMMAND, Key::S);
const QUIT: KeyboardShortcut = KeyboardShortcut::new(Modifiers::COMMAND, Key::Q);
const UNDO: KeyboardShortcut = KeyboardShortcut::new(Modifiers::COMMAND, Key::Z);
const REDO: KeyboardShortcut = KeyboardShortcut::new(Modifiers::COMMAND, Key::Y);
const ZOOM_IN: KeyboardShortcut = KeyboardShortcut::new(Modifiers::COMMAND, Key::Plus);
// Most layouts need shift for `+`, so `=` on the same key counts too
const ZOOM_IN_ALT: KeyboardShortcut = KeyboardShortcut::new(Modifiers::COMMAND, Key::Equals);
const ZOOM_OUT: KeyboardShortcut = KeyboardShortcut::new(Modifiers::COMMAND, Key::Minus);

/// Settings restored when the app restarts
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PersistedSettings {
    pub tool: Option<ToolConfig>,
    pub latex_output: bool,
}

/// Modal prompts; at most one is open
#[derive(Debug, Clone, PartialEq)]
pub enum Dialog {
    /// Asks before wiping the canvas
    ConfirmClear { new_file: bool },
    Rotate { degrees: i32 },
    Open { path: String },
    Save { path: String },
}

pub struct FormulaApp {
    config: CanvasConfig,
    canvas: DrawingCanvas,
    pipeline: RecognitionPipeline,
    texture: CanvasTexture,
    input: InputHandler,
    file_handler: FileHandler,
    jobs: Vec<RecognitionJob>,
    /// Open result windows, oldest first
    results: Vec<RecognitionOutcome>,
    dialog: Option<Dialog>,
    status: Option<String>,
    latex_output: bool,
}

impl FormulaApp {
    /// Called once before the first frame.
    pub fn new(cc: &eframe::CreationContext<'_>, config: CanvasConfig) -> Self {
        let settings: PersistedSettings = cc
            .storage
            .and_then(|storage| eframe::get_value(storage, eframe::APP_KEY))
            .unwrap_or_default();
        Self::with_settings(config, settings)
    }

    pub fn with_settings(config: CanvasConfig, settings: PersistedSettings) -> Self {
        let mut canvas = DrawingCanvas::new(&config);
        if let Some(tool) = settings.tool {
            canvas.apply_tool_config(tool);
        }
        let recognizer = Arc::new(CommandRecognizer::new(config.recognizer_command.clone()));
        let pipeline = RecognitionPipeline::new(recognizer, Arc::new(BuiltinEngine));

        Self {
            config,
            canvas,
            pipeline,
            texture: CanvasTexture::new(),
            input: InputHandler::new(Rect::NOTHING),
            file_handler: FileHandler::new(),
            jobs: Vec::new(),
            results: Vec::new(),
            dialog: None,
            status: None,
            latex_output: settings.latex_output,
        }
    }

    pub fn config(&self) -> &CanvasConfig {
        &self.config
    }

    pub fn canvas(&self) -> &DrawingCanvas {
        &self.canvas
    }

    pub fn canvas_mut(&mut self) -> &mut DrawingCanvas {
        &mut self.canvas
    }

    /// Texture of the surface, re-uploaded only after the canvas changed
    pub fn canvas_texture(&mut self, ctx: &egui::Context) -> egui::TextureId {
        let canvas = &self.canvas;
        self.texture
            .get_or_update(ctx, canvas.revision(), || canvas.surface().to_color_image())
    }

    pub fn latex_output(&self) -> bool {
        self.latex_output
    }

    pub fn set_latex_output(&mut self, latex: bool) {
        self.latex_output = latex;
    }

    pub fn open_dialog(&mut self, dialog: Dialog) {
        self.dialog = Some(dialog);
    }

    pub fn is_recognizing(&self) -> bool {
        !self.jobs.is_empty()
    }

    pub fn undo(&mut self) {
        self.canvas.undo();
    }

    pub fn redo(&mut self) {
        self.canvas.redo();
    }

    pub fn zoom_in(&mut self) {
        let factor = self.config.zoom_in_factor;
        self.canvas.scale_selection(factor);
    }

    pub fn zoom_out(&mut self) {
        let factor = self.config.zoom_out_factor;
        self.canvas.scale_selection(factor);
    }

    /// Feeds this frame's pointer input to the canvas shown at `canvas_rect`
    pub fn handle_canvas_input(&mut self, ctx: &egui::Context, canvas_rect: Rect) {
        self.input.set_canvas_rect(canvas_rect);
        for event in self.input.process_input(ctx) {
            if self.dialog.is_some() {
                continue;
            }
            if let Some(CanvasSignal::RecognitionRequested) = self.canvas.handle_event(&event) {
                self.request_recognition();
            }
        }
    }

    /// Starts recognizing the current selection in the background
    pub fn request_recognition(&mut self) {
        let format = if self.latex_output {
            OutputFormat::Latex
        } else {
            OutputFormat::Native
        };
        self.pipeline.set_format(format);
        match self.pipeline.spawn(&self.canvas) {
            Ok(job) => self.jobs.push(job),
            Err(err) => {
                log::warn!("Recognition not started: {err}");
                self.status = Some(err.to_string());
            }
        }
    }

    fn poll_jobs(&mut self, ctx: &egui::Context) {
        let mut finished = Vec::new();
        self.jobs.retain_mut(|job| match job.try_take() {
            Some(outcome) => {
                finished.push(outcome);
                false
            }
            None => true,
        });
        self.results.extend(finished);
        if !self.jobs.is_empty() {
            ctx.request_repaint();
        }
    }

    fn handle_shortcuts(&mut self, ctx: &egui::Context) {
        if self.dialog.is_some() {
            return;
        }
        let pressed = |shortcut: &KeyboardShortcut| ctx.input_mut(|i| i.consume_shortcut(shortcut));

        if pressed(&NEW_FILE) {
            self.dialog = Some(Dialog::ConfirmClear { new_file: true });
        } else if pressed(&OPEN) {
            self.dialog = Some(Dialog::Open { path: String::new() });
        } else if pressed(&SAVE) {
            self.dialog = Some(Dialog::Save { path: String::new() });
        } else if pressed(&QUIT) {
            ctx.send_viewport_cmd(egui::ViewportCommand::Close);
        } else if pressed(&UNDO) {
            self.undo();
        } else if pressed(&REDO) {
            self.redo();
        } else if pressed(&ZOOM_IN) || pressed(&ZOOM_IN_ALT) {
            self.zoom_in();
        } else if pressed(&ZOOM_OUT) {
            self.zoom_out();
        }
    }

    fn handle_dropped_files(&mut self, ctx: &egui::Context) {
        self.file_handler.preview_files_being_dropped(ctx);
        if !self.file_handler.check_for_dropped_files(ctx) {
            return;
        }
        // Only the first image is opened, like a regular open
        if let Some(image) = self.file_handler.take_dropped_images().into_iter().next() {
            if let Err(err) = self.canvas.load_from_memory(&image.bytes) {
                log::error!("{err}");
                self.status = Some(err.to_string());
            }
        }
    }

    fn menu_bar(&mut self, ctx: &egui::Context) {
        egui::TopBottomPanel::top("menu_bar").show(ctx, |ui| {
            egui::menu::bar(ui, |ui| {
                ui.menu_button("File", |ui| {
                    if ui.add(egui::Button::new("New").shortcut_text(ctx.format_shortcut(&NEW_FILE))).clicked() {
                        self.dialog = Some(Dialog::ConfirmClear { new_file: true });
                        ui.close_menu();
                    }
                    if ui.add(egui::Button::new("Open…").shortcut_text(ctx.format_shortcut(&OPEN))).clicked() {
                        self.dialog = Some(Dialog::Open { path: String::new() });
                        ui.close_menu();
                    }
                    if ui.add(egui::Button::new("Save…").shortcut_text(ctx.format_shortcut(&SAVE))).clicked() {
                        self.dialog = Some(Dialog::Save { path: String::new() });
                        ui.close_menu();
                    }
                    ui.separator();
                    if ui.add(egui::Button::new("Quit").shortcut_text(ctx.format_shortcut(&QUIT))).clicked() {
                        ctx.send_viewport_cmd(egui::ViewportCommand::Close);
                    }
                });
                ui.menu_button("Edit", |ui| {
                    let undo = egui::Button::new("Undo").shortcut_text(ctx.format_shortcut(&UNDO));
                    if ui.add_enabled(self.canvas.can_undo(), undo).clicked() {
                        self.undo();
                        ui.close_menu();
                    }
                    let redo = egui::Button::new("Redo").shortcut_text(ctx.format_shortcut(&REDO));
                    if ui.add_enabled(self.canvas.can_redo(), redo).clicked() {
                        self.redo();
                        ui.close_menu();
                    }
                    ui.separator();
                    if ui.button("Clear canvas").clicked() {
                        self.dialog = Some(Dialog::ConfirmClear { new_file: false });
                        ui.close_menu();
                    }
                });
                ui.menu_button("Selection", |ui| {
                    let has_selection = !self.canvas.selection().is_empty();
                    let zoom_in = egui::Button::new("Zoom in").shortcut_text(ctx.format_shortcut(&ZOOM_IN));
                    if ui.add_enabled(has_selection, zoom_in).clicked() {
                        self.zoom_in();
                        ui.close_menu();
                    }
                    let zoom_out = egui::Button::new("Zoom out").shortcut_text(ctx.format_shortcut(&ZOOM_OUT));
                    if ui.add_enabled(has_selection, zoom_out).clicked() {
                        self.zoom_out();
                        ui.close_menu();
                    }
                    if ui.add_enabled(has_selection, egui::Button::new("Rotate…")).clicked() {
                        self.dialog = Some(Dialog::Rotate { degrees: 90 });
                        ui.close_menu();
                    }
                    ui.separator();
                    let recognize = egui::Button::new("Recognize and solve");
                    if ui.add_enabled(has_selection, recognize).clicked() {
                        self.request_recognition();
                        ui.close_menu();
                    }
                    ui.checkbox(&mut self.latex_output, "Show results as LaTeX");
                });
            });
        });
    }

    fn dialog_window(&mut self, ctx: &egui::Context) {
        let Some(mut dialog) = self.dialog.take() else {
            return;
        };
        let mut keep_open = true;

        let title = match &dialog {
            Dialog::ConfirmClear { new_file: true } => "New file",
            Dialog::ConfirmClear { new_file: false } => "Clear canvas",
            Dialog::Rotate { .. } => "Rotate selection",
            Dialog::Open { .. } => "Open image",
            Dialog::Save { .. } => "Save image",
        };

        egui::Window::new(title)
            .collapsible(false)
            .resizable(false)
            .anchor(egui::Align2::CENTER_CENTER, egui::Vec2::ZERO)
            .show(ctx, |ui| match &mut dialog {
                Dialog::ConfirmClear { new_file } => {
                    ui.label(if *new_file {
                        "Start a new file? Unsaved content will be lost."
                    } else {
                        "Clear the whole canvas?"
                    });
                    ui.horizontal(|ui| {
                        if ui.button("Yes").clicked() {
                            self.canvas.clear();
                            keep_open = false;
                        }
                        if ui.button("No").clicked() {
                            keep_open = false;
                        }
                    });
                }
                Dialog::Rotate { degrees } => {
                    ui.label("Angle in degrees (clockwise):");
                    ui.add(egui::DragValue::new(degrees).range(-360..=360));
                    ui.horizontal(|ui| {
                        if ui.button("Rotate").clicked() {
                            self.canvas.rotate_selection(*degrees);
                            keep_open = false;
                        }
                        if ui.button("Cancel").clicked() {
                            keep_open = false;
                        }
                    });
                }
                Dialog::Open { path } => {
                    if self.file_prompt(ui, path, false) {
                        keep_open = false;
                    }
                }
                Dialog::Save { path } => {
                    if self.file_prompt(ui, path, true) {
                        keep_open = false;
                    }
                }
            });

        if keep_open {
            self.dialog = Some(dialog);
        }
    }

    /// Path entry for open and save; true once the prompt is done
    fn file_prompt(&mut self, ui: &mut egui::Ui, path: &mut String, saving: bool) -> bool {
        ui.label("File path (.png, .jpg or .bmp):");
        ui.text_edit_singleline(path);
        let mut done = false;
        ui.horizontal(|ui| {
            let label = if saving { "Save" } else { "Open" };
            if ui.add_enabled(!path.trim().is_empty(), egui::Button::new(label)).clicked() {
                let path = PathBuf::from(path.trim());
                let result = if saving {
                    self.canvas.save(&path)
                } else {
                    self.canvas.load(&path)
                };
                match result {
                    Ok(()) => self.status = None,
                    Err(err) => {
                        log::error!("{err}");
                        self.status = Some(err.to_string());
                    }
                }
                done = true;
            }
            if ui.button("Cancel").clicked() {
                done = true;
            }
        });
        done
    }

    fn result_windows(&mut self, ctx: &egui::Context) {
        let mut closed: Vec<Uuid> = Vec::new();
        for outcome in &self.results {
            let mut open = true;
            egui::Window::new("Recognition result")
                .id(egui::Id::new(outcome.id))
                .open(&mut open)
                .resizable(false)
                .show(ctx, |ui| {
                    if !outcome.latex.is_empty() {
                        ui.label(format!("Formula: {}", outcome.latex));
                        ui.label(format!("Type: {}", outcome.category));
                    }
                    let rendered = outcome.rendered();
                    ui.label(format!("Result: {rendered}"));
                    if ui.button("Copy result").clicked() {
                        ctx.copy_text(rendered);
                    }
                });
            if !open {
                closed.push(outcome.id);
            }
        }
        self.results.retain(|outcome| !closed.contains(&outcome.id));
    }

    fn status_bar(&mut self, ctx: &egui::Context) {
        egui::TopBottomPanel::bottom("status_bar").show(ctx, |ui| {
            ui.horizontal(|ui| {
                let surface = self.canvas.surface();
                ui.label(format!("{}×{}", surface.width(), surface.height()));
                ui.separator();
                ui.label(format!("Tool: {}", self.canvas.tool_kind().label()));
                if let Some(pos) = self.canvas.hover_position() {
                    ui.separator();
                    ui.label(format!("{:.0}, {:.0}", pos.x, pos.y));
                }
                if self.is_recognizing() {
                    ui.separator();
                    ui.spinner();
                    ui.label("Recognizing…");
                }
                let mut dismissed = false;
                if let Some(status) = &self.status {
                    ui.separator();
                    ui.colored_label(ui.visuals().error_fg_color, status);
                    dismissed = ui.small_button("✖").clicked();
                }
                if dismissed {
                    self.status = None;
                }
            });
        });
    }
}

impl eframe::App for FormulaApp {
    /// Called by the frame work to save state before shutdown.
    fn save(&mut self, storage: &mut dyn eframe::Storage) {
        let settings = PersistedSettings {
            tool: Some(*self.canvas.tool_config()),
            latex_output: self.latex_output,
        };
        eframe::set_value(storage, eframe::APP_KEY, &settings);
    }

    /// Called each time the UI needs repainting, which may be many times per second.
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.handle_shortcuts(ctx);
        self.handle_dropped_files(ctx);
        self.poll_jobs(ctx);

        self.menu_bar(ctx);
        self.status_bar(ctx);
        panels::tools_panel(self, ctx);
        panels::central_panel(self, ctx);

        self.dialog_window(ctx);
        self.result_windows(ctx);
    }
}
