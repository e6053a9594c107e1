//! The drawing canvas: surface, tools, selection and undo history in one place.

use std::path::Path;

use egui::{Color32, PointerButton, Pos2};
use image::RgbaImage;

use crate::config::CanvasConfig;
use crate::error::SurfaceIoError;
use crate::history::SnapshotHistory;
use crate::input::InputEvent;
use crate::selection::SelectionManager;
use crate::stroke::ShapePath;
use crate::surface::RasterSurface;
use crate::tools::{CanvasCommand, Tool, ToolConfig, ToolContext, ToolKind, ToolType};

/// Requests the canvas passes up to the presentation layer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CanvasSignal {
    /// Right-button release on a selection with the select tool
    RecognitionRequested,
}

pub struct DrawingCanvas {
    surface: RasterSurface,
    history: SnapshotHistory,
    selection: SelectionManager,
    config: ToolConfig,
    tool: ToolType,
    min_width: f32,
    max_width: f32,
    hover: Option<Pos2>,
    /// Set when the surface changed since the last history entry
    dirty: bool,
    /// Bumped on every pixel change so textures know when to re-upload
    revision: u64,
}

impl DrawingCanvas {
    pub fn new(config: &CanvasConfig) -> Self {
        let surface = RasterSurface::new(config.width, config.height, config.background);
        let mut history = SnapshotHistory::new(config.history_limit);
        history.push(surface.snapshot());
        let tool_config = config.initial_tool_config();
        let range = config.width_range();

        Self {
            surface,
            history,
            selection: SelectionManager::default(),
            tool: ToolType::for_kind(tool_config.tool),
            config: tool_config,
            min_width: *range.start(),
            max_width: *range.end(),
            hover: None,
            dirty: false,
            revision: 0,
        }
    }

    fn tool_context(&self) -> ToolContext {
        ToolContext {
            config: self.config,
            background: self.surface.background(),
        }
    }

    fn touch(&mut self) {
        self.revision = self.revision.wrapping_add(1);
    }

    fn apply(&mut self, commands: Vec<CanvasCommand>) {
        for command in commands {
            match command {
                CanvasCommand::PaintSegment {
                    from,
                    to,
                    color,
                    width,
                } => {
                    self.surface.stroke_segment(from, to, color, width);
                    self.dirty = true;
                    self.touch();
                }
                CanvasCommand::CommitShape { path, style } => {
                    self.surface.draw_shape(&path, &style);
                    self.dirty = true;
                    self.touch();
                }
                CanvasCommand::BeginSelection(pos) => {
                    if !self.selection.clear_if_outside(pos) {
                        self.selection.begin(pos);
                    }
                }
                CanvasCommand::UpdateSelection { anchor, current } => {
                    if self.selection.region().is_none() {
                        self.selection.begin(anchor);
                    }
                    self.selection.update(current);
                }
                CanvasCommand::RecordHistory => self.record_history(),
            }
        }
    }

    /// Pushes the current surface if anything was painted since the last push
    fn record_history(&mut self) {
        if self.dirty {
            self.history.push(self.surface.snapshot());
            self.dirty = false;
        }
    }

    /// Records an edit made outside the tools as one undo step
    fn commit_edit(&mut self) {
        self.dirty = true;
        self.touch();
        self.record_history();
    }

    pub fn handle_event(&mut self, event: &InputEvent) -> Option<CanvasSignal> {
        match event {
            InputEvent::PointerDown { location, button } if location.is_in_canvas => {
                self.pointer_down(location.position, *button);
                None
            }
            InputEvent::PointerMove {
                location,
                held_buttons,
            } => {
                self.pointer_move(location.position, held_buttons.contains(&PointerButton::Primary));
                if !location.is_in_canvas {
                    self.hover = None;
                }
                None
            }
            InputEvent::PointerUp { location, button } => self.pointer_up(location.position, *button),
            InputEvent::PointerLeave => {
                self.hover = None;
                None
            }
            InputEvent::PointerDown { .. } => None,
        }
    }

    pub fn pointer_down(&mut self, pos: Pos2, button: PointerButton) {
        self.hover = Some(pos);
        if button != PointerButton::Primary {
            return;
        }
        let ctx = self.tool_context();
        let commands = self.tool.on_pointer_down(pos, &ctx);
        self.apply(commands);
    }

    pub fn pointer_move(&mut self, pos: Pos2, primary_down: bool) {
        self.hover = Some(pos);
        if !primary_down || !self.tool.is_active() {
            return;
        }
        let ctx = self.tool_context();
        let commands = self.tool.on_pointer_move(pos, &ctx);
        self.apply(commands);
    }

    pub fn pointer_up(&mut self, pos: Pos2, button: PointerButton) -> Option<CanvasSignal> {
        match button {
            PointerButton::Primary if self.tool.is_active() => {
                let ctx = self.tool_context();
                let commands = self.tool.on_pointer_up(pos, &ctx);
                self.apply(commands);
                None
            }
            PointerButton::Secondary
                if self.config.tool == ToolKind::Select && !self.selection.is_empty() =>
            {
                Some(CanvasSignal::RecognitionRequested)
            }
            _ => None,
        }
    }

    pub fn tool_kind(&self) -> ToolKind {
        self.config.tool
    }

    pub fn tool(&self) -> &ToolType {
        &self.tool
    }

    pub fn tool_config(&self) -> &ToolConfig {
        &self.config
    }

    pub fn set_tool(&mut self, kind: ToolKind) {
        if kind == self.config.tool {
            return;
        }
        self.tool.deactivate();
        // Segments of an interrupted stroke are already on the surface
        self.record_history();
        log::info!("Switching tool from {} to {}", self.tool.name(), kind.label());
        self.config.tool = kind;
        self.tool = ToolType::for_kind(kind);
        self.tool.activate();
    }

    /// Used for both the brush and shape outlines
    pub fn set_stroke_color(&mut self, color: Color32) {
        self.config.stroke_color = color;
    }

    /// Used for both the brush and shape outlines; clamped to the allowed range
    pub fn set_stroke_width(&mut self, width: f32) {
        self.config.stroke_width = width.clamp(self.min_width, self.max_width);
    }

    pub fn set_fill_color(&mut self, color: Color32) {
        self.config.fill_color = color;
    }

    /// Restores persisted tool settings
    pub fn apply_tool_config(&mut self, config: ToolConfig) {
        self.set_tool(config.tool);
        self.set_stroke_color(config.stroke_color);
        self.set_stroke_width(config.stroke_width);
        self.set_fill_color(config.fill_color);
    }

    pub fn can_undo(&self) -> bool {
        !self.tool.is_active() && self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        !self.tool.is_active() && self.history.can_redo()
    }

    /// Refused while a drag is in progress
    pub fn undo(&mut self) -> bool {
        if self.tool.is_active() {
            return false;
        }
        match self.history.undo() {
            Some(snapshot) => {
                self.surface.restore(&snapshot);
                self.touch();
                true
            }
            None => false,
        }
    }

    pub fn redo(&mut self) -> bool {
        if self.tool.is_active() {
            return false;
        }
        match self.history.redo() {
            Some(snapshot) => {
                self.surface.restore(&snapshot);
                self.touch();
                true
            }
            None => false,
        }
    }

    /// Fills the surface with the background; one undo step
    pub fn clear(&mut self) {
        self.surface.fill(self.surface.background());
        self.commit_edit();
        log::info!("Canvas cleared");
    }

    /// Content keeps its place; the part outside the new size is lost.
    /// Not an undo step: the current history entry takes the new size.
    pub fn resize(&mut self, width: u32, height: u32) {
        let (width, height) = (width.max(1), height.max(1));
        if (width, height) == (self.surface.width(), self.surface.height()) {
            return;
        }
        self.surface.resize(width, height);
        self.history.replace_current(self.surface.snapshot());
        self.touch();
    }

    pub fn scale_selection(&mut self, factor: f32) -> bool {
        let changed = self.selection.scale(&mut self.surface, factor);
        if changed {
            self.commit_edit();
        }
        changed
    }

    /// Clockwise for positive angles
    pub fn rotate_selection(&mut self, degrees: i32) -> bool {
        let changed = self.selection.rotate(&mut self.surface, degrees);
        if changed {
            self.commit_edit();
        }
        changed
    }

    pub fn crop_selection(&self) -> Option<RgbaImage> {
        self.selection.crop(&self.surface)
    }

    pub fn clear_selection(&mut self) {
        self.selection.clear();
    }

    /// Draws the image at the top-left; a failed load leaves the canvas as it was
    pub fn load(&mut self, path: &Path) -> Result<(), SurfaceIoError> {
        self.surface.load(path)?;
        self.commit_edit();
        log::info!("Opened {}", path.display());
        Ok(())
    }

    pub fn load_from_memory(&mut self, bytes: &[u8]) -> Result<(), SurfaceIoError> {
        self.surface.load_from_memory(bytes)?;
        self.commit_edit();
        Ok(())
    }

    pub fn save(&self, path: &Path) -> Result<(), SurfaceIoError> {
        self.surface.save(path)?;
        log::info!("Saved canvas to {}", path.display());
        Ok(())
    }

    pub fn surface(&self) -> &RasterSurface {
        &self.surface
    }

    pub fn history(&self) -> &SnapshotHistory {
        &self.history
    }

    pub fn selection(&self) -> &SelectionManager {
        &self.selection
    }

    pub fn preview_shape(&self) -> Option<&ShapePath> {
        self.tool.preview()
    }

    pub fn hover_position(&self) -> Option<Pos2> {
        self.hover
    }

    pub fn is_drawing(&self) -> bool {
        self.tool.is_active()
    }

    /// Center and radius of the eraser footprint while hovering
    pub fn eraser_hint(&self) -> Option<(Pos2, f32)> {
        if self.config.tool != ToolKind::Eraser || self.is_drawing() {
            return None;
        }
        self.hover.map(|pos| (pos, self.config.stroke_width / 2.0))
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use egui::pos2;

    fn canvas() -> DrawingCanvas {
        DrawingCanvas::new(&CanvasConfig {
            width: 40,
            height: 30,
            ..CanvasConfig::default()
        })
    }

    fn drag(canvas: &mut DrawingCanvas, from: Pos2, to: Pos2) {
        canvas.pointer_down(from, PointerButton::Primary);
        canvas.pointer_move(to, true);
        canvas.pointer_up(to, PointerButton::Primary);
    }

    #[test]
    fn brush_stroke_is_one_undo_step() {
        let mut canvas = canvas();
        canvas.pointer_down(pos2(5.0, 5.0), PointerButton::Primary);
        canvas.pointer_move(pos2(10.0, 5.0), true);
        canvas.pointer_move(pos2(20.0, 5.0), true);
        canvas.pointer_up(pos2(20.0, 5.0), PointerButton::Primary);

        assert_eq!(canvas.history().undo_len(), 2);
        assert_eq!(canvas.surface().pixel(15, 5), Some(Color32::BLACK));
        assert!(canvas.undo());
        assert_eq!(canvas.surface().pixel(15, 5), Some(Color32::WHITE));
    }

    #[test]
    fn click_without_drag_records_nothing() {
        let mut canvas = canvas();
        canvas.pointer_down(pos2(5.0, 5.0), PointerButton::Primary);
        canvas.pointer_up(pos2(5.0, 5.0), PointerButton::Primary);
        assert_eq!(canvas.history().undo_len(), 1);
    }

    #[test]
    fn shape_is_painted_on_release_only() {
        let mut canvas = canvas();
        canvas.set_tool(ToolKind::Rectangle);
        canvas.pointer_down(pos2(5.0, 5.0), PointerButton::Primary);
        canvas.pointer_move(pos2(25.0, 20.0), true);
        assert!(canvas.preview_shape().is_some());
        assert_eq!(canvas.surface().pixel(5, 5), Some(Color32::WHITE));

        canvas.pointer_up(pos2(25.0, 20.0), PointerButton::Primary);
        assert!(canvas.preview_shape().is_none());
        assert_eq!(canvas.surface().pixel(5, 5), Some(Color32::BLACK));
    }

    #[test]
    fn undo_refused_while_drawing() {
        let mut canvas = canvas();
        drag(&mut canvas, pos2(1.0, 1.0), pos2(10.0, 10.0));
        canvas.pointer_down(pos2(1.0, 20.0), PointerButton::Primary);
        assert!(!canvas.undo());
    }

    #[test]
    fn right_release_on_selection_requests_recognition() {
        let mut canvas = canvas();
        canvas.set_tool(ToolKind::Select);
        assert_eq!(canvas.pointer_up(pos2(3.0, 3.0), PointerButton::Secondary), None);

        drag(&mut canvas, pos2(2.0, 2.0), pos2(20.0, 12.0));
        assert_eq!(
            canvas.pointer_up(pos2(3.0, 3.0), PointerButton::Secondary),
            Some(CanvasSignal::RecognitionRequested)
        );
    }

    #[test]
    fn press_outside_selection_clears_it() {
        let mut canvas = canvas();
        canvas.set_tool(ToolKind::Select);
        drag(&mut canvas, pos2(2.0, 2.0), pos2(10.0, 10.0));
        canvas.pointer_down(pos2(30.0, 25.0), PointerButton::Primary);
        assert!(canvas.selection().is_empty());
        // Dragging on starts a fresh selection from the press point
        canvas.pointer_move(pos2(35.0, 28.0), true);
        assert_eq!(
            canvas.selection().region().map(|r| r.rect().min),
            Some(pos2(30.0, 25.0))
        );
    }

    #[test]
    fn width_is_clamped() {
        let mut canvas = canvas();
        canvas.set_stroke_width(80.0);
        assert_eq!(canvas.tool_config().stroke_width, 50.0);
        canvas.set_stroke_width(0.0);
        assert_eq!(canvas.tool_config().stroke_width, 1.0);
    }

    #[test]
    fn eraser_hint_follows_hover() {
        let mut canvas = canvas();
        canvas.set_tool(ToolKind::Eraser);
        canvas.set_stroke_width(10.0);
        canvas.pointer_move(pos2(7.0, 8.0), false);
        assert_eq!(canvas.eraser_hint(), Some((pos2(7.0, 8.0), 5.0)));
        canvas.pointer_down(pos2(7.0, 8.0), PointerButton::Primary);
        assert_eq!(canvas.eraser_hint(), None);
    }

    #[test]
    fn resize_is_not_an_undo_step() {
        let mut canvas = canvas();
        canvas.resize(60, 50);
        assert_eq!(canvas.history().undo_len(), 1);
        assert_eq!(canvas.surface().width(), 60);
    }
}
