use egui::{Color32, Pos2};
use serde::{Deserialize, Serialize};

use crate::stroke::{ShapeKind, ShapePath, ShapeStyle};

mod freehand_tool;
pub use freehand_tool::{FreehandState, FreehandTool};

mod shape_tool;
pub use shape_tool::{ShapeState, ShapeTool};

mod selection_tool;
pub use selection_tool::{SelectionState, SelectionTool};

/// Every tool the canvas offers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ToolKind {
    #[default]
    Brush,
    Eraser,
    Rectangle,
    Ellipse,
    Line,
    Triangle,
    Select,
}

impl ToolKind {
    pub const ALL: [ToolKind; 7] = [
        ToolKind::Brush,
        ToolKind::Eraser,
        ToolKind::Rectangle,
        ToolKind::Ellipse,
        ToolKind::Line,
        ToolKind::Triangle,
        ToolKind::Select,
    ];

    pub fn label(self) -> &'static str {
        match self {
            ToolKind::Brush => "Brush",
            ToolKind::Eraser => "Eraser",
            ToolKind::Rectangle => "Rectangle",
            ToolKind::Ellipse => "Ellipse",
            ToolKind::Line => "Line",
            ToolKind::Triangle => "Triangle",
            ToolKind::Select => "Select",
        }
    }

    pub fn shape(self) -> Option<ShapeKind> {
        match self {
            ToolKind::Rectangle => Some(ShapeKind::Rectangle),
            ToolKind::Ellipse => Some(ShapeKind::Ellipse),
            ToolKind::Line => Some(ShapeKind::Line),
            ToolKind::Triangle => Some(ShapeKind::Triangle),
            _ => None,
        }
    }
}

/// Settings every paint operation reads
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolConfig {
    pub tool: ToolKind,
    /// Shared by the brush and the shape outlines
    pub stroke_color: Color32,
    pub stroke_width: f32,
    /// Fully transparent means shapes are not filled
    pub fill_color: Color32,
}

impl Default for ToolConfig {
    fn default() -> Self {
        Self {
            tool: ToolKind::Brush,
            stroke_color: Color32::BLACK,
            stroke_width: 2.0,
            fill_color: Color32::TRANSPARENT,
        }
    }
}

impl ToolConfig {
    pub fn shape_style(&self) -> ShapeStyle {
        ShapeStyle {
            stroke: self.stroke_color,
            width: self.stroke_width,
            fill: self.fill_color,
        }
    }
}

/// What a tool sees of the canvas while handling the pointer
#[derive(Debug, Clone, Copy)]
pub struct ToolContext {
    pub config: ToolConfig,
    pub background: Color32,
}

/// Edits tools ask the canvas to perform
#[derive(Debug, Clone, PartialEq)]
pub enum CanvasCommand {
    /// Paints one segment of a freehand stroke straight into the surface
    PaintSegment {
        from: Pos2,
        to: Pos2,
        color: Color32,
        width: f32,
    },
    /// Draws the finished shape into the surface
    CommitShape { path: ShapePath, style: ShapeStyle },
    /// Drops a selection the press landed outside of, or starts a new one
    BeginSelection(Pos2),
    UpdateSelection { anchor: Pos2, current: Pos2 },
    /// Closes the interaction as one undo step
    RecordHistory,
}

/// Pointer-driven tool. Tools never touch the surface themselves; they
/// return commands the canvas applies.
pub trait Tool {
    fn name(&self) -> &'static str;

    /// Called when the tool becomes active
    fn activate(&mut self) {}

    /// Called when another tool takes over; drops any half-finished work
    fn deactivate(&mut self);

    fn on_pointer_down(&mut self, pos: Pos2, ctx: &ToolContext) -> Vec<CanvasCommand>;

    fn on_pointer_move(&mut self, pos: Pos2, ctx: &ToolContext) -> Vec<CanvasCommand>;

    fn on_pointer_up(&mut self, pos: Pos2, ctx: &ToolContext) -> Vec<CanvasCommand>;

    /// Outline to draw on top of the surface while dragging
    fn preview(&self) -> Option<&ShapePath> {
        None
    }

    fn current_state_name(&self) -> &'static str;
}

/// Active tool; each variant carries only its own state
#[derive(Debug, Clone)]
pub enum ToolType {
    Freehand(FreehandTool),
    Shape(ShapeTool),
    Selection(SelectionTool),
}

impl ToolType {
    pub fn for_kind(kind: ToolKind) -> Self {
        match kind {
            ToolKind::Brush => Self::Freehand(FreehandTool::brush()),
            ToolKind::Eraser => Self::Freehand(FreehandTool::eraser()),
            ToolKind::Select => Self::Selection(SelectionTool::new()),
            shape => match shape.shape() {
                Some(shape) => Self::Shape(ShapeTool::new(shape)),
                None => Self::Freehand(FreehandTool::brush()),
            },
        }
    }

    /// True while a press is being dragged
    pub fn is_active(&self) -> bool {
        match self {
            Self::Freehand(tool) => tool.is_drawing(),
            Self::Shape(tool) => tool.preview().is_some(),
            Self::Selection(tool) => tool.is_dragging(),
        }
    }
}

impl Tool for ToolType {
    fn name(&self) -> &'static str {
        match self {
            Self::Freehand(tool) => tool.name(),
            Self::Shape(tool) => tool.name(),
            Self::Selection(tool) => tool.name(),
        }
    }

    fn activate(&mut self) {
        match self {
            Self::Freehand(tool) => tool.activate(),
            Self::Shape(tool) => tool.activate(),
            Self::Selection(tool) => tool.activate(),
        }
    }

    fn deactivate(&mut self) {
        match self {
            Self::Freehand(tool) => tool.deactivate(),
            Self::Shape(tool) => tool.deactivate(),
            Self::Selection(tool) => tool.deactivate(),
        }
    }

    fn on_pointer_down(&mut self, pos: Pos2, ctx: &ToolContext) -> Vec<CanvasCommand> {
        match self {
            Self::Freehand(tool) => tool.on_pointer_down(pos, ctx),
            Self::Shape(tool) => tool.on_pointer_down(pos, ctx),
            Self::Selection(tool) => tool.on_pointer_down(pos, ctx),
        }
    }

    fn on_pointer_move(&mut self, pos: Pos2, ctx: &ToolContext) -> Vec<CanvasCommand> {
        match self {
            Self::Freehand(tool) => tool.on_pointer_move(pos, ctx),
            Self::Shape(tool) => tool.on_pointer_move(pos, ctx),
            Self::Selection(tool) => tool.on_pointer_move(pos, ctx),
        }
    }

    fn on_pointer_up(&mut self, pos: Pos2, ctx: &ToolContext) -> Vec<CanvasCommand> {
        match self {
            Self::Freehand(tool) => tool.on_pointer_up(pos, ctx),
            Self::Shape(tool) => tool.on_pointer_up(pos, ctx),
            Self::Selection(tool) => tool.on_pointer_up(pos, ctx),
        }
    }

    fn preview(&self) -> Option<&ShapePath> {
        match self {
            Self::Shape(tool) => tool.preview(),
            _ => None,
        }
    }

    fn current_state_name(&self) -> &'static str {
        match self {
            Self::Freehand(tool) => tool.current_state_name(),
            Self::Shape(tool) => tool.current_state_name(),
            Self::Selection(tool) => tool.current_state_name(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_kind_maps_to_its_tool() {
        for kind in ToolKind::ALL {
            let tool = ToolType::for_kind(kind);
            assert_eq!(tool.name(), kind.label());
            assert_eq!(tool.current_state_name(), "Idle");
        }
    }
}
