use egui::{Color32, Pos2};

use crate::stroke::Stroke;
use crate::tools::{CanvasCommand, Tool, ToolContext};

#[derive(Debug, Clone)]
pub enum FreehandState {
    Idle,
    Drawing { stroke: Stroke },
}

/// Brush and eraser. Segments are painted as the pointer moves; the eraser
/// paints with the background color.
#[derive(Debug, Clone)]
pub struct FreehandTool {
    erase: bool,
    state: FreehandState,
}

impl FreehandTool {
    pub fn brush() -> Self {
        Self {
            erase: false,
            state: FreehandState::Idle,
        }
    }

    pub fn eraser() -> Self {
        Self {
            erase: true,
            state: FreehandState::Idle,
        }
    }

    pub fn is_drawing(&self) -> bool {
        matches!(self.state, FreehandState::Drawing { .. })
    }

    fn paint_color(&self, ctx: &ToolContext) -> Color32 {
        if self.erase {
            ctx.background
        } else {
            ctx.config.stroke_color
        }
    }
}

impl Tool for FreehandTool {
    fn name(&self) -> &'static str {
        if self.erase { "Eraser" } else { "Brush" }
    }

    fn deactivate(&mut self) {
        self.state = FreehandState::Idle;
    }

    fn on_pointer_down(&mut self, pos: Pos2, ctx: &ToolContext) -> Vec<CanvasCommand> {
        let mut stroke = Stroke::new(self.paint_color(ctx), ctx.config.stroke_width);
        stroke.add_point(pos);
        self.state = FreehandState::Drawing { stroke };
        Vec::new()
    }

    fn on_pointer_move(&mut self, pos: Pos2, _ctx: &ToolContext) -> Vec<CanvasCommand> {
        let FreehandState::Drawing { stroke } = &mut self.state else {
            return Vec::new();
        };
        let Some(from) = stroke.last_point() else {
            return Vec::new();
        };
        if from == pos {
            return Vec::new();
        }
        stroke.add_point(pos);
        vec![CanvasCommand::PaintSegment {
            from,
            to: pos,
            color: stroke.color(),
            width: stroke.thickness(),
        }]
    }

    fn on_pointer_up(&mut self, _pos: Pos2, _ctx: &ToolContext) -> Vec<CanvasCommand> {
        match std::mem::replace(&mut self.state, FreehandState::Idle) {
            FreehandState::Drawing { stroke } => {
                log::debug!("{} stroke finished with {} points", self.name(), stroke.points().len());
                vec![CanvasCommand::RecordHistory]
            }
            FreehandState::Idle => Vec::new(),
        }
    }

    fn current_state_name(&self) -> &'static str {
        match self.state {
            FreehandState::Idle => "Idle",
            FreehandState::Drawing { .. } => "Drawing",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::ToolConfig;
    use egui::pos2;

    fn ctx() -> ToolContext {
        ToolContext {
            config: ToolConfig {
                stroke_color: Color32::RED,
                stroke_width: 6.0,
                ..ToolConfig::default()
            },
            background: Color32::WHITE,
        }
    }

    #[test]
    fn brush_paints_each_move() {
        let mut tool = FreehandTool::brush();
        assert!(tool.on_pointer_down(pos2(0.0, 0.0), &ctx()).is_empty());
        let commands = tool.on_pointer_move(pos2(5.0, 0.0), &ctx());
        assert_eq!(
            commands,
            vec![CanvasCommand::PaintSegment {
                from: pos2(0.0, 0.0),
                to: pos2(5.0, 0.0),
                color: Color32::RED,
                width: 6.0,
            }]
        );
        assert_eq!(tool.on_pointer_up(pos2(5.0, 0.0), &ctx()), vec![CanvasCommand::RecordHistory]);
        assert_eq!(tool.current_state_name(), "Idle");
    }

    #[test]
    fn eraser_paints_background() {
        let mut tool = FreehandTool::eraser();
        tool.on_pointer_down(pos2(0.0, 0.0), &ctx());
        let commands = tool.on_pointer_move(pos2(1.0, 1.0), &ctx());
        assert!(matches!(
            commands.as_slice(),
            [CanvasCommand::PaintSegment { color: Color32::WHITE, .. }]
        ));
    }

    #[test]
    fn move_without_press_does_nothing() {
        let mut tool = FreehandTool::brush();
        assert!(tool.on_pointer_move(pos2(1.0, 1.0), &ctx()).is_empty());
        assert!(tool.on_pointer_up(pos2(1.0, 1.0), &ctx()).is_empty());
    }
}
