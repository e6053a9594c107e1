use egui::Pos2;

use crate::stroke::{ShapeKind, ShapePath};
use crate::tools::{CanvasCommand, Tool, ToolContext};

#[derive(Debug, Clone)]
pub enum ShapeState {
    Idle,
    Dragging { path: ShapePath },
}

/// Rectangle, ellipse, line and triangle. The outline follows the pointer
/// and is only painted on release.
#[derive(Debug, Clone)]
pub struct ShapeTool {
    kind: ShapeKind,
    state: ShapeState,
}

impl ShapeTool {
    pub fn new(kind: ShapeKind) -> Self {
        Self {
            kind,
            state: ShapeState::Idle,
        }
    }
}

impl Tool for ShapeTool {
    fn name(&self) -> &'static str {
        match self.kind {
            ShapeKind::Rectangle => "Rectangle",
            ShapeKind::Ellipse => "Ellipse",
            ShapeKind::Line => "Line",
            ShapeKind::Triangle => "Triangle",
        }
    }

    fn deactivate(&mut self) {
        self.state = ShapeState::Idle;
    }

    fn on_pointer_down(&mut self, pos: Pos2, _ctx: &ToolContext) -> Vec<CanvasCommand> {
        self.state = ShapeState::Dragging {
            path: ShapePath::new(self.kind, pos),
        };
        Vec::new()
    }

    fn on_pointer_move(&mut self, pos: Pos2, _ctx: &ToolContext) -> Vec<CanvasCommand> {
        if let ShapeState::Dragging { path } = &mut self.state {
            path.update(pos);
        }
        Vec::new()
    }

    fn on_pointer_up(&mut self, pos: Pos2, ctx: &ToolContext) -> Vec<CanvasCommand> {
        let ShapeState::Dragging { mut path } = std::mem::replace(&mut self.state, ShapeState::Idle)
        else {
            return Vec::new();
        };
        path.update(pos);
        vec![
            CanvasCommand::CommitShape {
                path,
                style: ctx.config.shape_style(),
            },
            CanvasCommand::RecordHistory,
        ]
    }

    fn preview(&self) -> Option<&ShapePath> {
        match &self.state {
            ShapeState::Dragging { path } => Some(path),
            ShapeState::Idle => None,
        }
    }

    fn current_state_name(&self) -> &'static str {
        match self.state {
            ShapeState::Idle => "Idle",
            ShapeState::Dragging { .. } => "Dragging",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::ToolConfig;
    use egui::{Color32, pos2};

    #[test]
    fn release_commits_with_current_style() {
        let ctx = ToolContext {
            config: ToolConfig {
                fill_color: Color32::YELLOW,
                ..ToolConfig::default()
            },
            background: Color32::WHITE,
        };
        let mut tool = ShapeTool::new(ShapeKind::Ellipse);
        tool.on_pointer_down(pos2(10.0, 10.0), &ctx);
        tool.on_pointer_move(pos2(20.0, 15.0), &ctx);
        assert_eq!(tool.preview().map(|p| p.current()), Some(pos2(20.0, 15.0)));

        let commands = tool.on_pointer_up(pos2(30.0, 30.0), &ctx);
        match commands.as_slice() {
            [CanvasCommand::CommitShape { path, style }, CanvasCommand::RecordHistory] => {
                assert_eq!(path.current(), pos2(30.0, 30.0));
                assert_eq!(style.fill, Color32::YELLOW);
            }
            other => panic!("unexpected commands {other:?}"),
        }
        assert!(tool.preview().is_none());
    }
}
