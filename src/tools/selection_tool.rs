use egui::Pos2;

use crate::tools::{CanvasCommand, Tool, ToolContext};

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SelectionState {
    Idle,
    Selecting { start_pos: Pos2 },
}

/// Drags out the rectangular selection. Recognition on right-button release
/// is handled by the canvas, which knows which button was used.
#[derive(Debug, Clone)]
pub struct SelectionTool {
    state: SelectionState,
}

impl Default for SelectionTool {
    fn default() -> Self {
        Self::new()
    }
}

impl SelectionTool {
    pub fn new() -> Self {
        Self {
            state: SelectionState::Idle,
        }
    }

    pub fn is_dragging(&self) -> bool {
        matches!(self.state, SelectionState::Selecting { .. })
    }
}

impl Tool for SelectionTool {
    fn name(&self) -> &'static str {
        "Select"
    }

    fn deactivate(&mut self) {
        self.state = SelectionState::Idle;
    }

    fn on_pointer_down(&mut self, pos: Pos2, _ctx: &ToolContext) -> Vec<CanvasCommand> {
        self.state = SelectionState::Selecting { start_pos: pos };
        vec![CanvasCommand::BeginSelection(pos)]
    }

    fn on_pointer_move(&mut self, pos: Pos2, _ctx: &ToolContext) -> Vec<CanvasCommand> {
        match self.state {
            SelectionState::Selecting { start_pos } => vec![CanvasCommand::UpdateSelection {
                anchor: start_pos,
                current: pos,
            }],
            SelectionState::Idle => Vec::new(),
        }
    }

    fn on_pointer_up(&mut self, _pos: Pos2, _ctx: &ToolContext) -> Vec<CanvasCommand> {
        self.state = SelectionState::Idle;
        Vec::new()
    }

    fn current_state_name(&self) -> &'static str {
        match self.state {
            SelectionState::Idle => "Idle",
            SelectionState::Selecting { .. } => "Selecting",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::ToolConfig;
    use egui::{Color32, pos2};

    #[test]
    fn drag_reports_anchor_and_pointer() {
        let ctx = ToolContext {
            config: ToolConfig::default(),
            background: Color32::WHITE,
        };
        let mut tool = SelectionTool::new();
        assert_eq!(
            tool.on_pointer_down(pos2(4.0, 4.0), &ctx),
            vec![CanvasCommand::BeginSelection(pos2(4.0, 4.0))]
        );
        assert_eq!(
            tool.on_pointer_move(pos2(9.0, 12.0), &ctx),
            vec![CanvasCommand::UpdateSelection {
                anchor: pos2(4.0, 4.0),
                current: pos2(9.0, 12.0),
            }]
        );
        tool.on_pointer_up(pos2(9.0, 12.0), &ctx);
        assert!(!tool.is_dragging());
    }
}
