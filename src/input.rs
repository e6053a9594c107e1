use egui::{Context, PointerButton, Pos2, Rect};

const BUTTONS: [PointerButton; 3] = [
    PointerButton::Primary,
    PointerButton::Secondary,
    PointerButton::Middle,
];

/// Where an input event happened, in canvas pixels
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InputLocation {
    /// Position relative to the canvas top-left
    pub position: Pos2,
    pub is_in_canvas: bool,
}

/// Pointer events the canvas reacts to
#[derive(Debug, Clone, PartialEq)]
pub enum InputEvent {
    PointerDown {
        location: InputLocation,
        button: PointerButton,
    },
    PointerUp {
        location: InputLocation,
        button: PointerButton,
    },
    PointerMove {
        location: InputLocation,
        /// Buttons down during the move
        held_buttons: Vec<PointerButton>,
    },
    PointerLeave,
}

impl InputEvent {
    pub fn location(&self) -> Option<InputLocation> {
        match self {
            InputEvent::PointerDown { location, .. }
            | InputEvent::PointerUp { location, .. }
            | InputEvent::PointerMove { location, .. } => Some(*location),
            InputEvent::PointerLeave => None,
        }
    }

    pub fn is_in_canvas(&self) -> bool {
        self.location().is_some_and(|location| location.is_in_canvas)
    }
}

/// Turns egui's per-frame pointer state into [`InputEvent`]s
#[derive(Debug)]
pub struct InputHandler {
    last_hover: Option<Pos2>,
    canvas_rect: Rect,
}

impl InputHandler {
    pub fn new(canvas_rect: Rect) -> Self {
        Self {
            last_hover: None,
            canvas_rect,
        }
    }

    /// The canvas moved or was resized on screen
    pub fn set_canvas_rect(&mut self, rect: Rect) {
        self.canvas_rect = rect;
    }

    fn make_location(&self, screen_pos: Pos2) -> InputLocation {
        InputLocation {
            position: (screen_pos - self.canvas_rect.min).to_pos2(),
            is_in_canvas: self.canvas_rect.contains(screen_pos),
        }
    }

    pub fn process_input(&mut self, ctx: &Context) -> Vec<InputEvent> {
        let mut events = Vec::new();

        ctx.input(|input| {
            let hover = input.pointer.hover_pos();
            match hover {
                Some(pos) if Some(pos) != self.last_hover => {
                    let held_buttons = BUTTONS
                        .into_iter()
                        .filter(|button| input.pointer.button_down(*button))
                        .collect();
                    events.push(InputEvent::PointerMove {
                        location: self.make_location(pos),
                        held_buttons,
                    });
                }
                None if self.last_hover.is_some() => events.push(InputEvent::PointerLeave),
                _ => {}
            }

            // Releases outside the window still end a drag at the last known spot
            if let Some(pos) = hover.or(self.last_hover) {
                for button in BUTTONS {
                    if input.pointer.button_pressed(button) {
                        events.push(InputEvent::PointerDown {
                            location: self.make_location(pos),
                            button,
                        });
                    }
                    if input.pointer.button_released(button) {
                        events.push(InputEvent::PointerUp {
                            location: self.make_location(pos),
                            button,
                        });
                    }
                }
            }

            self.last_hover = hover;
        });

        events
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use egui::pos2;

    #[test]
    fn locations_are_canvas_relative() {
        let handler = InputHandler::new(Rect::from_min_size(pos2(100.0, 50.0), egui::vec2(200.0, 100.0)));
        let location = handler.make_location(pos2(110.0, 60.0));
        assert_eq!(location.position, pos2(10.0, 10.0));
        assert!(location.is_in_canvas);
        assert!(!handler.make_location(pos2(10.0, 10.0)).is_in_canvas);
    }

    #[test]
    fn leave_has_no_location() {
        assert!(!InputEvent::PointerLeave.is_in_canvas());
    }
}
