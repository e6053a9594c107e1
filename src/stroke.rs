use egui::{Color32, Pos2, Rect, pos2};
use serde::{Deserialize, Serialize};

use crate::geometry::hit_testing::ellipse_polyline;

// Freehand stroke being drawn
#[derive(Clone, Debug)]
pub struct Stroke {
    points: Vec<Pos2>,
    color: Color32,
    thickness: f32,
}

impl Stroke {
    pub fn new(color: Color32, thickness: f32) -> Self {
        Self {
            points: Vec::new(),
            color,
            thickness,
        }
    }

    pub fn add_point(&mut self, point: Pos2) {
        self.points.push(point);
    }

    pub fn points(&self) -> &[Pos2] {
        &self.points
    }

    pub fn last_point(&self) -> Option<Pos2> {
        self.points.last().copied()
    }

    pub fn color(&self) -> Color32 {
        self.color
    }

    pub fn thickness(&self) -> f32 {
        self.thickness
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ShapeKind {
    Rectangle,
    Ellipse,
    Line,
    Triangle,
}

/// Pen and brush used when a shape is committed
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShapeStyle {
    pub stroke: Color32,
    pub width: f32,
    /// Fully transparent means no fill
    pub fill: Color32,
}

/// Temporary outline spanned from the press point to the pointer
#[derive(Debug, Clone, PartialEq)]
pub struct ShapePath {
    kind: ShapeKind,
    anchor: Pos2,
    current: Pos2,
}

impl ShapePath {
    pub fn new(kind: ShapeKind, anchor: Pos2) -> Self {
        Self {
            kind,
            anchor,
            current: anchor,
        }
    }

    pub fn update(&mut self, current: Pos2) {
        self.current = current;
    }

    pub fn current(&self) -> Pos2 {
        self.current
    }

    pub fn bounds(&self) -> Rect {
        Rect::from_two_pos(self.anchor, self.current)
    }

    /// Lines are the only open outline
    pub fn is_closed(&self) -> bool {
        self.kind != ShapeKind::Line
    }

    /// Outline vertices; for closed shapes the last vertex joins the first
    pub fn outline(&self) -> Vec<Pos2> {
        let (a, c) = (self.anchor, self.current);
        match self.kind {
            ShapeKind::Line => vec![a, c],
            ShapeKind::Rectangle => {
                let r = self.bounds();
                vec![r.left_top(), r.right_top(), r.right_bottom(), r.left_bottom()]
            }
            ShapeKind::Ellipse => ellipse_polyline(self.bounds()),
            // Apex sits half the horizontal delta across, on the pointer's row
            ShapeKind::Triangle => {
                let dx = c.x - a.x;
                vec![a, pos2(c.x, a.y), pos2(a.x + (dx / 2.0).floor(), c.y)]
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn triangle_apex_on_pointer_row() {
        let mut path = ShapePath::new(ShapeKind::Triangle, pos2(10.0, 10.0));
        path.update(pos2(31.0, 40.0));
        assert_eq!(
            path.outline(),
            vec![pos2(10.0, 10.0), pos2(31.0, 10.0), pos2(20.0, 40.0)]
        );
    }

    #[test]
    fn rectangle_normalizes_drag_direction() {
        let mut path = ShapePath::new(ShapeKind::Rectangle, pos2(30.0, 30.0));
        path.update(pos2(10.0, 20.0));
        assert_eq!(path.outline()[0], pos2(10.0, 20.0));
        assert!(path.is_closed());
    }

    #[test]
    fn line_is_open() {
        let path = ShapePath::new(ShapeKind::Line, pos2(0.0, 0.0));
        assert!(!path.is_closed());
        assert_eq!(path.outline().len(), 2);
    }
}
