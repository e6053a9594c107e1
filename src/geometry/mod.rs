pub mod hit_testing;

use egui::{Pos2, Rect, pos2};

/// Axis-aligned rectangle in whole pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PixelRect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl PixelRect {
    pub fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Rounds the corners of `rect` to pixel boundaries; negative parts are cut off
    pub fn from_rect(rect: Rect) -> Self {
        let min_x = rect.min.x.round().max(0.0);
        let min_y = rect.min.y.round().max(0.0);
        let max_x = rect.max.x.round().max(min_x);
        let max_y = rect.max.y.round().max(min_y);
        Self {
            x: min_x as u32,
            y: min_y as u32,
            width: (max_x - min_x) as u32,
            height: (max_y - min_y) as u32,
        }
    }

    /// The part of this rectangle inside a `width` × `height` surface
    pub fn clamp_to(self, width: u32, height: u32) -> Option<Self> {
        if self.x >= width || self.y >= height {
            return None;
        }
        let clamped = Self {
            width: self.width.min(width - self.x),
            height: self.height.min(height - self.y),
            ..self
        };
        (!clamped.is_empty()).then_some(clamped)
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    pub fn right(&self) -> u32 {
        self.x + self.width
    }

    pub fn bottom(&self) -> u32 {
        self.y + self.height
    }

    /// Center in integer pixels, rounded down like the widget toolkit does
    pub fn center(&self) -> (i64, i64) {
        (
            i64::from(self.x) + i64::from(self.width) / 2,
            i64::from(self.y) + i64::from(self.height) / 2,
        )
    }

    pub fn to_rect(&self) -> Rect {
        Rect::from_min_max(
            pos2(self.x as f32, self.y as f32),
            pos2(self.right() as f32, self.bottom() as f32),
        )
    }

    pub fn contains(&self, pos: Pos2) -> bool {
        self.to_rect().contains(pos)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rounds_and_drops_negative_parts() {
        let rect = Rect::from_min_max(pos2(-4.0, 2.4), pos2(10.6, 20.0));
        assert_eq!(PixelRect::from_rect(rect), PixelRect::new(0, 2, 11, 18));
    }

    #[test]
    fn clamp_to_surface() {
        let rect = PixelRect::new(90, 50, 20, 20);
        assert_eq!(rect.clamp_to(100, 60), Some(PixelRect::new(90, 50, 10, 10)));
        assert_eq!(rect.clamp_to(80, 60), None);
    }
}
