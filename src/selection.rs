use egui::{Pos2, Rect};
use image::{Rgba, RgbaImage, imageops};
use image::imageops::FilterType;

use crate::geometry::PixelRect;
use crate::surface::{RasterSurface, to_rgba};

/// Rectangle spanned from the press point to the pointer
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SelectionRegion {
    anchor: Pos2,
    current: Pos2,
}

impl SelectionRegion {
    pub fn new(anchor: Pos2) -> Self {
        Self {
            anchor,
            current: anchor,
        }
    }

    pub fn rect(&self) -> Rect {
        Rect::from_two_pos(self.anchor, self.current)
    }

    /// Bounds in whole pixels, used for cropping
    pub fn pixel_rect(&self) -> PixelRect {
        PixelRect::from_rect(self.rect())
    }

    /// Top-left, top-right, bottom-left, bottom-right and center
    pub fn handles(&self) -> [Pos2; 5] {
        let rect = self.rect();
        [
            rect.left_top(),
            rect.right_top(),
            rect.left_bottom(),
            rect.right_bottom(),
            rect.center(),
        ]
    }

    pub fn contains(&self, pos: Pos2) -> bool {
        self.rect().contains(pos)
    }

    pub fn is_empty(&self) -> bool {
        self.pixel_rect().is_empty()
    }
}

/// The one active selection on the canvas and the edits applied through it
#[derive(Debug, Default, Clone)]
pub struct SelectionManager {
    region: Option<SelectionRegion>,
}

impl SelectionManager {
    pub fn region(&self) -> Option<&SelectionRegion> {
        self.region.as_ref()
    }

    pub fn begin(&mut self, pos: Pos2) {
        self.region = Some(SelectionRegion::new(pos));
    }

    pub fn update(&mut self, pos: Pos2) {
        if let Some(region) = &mut self.region {
            region.current = pos;
        }
    }

    /// Drops the selection when `pos` is outside it; true if one was dropped
    pub fn clear_if_outside(&mut self, pos: Pos2) -> bool {
        match &self.region {
            Some(region) if !region.contains(pos) => {
                self.region = None;
                true
            }
            _ => false,
        }
    }

    pub fn clear(&mut self) {
        self.region = None;
    }

    pub fn is_empty(&self) -> bool {
        self.region.is_none_or(|region| region.is_empty())
    }

    pub fn contains(&self, pos: Pos2) -> bool {
        self.region.is_some_and(|region| region.contains(pos))
    }

    /// Pixel bounds of the selection clipped to `surface`
    fn bounds_on(&self, surface: &RasterSurface) -> Option<PixelRect> {
        self.region?
            .pixel_rect()
            .clamp_to(surface.width(), surface.height())
    }

    pub fn crop(&self, surface: &RasterSurface) -> Option<RgbaImage> {
        surface.crop(self.bounds_on(surface)?)
    }

    /// Resizes the selected pixels by `factor`, anchored at the selection's
    /// top-left. Returns false when there was nothing to change.
    pub fn scale(&self, surface: &mut RasterSurface, factor: f32) -> bool {
        let Some(bounds) = self.bounds_on(surface) else {
            return false;
        };
        if !factor.is_finite() || factor <= 0.0 {
            log::warn!("ignoring invalid scale factor {factor}");
            return false;
        }
        let width = ((bounds.width as f32 * factor) as u32).max(1);
        let height = ((bounds.height as f32 * factor) as u32).max(1);
        if (width, height) == (bounds.width, bounds.height) {
            return false;
        }
        let Some(region) = surface.crop(bounds) else {
            return false;
        };

        let scaled = imageops::resize(&region, width, height, FilterType::Triangle);
        surface.fill_rect(bounds, surface.background());
        surface.blit(&scaled, i64::from(bounds.x), i64::from(bounds.y));
        true
    }

    /// Rotates the selected pixels clockwise by `degrees` around the
    /// selection's center. The result may spill past the selection.
    /// Whole turns change nothing and return false.
    pub fn rotate(&self, surface: &mut RasterSurface, degrees: i32) -> bool {
        if degrees.rem_euclid(360) == 0 {
            return false;
        }
        let Some(bounds) = self.bounds_on(surface) else {
            return false;
        };
        let Some(region) = surface.crop(bounds) else {
            return false;
        };

        let rotated = rotate_image(&region, degrees, to_rgba(surface.background()));
        let (cx, cy) = bounds.center();
        surface.fill_rect(bounds, surface.background());
        surface.blit(
            &rotated,
            cx - i64::from(rotated.width()) / 2,
            cy - i64::from(rotated.height()) / 2,
        );
        true
    }
}

/// Clockwise rotation; corners uncovered by the source get `background`
pub fn rotate_image(image: &RgbaImage, degrees: i32, background: Rgba<u8>) -> RgbaImage {
    match degrees.rem_euclid(360) {
        0 => return image.clone(),
        90 => return imageops::rotate90(image),
        180 => return imageops::rotate180(image),
        270 => return imageops::rotate270(image),
        _ => {}
    }

    let radians = (degrees as f64).to_radians();
    let (sin, cos) = radians.sin_cos();
    let (w, h) = (f64::from(image.width()), f64::from(image.height()));
    let out_w = (w * cos.abs() + h * sin.abs()).round().max(1.0) as u32;
    let out_h = (w * sin.abs() + h * cos.abs()).round().max(1.0) as u32;

    let (src_cx, src_cy) = (w / 2.0, h / 2.0);
    let (dst_cx, dst_cy) = (f64::from(out_w) / 2.0, f64::from(out_h) / 2.0);

    RgbaImage::from_fn(out_w, out_h, |x, y| {
        // Inverse map each destination pixel center back into the source
        let dx = f64::from(x) + 0.5 - dst_cx;
        let dy = f64::from(y) + 0.5 - dst_cy;
        let sx = cos * dx + sin * dy + src_cx;
        let sy = -sin * dx + cos * dy + src_cy;
        if sx < 0.0 || sy < 0.0 || sx >= w || sy >= h {
            background
        } else {
            *image.get_pixel(sx as u32, sy as u32)
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use egui::{Color32, pos2};

    fn selection(from: Pos2, to: Pos2) -> SelectionManager {
        let mut manager = SelectionManager::default();
        manager.begin(from);
        manager.update(to);
        manager
    }

    #[test]
    fn handles_are_corners_then_center() {
        let mut region = SelectionRegion::new(pos2(10.0, 10.0));
        region.current = pos2(0.0, 0.0);
        assert_eq!(
            region.handles(),
            [
                pos2(0.0, 0.0),
                pos2(10.0, 0.0),
                pos2(0.0, 10.0),
                pos2(10.0, 10.0),
                pos2(5.0, 5.0)
            ]
        );
    }

    #[test]
    fn click_inside_keeps_selection() {
        let mut manager = selection(pos2(0.0, 0.0), pos2(10.0, 10.0));
        assert!(!manager.clear_if_outside(pos2(5.0, 5.0)));
        assert!(manager.clear_if_outside(pos2(50.0, 5.0)));
        assert!(manager.is_empty());
    }

    #[test]
    fn zero_area_selection_is_empty() {
        let manager = selection(pos2(3.0, 3.0), pos2(3.0, 40.0));
        assert!(manager.is_empty());
        assert!(manager.crop(&RasterSurface::new(50, 50, Color32::WHITE)).is_none());
    }

    #[test]
    fn quarter_turn_swaps_dimensions() {
        let image = RgbaImage::from_pixel(6, 2, Rgba([0, 0, 0, 255]));
        let rotated = rotate_image(&image, -90, Rgba([255; 4]));
        assert_eq!(rotated.dimensions(), (2, 6));
    }

    #[test]
    fn diagonal_rotation_grows_bounds() {
        let image = RgbaImage::from_pixel(10, 10, Rgba([0, 0, 0, 255]));
        let rotated = rotate_image(&image, 45, Rgba([255; 4]));
        assert_eq!(rotated.dimensions(), (14, 14));
        assert_eq!(*rotated.get_pixel(0, 0), Rgba([255; 4]));
        assert_eq!(*rotated.get_pixel(7, 7), Rgba([0, 0, 0, 255]));
    }

    #[test]
    fn rotate_clears_original_rectangle() {
        let mut surface = RasterSurface::new(40, 40, Color32::WHITE);
        // A 20x4 bar turned upright leaves its ends blank
        surface.fill_rect(PixelRect::new(10, 18, 20, 4), Color32::BLACK);
        let manager = selection(pos2(10.0, 18.0), pos2(30.0, 22.0));
        assert!(manager.rotate(&mut surface, 90));
        assert_eq!(surface.pixel(11, 19), Some(Color32::WHITE));
        assert_eq!(surface.pixel(20, 11), Some(Color32::BLACK));
    }
}
