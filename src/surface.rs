//! Pixel buffer the canvas paints into.

use std::path::Path;
use std::sync::Arc;

use egui::{Color32, ColorImage, Pos2, Rect};
use image::{DynamicImage, Rgba, RgbaImage, imageops};

use crate::error::SurfaceIoError;
use crate::geometry::PixelRect;
use crate::geometry::hit_testing::{distance_to_segment, point_in_polygon};
use crate::stroke::{ShapePath, ShapeStyle};

pub(crate) fn to_rgba(color: Color32) -> Rgba<u8> {
    Rgba(color.to_srgba_unmultiplied())
}

/// Immutable copy of the surface pixels
#[derive(Clone, Debug, PartialEq)]
pub struct Snapshot(Arc<RgbaImage>);

impl Snapshot {
    pub fn pixels(&self) -> &RgbaImage {
        &self.0
    }

    pub fn width(&self) -> u32 {
        self.0.width()
    }

    pub fn height(&self) -> u32 {
        self.0.height()
    }
}

/// Fixed-size RGBA raster with a background color used for clearing
pub struct RasterSurface {
    pixels: RgbaImage,
    background: Color32,
}

impl RasterSurface {
    pub fn new(width: u32, height: u32, background: Color32) -> Self {
        Self {
            pixels: RgbaImage::from_pixel(width, height, to_rgba(background)),
            background,
        }
    }

    pub fn width(&self) -> u32 {
        self.pixels.width()
    }

    pub fn height(&self) -> u32 {
        self.pixels.height()
    }

    pub fn background(&self) -> Color32 {
        self.background
    }

    pub fn pixels(&self) -> &RgbaImage {
        &self.pixels
    }

    pub fn pixel(&self, x: u32, y: u32) -> Option<Color32> {
        (x < self.width() && y < self.height()).then(|| {
            let [r, g, b, a] = self.pixels.get_pixel(x, y).0;
            Color32::from_rgba_unmultiplied(r, g, b, a)
        })
    }

    pub fn bounds(&self) -> PixelRect {
        PixelRect::new(0, 0, self.width(), self.height())
    }

    /// Replaces the buffer with one of the new size; old pixels keep their
    /// coordinates and anything past the new edges is dropped
    pub fn resize(&mut self, width: u32, height: u32) {
        if (width, height) == (self.width(), self.height()) {
            return;
        }
        let mut resized = RgbaImage::from_pixel(width, height, to_rgba(self.background));
        imageops::replace(&mut resized, &self.pixels, 0, 0);
        self.pixels = resized;
    }

    pub fn fill(&mut self, color: Color32) {
        let rgba = to_rgba(color);
        for pixel in self.pixels.pixels_mut() {
            *pixel = rgba;
        }
    }

    /// Overwrites `rect` without blending
    pub fn fill_rect(&mut self, rect: PixelRect, color: Color32) {
        let Some(rect) = rect.clamp_to(self.width(), self.height()) else {
            return;
        };
        let rgba = to_rgba(color);
        for y in rect.y..rect.bottom() {
            for x in rect.x..rect.right() {
                self.pixels.put_pixel(x, y, rgba);
            }
        }
    }

    /// Copy of the pixels under `rect`, clamped to the surface
    pub fn crop(&self, rect: PixelRect) -> Option<RgbaImage> {
        let rect = rect.clamp_to(self.width(), self.height())?;
        Some(imageops::crop_imm(&self.pixels, rect.x, rect.y, rect.width, rect.height).to_image())
    }

    /// Pastes `image` with its top-left at (`x`, `y`); off-surface parts are clipped
    pub fn blit(&mut self, image: &RgbaImage, x: i64, y: i64) {
        imageops::replace(&mut self.pixels, image, x, y);
    }

    fn blend(&mut self, x: u32, y: u32, color: Rgba<u8>) {
        let alpha = color.0[3];
        if alpha == 255 {
            self.pixels.put_pixel(x, y, color);
            return;
        }
        if alpha == 0 {
            return;
        }
        let dst = self.pixels.get_pixel_mut(x, y);
        let a = f32::from(alpha) / 255.0;
        let dst_a = f32::from(dst.0[3]) / 255.0;
        let out_a = a + dst_a * (1.0 - a);
        for i in 0..3 {
            let src = f32::from(color.0[i]) * a;
            let under = f32::from(dst.0[i]) * dst_a * (1.0 - a);
            dst.0[i] = ((src + under) / out_a).round().clamp(0.0, 255.0) as u8;
        }
        dst.0[3] = (out_a * 255.0).round() as u8;
    }

    /// Pixel range covering `rect`, clamped to the surface
    fn covered(&self, rect: Rect) -> Option<(u32, u32, u32, u32)> {
        let x0 = rect.min.x.floor().max(0.0) as u32;
        let y0 = rect.min.y.floor().max(0.0) as u32;
        let x1 = (rect.max.x.ceil().max(0.0) as u32).min(self.width());
        let y1 = (rect.max.y.ceil().max(0.0) as u32).min(self.height());
        (x0 < x1 && y0 < y1).then_some((x0, y0, x1, y1))
    }

    /// Paints a round-capped segment of the given width
    pub fn stroke_segment(&mut self, from: Pos2, to: Pos2, color: Color32, width: f32) {
        let radius = (width / 2.0).max(0.5);
        let bounds = Rect::from_two_pos(from, to).expand(radius + 1.0);
        let Some((x0, y0, x1, y1)) = self.covered(bounds) else {
            return;
        };
        let rgba = to_rgba(color);
        for y in y0..y1 {
            for x in x0..x1 {
                let center = Pos2::new(x as f32 + 0.5, y as f32 + 0.5);
                if distance_to_segment(center, from, to) <= radius {
                    self.blend(x, y, rgba);
                }
            }
        }
    }

    pub fn stroke_polyline(&mut self, points: &[Pos2], closed: bool, color: Color32, width: f32) {
        match points {
            [] => {}
            [single] => self.stroke_segment(*single, *single, color, width),
            _ => {
                for pair in points.windows(2) {
                    self.stroke_segment(pair[0], pair[1], color, width);
                }
                if closed {
                    if let (Some(first), Some(last)) = (points.first(), points.last()) {
                        self.stroke_segment(*last, *first, color, width);
                    }
                }
            }
        }
    }

    pub fn fill_polygon(&mut self, points: &[Pos2], color: Color32) {
        if points.len() < 3 || color.a() == 0 {
            return;
        }
        let bounds = points
            .iter()
            .fold(Rect::NOTHING, |rect, p| rect.union(Rect::from_min_max(*p, *p)));
        let Some((x0, y0, x1, y1)) = self.covered(bounds) else {
            return;
        };
        let rgba = to_rgba(color);
        for y in y0..y1 {
            for x in x0..x1 {
                if point_in_polygon(Pos2::new(x as f32 + 0.5, y as f32 + 0.5), points) {
                    self.blend(x, y, rgba);
                }
            }
        }
    }

    /// Fill first, then the outline on top
    pub fn draw_shape(&mut self, path: &ShapePath, style: &ShapeStyle) {
        let outline = path.outline();
        if path.is_closed() {
            self.fill_polygon(&outline, style.fill);
        }
        self.stroke_polyline(&outline, path.is_closed(), style.stroke, style.width);
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot(Arc::new(self.pixels.clone()))
    }

    /// Shows `snapshot` at the current size, anchored top-left
    pub fn restore(&mut self, snapshot: &Snapshot) {
        if (snapshot.width(), snapshot.height()) == (self.width(), self.height()) {
            self.pixels = snapshot.pixels().clone();
        } else {
            self.fill(self.background);
            self.blit(snapshot.pixels(), 0, 0);
        }
    }

    pub fn to_color_image(&self) -> ColorImage {
        ColorImage::from_rgba_unmultiplied(
            [self.width() as usize, self.height() as usize],
            self.pixels.as_raw(),
        )
    }

    /// Clears to background and places `image` at the top-left
    pub fn replace_content(&mut self, image: &RgbaImage) {
        self.fill(self.background);
        self.blit(image, 0, 0);
    }

    /// Loads an image file; on failure the surface is untouched
    pub fn load(&mut self, path: &Path) -> Result<(), SurfaceIoError> {
        let image = image::open(path).map_err(|source| SurfaceIoError::Load {
            path: path.to_path_buf(),
            source,
        })?;
        self.replace_content(&image.to_rgba8());
        Ok(())
    }

    pub fn load_from_memory(&mut self, bytes: &[u8]) -> Result<(), SurfaceIoError> {
        let image = image::load_from_memory(bytes)?;
        self.replace_content(&image.to_rgba8());
        Ok(())
    }

    /// Writes the surface; the file extension picks the format
    pub fn save(&self, path: &Path) -> Result<(), SurfaceIoError> {
        // JPEG and BMP have no alpha channel, the canvas is opaque anyway
        DynamicImage::ImageRgba8(self.pixels.clone())
            .to_rgb8()
            .save(path)
            .map_err(|source| SurfaceIoError::Save {
                path: path.to_path_buf(),
                source,
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use egui::pos2;

    #[test]
    fn resize_keeps_top_left_content() {
        let mut surface = RasterSurface::new(10, 10, Color32::WHITE);
        surface.fill_rect(PixelRect::new(0, 0, 2, 2), Color32::RED);
        surface.fill_rect(PixelRect::new(8, 8, 2, 2), Color32::BLUE);

        surface.resize(20, 5);
        assert_eq!(surface.pixel(1, 1), Some(Color32::RED));
        assert_eq!(surface.pixel(15, 2), Some(Color32::WHITE));

        surface.resize(10, 10);
        // Lost when the surface was only 5 pixels high
        assert_eq!(surface.pixel(9, 9), Some(Color32::WHITE));
    }

    #[test]
    fn stroke_segment_covers_its_width() {
        let mut surface = RasterSurface::new(20, 20, Color32::WHITE);
        surface.stroke_segment(pos2(2.0, 10.0), pos2(18.0, 10.0), Color32::BLACK, 4.0);
        assert_eq!(surface.pixel(10, 9), Some(Color32::BLACK));
        assert_eq!(surface.pixel(10, 14), Some(Color32::WHITE));
    }

    #[test]
    fn transparent_fill_paints_nothing() {
        let mut surface = RasterSurface::new(10, 10, Color32::WHITE);
        let square = [pos2(0.0, 0.0), pos2(10.0, 0.0), pos2(10.0, 10.0), pos2(0.0, 10.0)];
        surface.fill_polygon(&square, Color32::TRANSPARENT);
        assert_eq!(surface.pixel(5, 5), Some(Color32::WHITE));
    }

    #[test]
    fn restore_into_larger_surface() {
        let mut surface = RasterSurface::new(4, 4, Color32::WHITE);
        surface.fill(Color32::RED);
        let snapshot = surface.snapshot();
        surface.resize(8, 8);
        surface.fill(Color32::BLUE);
        surface.restore(&snapshot);
        assert_eq!(surface.pixel(3, 3), Some(Color32::RED));
        assert_eq!(surface.pixel(6, 6), Some(Color32::WHITE));
    }
}
