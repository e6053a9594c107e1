use std::path::Path;

use egui::{Align2, Color32, Context, DroppedFile, FontId, Id, LayerId, Order};

/// An image file dropped onto the window, read into memory
#[derive(Debug, Clone)]
pub struct DroppedImage {
    pub name: String,
    pub bytes: Vec<u8>,
}

/// Collects image files dropped onto the window
#[derive(Default)]
pub struct FileHandler {
    dropped_files: Vec<DroppedFile>,
}

impl FileHandler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true if files were dropped this frame
    pub fn check_for_dropped_files(&mut self, ctx: &Context) -> bool {
        ctx.input(|i| {
            if i.raw.dropped_files.is_empty() {
                false
            } else {
                self.dropped_files = i.raw.dropped_files.clone();
                true
            }
        })
    }

    /// Reads the pending dropped files; non-image files are skipped
    pub fn take_dropped_images(&mut self) -> Vec<DroppedImage> {
        std::mem::take(&mut self.dropped_files)
            .into_iter()
            .filter_map(|file| {
                let name = display_name(&file);
                if !is_image_file(&file) {
                    log::warn!("Dropped file is not a supported type: {name}");
                    return None;
                }
                read_bytes(&file, &name).map(|bytes| {
                    log::info!("Dropped image {name} ({} bytes)", bytes.len());
                    DroppedImage { name, bytes }
                })
            })
            .collect()
    }

    /// Darkens the window while files hover over it
    pub fn preview_files_being_dropped(&self, ctx: &Context) {
        let hovering = ctx.input(|i| !i.raw.hovered_files.is_empty());
        if !hovering {
            return;
        }
        let painter = ctx.layer_painter(LayerId::new(Order::Foreground, Id::new("file_drop_target")));
        let screen_rect = ctx.screen_rect();
        painter.rect_filled(screen_rect, 0.0, Color32::from_black_alpha(192));
        painter.text(
            screen_rect.center(),
            Align2::CENTER_CENTER,
            "Drop an image to open it",
            FontId::proportional(24.0),
            Color32::WHITE,
        );
    }
}

fn display_name(file: &DroppedFile) -> String {
    match &file.path {
        Some(path) => path.display().to_string(),
        None if !file.name.is_empty() => file.name.clone(),
        None => "unknown".to_owned(),
    }
}

fn read_bytes(file: &DroppedFile, name: &str) -> Option<Vec<u8>> {
    if let Some(bytes) = &file.bytes {
        return Some(bytes.to_vec());
    }
    let path = file.path.as_ref()?;
    match std::fs::read(path) {
        Ok(bytes) => Some(bytes),
        Err(err) => {
            log::error!("Failed to read dropped file {name}: {err}");
            None
        }
    }
}

/// By MIME type when known, otherwise by extension
pub fn is_image_file(file: &DroppedFile) -> bool {
    if !file.mime.is_empty() {
        return file.mime.starts_with("image/");
    }
    file.path.as_deref().is_some_and(has_image_extension)
}

pub fn has_image_extension(path: &Path) -> bool {
    path.extension()
        .map(|ext| ext.to_string_lossy().to_lowercase())
        .is_some_and(|ext| matches!(ext.as_str(), "png" | "jpg" | "jpeg" | "bmp" | "gif" | "webp"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn mime_type_wins_over_extension() {
        let file = DroppedFile {
            path: Some(PathBuf::from("notes.png")),
            mime: "text/plain".to_owned(),
            ..Default::default()
        };
        assert!(!is_image_file(&file));
    }

    #[test]
    fn extension_is_case_insensitive() {
        assert!(has_image_extension(Path::new("formula.JPG")));
        assert!(!has_image_extension(Path::new("formula")));
    }

    #[test]
    fn in_memory_files_are_taken_once() {
        let mut handler = FileHandler::new();
        handler.dropped_files.push(DroppedFile {
            name: "drop.png".to_owned(),
            mime: "image/png".to_owned(),
            bytes: Some(vec![1, 2, 3].into()),
            ..Default::default()
        });
        let images = handler.take_dropped_images();
        assert_eq!(images.len(), 1);
        assert_eq!(images[0].bytes, vec![1, 2, 3]);
        assert!(handler.take_dropped_images().is_empty());
    }
}
