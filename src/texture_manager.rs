use egui::{ColorImage, Context, TextureHandle, TextureId, TextureOptions};

/// GPU copy of the canvas surface, re-uploaded only when its revision changes
#[derive(Default)]
pub struct CanvasTexture {
    handle: Option<TextureHandle>,
    revision: Option<u64>,
    uploads: usize,
}

impl CanvasTexture {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the texture for `revision`, building the image only when stale
    pub fn get_or_update<F>(&mut self, ctx: &Context, revision: u64, generator: F) -> TextureId
    where
        F: FnOnce() -> ColorImage,
    {
        if let (Some(handle), Some(current)) = (&self.handle, self.revision) {
            if current == revision {
                return handle.id();
            }
        }

        let image = generator();
        self.uploads += 1;
        self.revision = Some(revision);
        match &mut self.handle {
            Some(handle) => {
                handle.set(image, TextureOptions::NEAREST);
                handle.id()
            }
            None => {
                let handle = ctx.load_texture("canvas_surface", image, TextureOptions::NEAREST);
                let id = handle.id();
                self.handle = Some(handle);
                id
            }
        }
    }

    /// Forces the next call to upload again
    pub fn invalidate(&mut self) {
        self.revision = None;
    }

    pub fn upload_count(&self) -> usize {
        self.uploads
    }
}
