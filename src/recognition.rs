//! Formula recognition: crop the selection, read it as LaTeX, classify and solve.
//!
//! Recognition is slow, so [`RecognitionPipeline::spawn`] runs it on a worker
//! thread against a frozen copy of the selection. The UI polls the returned
//! [`RecognitionJob`] each frame.

use std::path::{Path, PathBuf};
use std::process::Command;
use std::sync::Arc;

use futures::channel::oneshot;
use image::RgbaImage;
use uuid::Uuid;

use crate::canvas::DrawingCanvas;
use crate::classify::{Category, classify};
use crate::config::IMAGE_PLACEHOLDER;
use crate::dispatch::{OutputFormat, SolveDispatcher, SolveResult};
use crate::error::{FormulaError, FormulaResult};
use crate::math::SymbolicEngine;

/// Reads a bitmap and returns the LaTeX it shows, possibly empty
pub trait FormulaRecognizer: Send + Sync {
    fn recognize(&self, image: &RgbaImage) -> FormulaResult<String>;
}

/// Runs an external program on the crop saved as a temporary PNG and reads
/// the LaTeX from its standard output
#[derive(Debug, Clone)]
pub struct CommandRecognizer {
    command: Vec<String>,
}

impl CommandRecognizer {
    /// `command[0]` is the program; `{image}` in any argument becomes the PNG path
    pub fn new(command: Vec<String>) -> Self {
        Self { command }
    }

    fn arguments(&self, image_path: &Path) -> Vec<String> {
        let path = image_path.to_string_lossy();
        self.command
            .iter()
            .skip(1)
            .map(|arg| arg.replace(IMAGE_PLACEHOLDER, &path))
            .collect()
    }

    fn run(&self, image_path: &Path) -> FormulaResult<String> {
        let Some(program) = self.command.first() else {
            return Err(FormulaError::Recognizer("no recognizer command configured".into()));
        };
        let output = Command::new(program)
            .args(self.arguments(image_path))
            .output()
            .map_err(|err| FormulaError::Recognizer(format!("could not run {program}: {err}")))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(FormulaError::Recognizer(format!(
                "{program} exited with {}: {}",
                output.status,
                stderr.trim()
            )));
        }
        Ok(clean_recognizer_output(&String::from_utf8_lossy(&output.stdout)))
    }
}

impl FormulaRecognizer for CommandRecognizer {
    fn recognize(&self, image: &RgbaImage) -> FormulaResult<String> {
        let path: PathBuf = std::env::temp_dir().join(format!("formula-canvas-{}.png", Uuid::new_v4()));
        image
            .save(&path)
            .map_err(|err| FormulaError::Recognizer(format!("could not write {}: {err}", path.display())))?;

        let result = self.run(&path);
        if let Err(err) = std::fs::remove_file(&path) {
            log::debug!("could not remove {}: {err}", path.display());
        }
        result
    }
}

/// Trims whitespace and math-mode dollar delimiters
pub fn clean_recognizer_output(text: &str) -> String {
    text.trim().trim_matches('$').trim().to_owned()
}

/// Everything shown for one recognition
#[derive(Debug, Clone, PartialEq)]
pub struct RecognitionOutcome {
    pub id: Uuid,
    pub latex: String,
    pub category: Category,
    pub result: SolveResult,
    /// Format chosen when the recognition was requested
    pub format: OutputFormat,
}

impl RecognitionOutcome {
    pub fn failed(id: Uuid, err: FormulaError) -> Self {
        Self {
            id,
            latex: String::new(),
            category: Category::Calculation,
            result: SolveResult::Error(err),
            format: OutputFormat::default(),
        }
    }

    /// The result in the format it was requested in
    pub fn rendered(&self) -> String {
        self.result.render(self.format)
    }
}

/// A recognition running on a worker thread
pub struct RecognitionJob {
    id: Uuid,
    receiver: oneshot::Receiver<RecognitionOutcome>,
}

impl RecognitionJob {
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// The outcome once the worker is done; `None` while it is still running
    pub fn try_take(&mut self) -> Option<RecognitionOutcome> {
        match self.receiver.try_recv() {
            Ok(outcome) => outcome,
            Err(oneshot::Canceled) => Some(RecognitionOutcome::failed(
                self.id,
                FormulaError::Recognizer("recognition worker stopped unexpectedly".into()),
            )),
        }
    }

    /// Blocks until the worker delivers
    pub fn wait(self) -> RecognitionOutcome {
        let id = self.id;
        futures::executor::block_on(self.receiver).unwrap_or_else(|oneshot::Canceled| {
            RecognitionOutcome::failed(
                id,
                FormulaError::Recognizer("recognition worker stopped unexpectedly".into()),
            )
        })
    }
}

#[derive(Clone)]
pub struct RecognitionPipeline {
    recognizer: Arc<dyn FormulaRecognizer>,
    engine: Arc<dyn SymbolicEngine>,
    format: OutputFormat,
}

impl RecognitionPipeline {
    pub fn new(recognizer: Arc<dyn FormulaRecognizer>, engine: Arc<dyn SymbolicEngine>) -> Self {
        Self {
            recognizer,
            engine,
            format: OutputFormat::default(),
        }
    }

    pub fn with_format(mut self, format: OutputFormat) -> Self {
        self.format = format;
        self
    }

    pub fn set_format(&mut self, format: OutputFormat) {
        self.format = format;
    }

    /// Runs recognition on the canvas selection on the calling thread
    pub fn recognize_and_compute(&self, canvas: &DrawingCanvas) -> FormulaResult<RecognitionOutcome> {
        let region = frozen_selection(canvas)?;
        self.compute_region(Uuid::new_v4(), &region)
    }

    /// Recognizes `region`; only recognizer failures are `Err`
    pub fn compute_region(&self, id: Uuid, region: &RgbaImage) -> FormulaResult<RecognitionOutcome> {
        let latex = self.recognizer.recognize(region)?;
        if latex.trim().is_empty() {
            return Err(FormulaError::RecognitionEmpty);
        }
        log::info!("Recognized formula: {latex}");
        Ok(self.compute_latex(id, latex))
    }

    /// Classifies and solves already recognized text
    pub fn compute_latex(&self, id: Uuid, latex: String) -> RecognitionOutcome {
        let category = classify(&latex, self.engine.as_ref());
        let result = SolveDispatcher::new(self.engine.as_ref()).solve(&latex, category);
        log::info!("Solved {category} '{latex}': {result}");
        RecognitionOutcome {
            id,
            latex,
            category,
            result,
            format: self.format,
        }
    }

    /// Copies the selection now and recognizes it on a worker thread
    pub fn spawn(&self, canvas: &DrawingCanvas) -> FormulaResult<RecognitionJob> {
        let region = frozen_selection(canvas)?;
        let id = Uuid::new_v4();
        let (sender, receiver) = oneshot::channel();
        let pipeline = self.clone();

        log::info!("Starting recognition {id} on a {}x{} region", region.width(), region.height());
        std::thread::Builder::new()
            .name(format!("recognition-{id}"))
            .spawn(move || {
                let outcome = pipeline
                    .compute_region(id, &region)
                    .unwrap_or_else(|err| RecognitionOutcome::failed(id, err));
                if sender.send(outcome).is_err() {
                    log::debug!("recognition {id} finished after its job was dropped");
                }
            })
            .map_err(|err| FormulaError::Recognizer(format!("could not start worker: {err}")))?;

        Ok(RecognitionJob { id, receiver })
    }
}

fn frozen_selection(canvas: &DrawingCanvas) -> FormulaResult<RgbaImage> {
    if canvas.selection().is_empty() {
        return Err(FormulaError::NoSelection);
    }
    canvas.crop_selection().ok_or(FormulaError::NoSelection)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dollar_delimiters_are_removed() {
        assert_eq!(clean_recognizer_output("  $$x+1=2$$\n"), "x+1=2");
        assert_eq!(clean_recognizer_output("\n"), "");
    }

    #[test]
    fn image_placeholder_is_substituted() {
        let recognizer = CommandRecognizer::new(
            ["p2t", "predict", "-i", "{image}"].into_iter().map(String::from).collect(),
        );
        assert_eq!(
            recognizer.arguments(Path::new("/tmp/crop.png")),
            vec!["predict", "-i", "/tmp/crop.png"]
        );
    }

    #[test]
    fn empty_command_is_a_recognizer_error() {
        let recognizer = CommandRecognizer::new(Vec::new());
        let image = RgbaImage::new(2, 2);
        assert!(matches!(
            recognizer.recognize(&image),
            Err(FormulaError::Recognizer(_))
        ));
    }
}
