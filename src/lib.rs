#![warn(clippy::all, rust_2018_idioms)]

pub mod app;
pub mod canvas;
pub mod classify;
pub mod components;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod file_handler;
pub mod geometry;
pub mod history;
pub mod input;
pub mod math;
pub mod panels;
pub mod recognition;
pub mod selection;
pub mod stroke;
pub mod surface;
pub mod texture_manager;
pub mod tools;

pub use app::FormulaApp;
pub use canvas::{CanvasSignal, DrawingCanvas};
pub use classify::{Category, classify};
pub use config::CanvasConfig;
pub use dispatch::{Calculated, OutputFormat, SolveDispatcher, SolveResult};
pub use error::{ConfigError, FormulaError, FormulaResult, SurfaceIoError};
pub use history::SnapshotHistory;
pub use input::{InputEvent, InputLocation};
pub use math::{BuiltinEngine, SymbolicEngine};
pub use recognition::{FormulaRecognizer, RecognitionOutcome, RecognitionPipeline};
pub use selection::SelectionManager;
pub use surface::{RasterSurface, Snapshot};
pub use tools::{Tool, ToolConfig, ToolKind};
