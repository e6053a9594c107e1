use std::ops::RangeInclusive;
use std::path::Path;

use egui::Color32;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::history::DEFAULT_HISTORY_LIMIT;
use crate::tools::{ToolConfig, ToolKind};

/// Environment variable naming a JSON config file
pub const CONFIG_ENV_VAR: &str = "FORMULA_CANVAS_CONFIG";

/// Placeholder in the recognizer command line replaced by the image path
pub const IMAGE_PLACEHOLDER: &str = "{image}";

/// Startup settings for the canvas and the recognizer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CanvasConfig {
    pub width: u32,
    pub height: u32,
    pub background: Color32,
    pub stroke_color: Color32,
    pub stroke_width: f32,
    pub min_stroke_width: f32,
    pub max_stroke_width: f32,
    pub fill_color: Color32,
    pub history_limit: usize,
    pub zoom_in_factor: f32,
    pub zoom_out_factor: f32,
    /// Program and arguments; `{image}` is replaced by the cropped PNG path
    pub recognizer_command: Vec<String>,
}

impl Default for CanvasConfig {
    fn default() -> Self {
        Self {
            width: 800,
            height: 600,
            background: Color32::WHITE,
            stroke_color: Color32::BLACK,
            stroke_width: 2.0,
            min_stroke_width: 1.0,
            max_stroke_width: 50.0,
            fill_color: Color32::TRANSPARENT,
            history_limit: DEFAULT_HISTORY_LIMIT,
            zoom_in_factor: 1.1,
            zoom_out_factor: 0.9,
            recognizer_command: [
                "p2t",
                "predict",
                "-l",
                "en",
                "--file-type",
                "formula",
                "-i",
                IMAGE_PLACEHOLDER,
            ]
            .into_iter()
            .map(String::from)
            .collect(),
        }
    }
}

impl CanvasConfig {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&text)?)
    }

    /// Reads the file named by [`CONFIG_ENV_VAR`], or the defaults
    pub fn from_env() -> Self {
        let Some(path) = std::env::var_os(CONFIG_ENV_VAR) else {
            return Self::default();
        };
        let path = Path::new(&path);
        match Self::load(path) {
            Ok(config) => {
                log::info!("Loaded config from {}", path.display());
                config
            }
            Err(err) => {
                log::warn!("Ignoring config {}: {err}", path.display());
                Self::default()
            }
        }
    }

    pub fn width_range(&self) -> RangeInclusive<f32> {
        let min = self.min_stroke_width.max(1.0);
        min..=self.max_stroke_width.max(min)
    }

    /// Tool settings a fresh canvas starts with
    pub fn initial_tool_config(&self) -> ToolConfig {
        ToolConfig {
            tool: ToolKind::Brush,
            stroke_color: self.stroke_color,
            stroke_width: self.stroke_width,
            fill_color: self.fill_color,
        }
    }
}
