use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while turning a recognized formula into a result.
///
/// None of these ever escape the recognition pipeline: they are carried inside
/// a [`crate::dispatch::SolveResult`] and shown to the user as text.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FormulaError {
    /// Nothing left to evaluate once the trailing `=` was stripped
    #[error("the expression is empty")]
    EmptyExpression,

    /// The math engine could not read the text
    #[error("could not parse expression: {0}")]
    ParseFailure(String),

    /// The text parsed, but solving or evaluating it failed
    #[error("could not solve: {0}")]
    SolveFailure(String),

    /// The recognizer ran but returned no text
    #[error("no formula was recognized in the selection")]
    RecognitionEmpty,

    /// Recognition was requested without a selection on the canvas
    #[error("select the formula with the select tool first")]
    NoSelection,

    /// The recognizer itself could not run
    #[error("formula recognizer failed: {0}")]
    Recognizer(String),
}

/// Result type for math and recognition operations
pub type FormulaResult<T> = Result<T, FormulaError>;

/// Errors from loading or saving the canvas as an image file
#[derive(Debug, Error)]
pub enum SurfaceIoError {
    #[error("failed to load image {path}: {source}")]
    Load {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("failed to save image {path}: {source}")]
    Save {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("failed to decode dropped image: {0}")]
    Decode(#[from] image::ImageError),
}

/// Errors from reading the configuration file
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Read(#[from] std::io::Error),

    #[error("invalid config file: {0}")]
    Parse(#[from] serde_json::Error),
}
