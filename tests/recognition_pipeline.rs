use std::sync::Arc;

use egui::{PointerButton, pos2};
use formula_canvas::math::SolutionSet;
use formula_canvas::{
    BuiltinEngine, CanvasConfig, Category, DrawingCanvas, FormulaError, FormulaRecognizer,
    FormulaResult, OutputFormat, RecognitionPipeline, SolveResult, ToolKind,
};
use image::RgbaImage;

/// Returns the same text for every image
struct FixedRecognizer(&'static str);

impl FormulaRecognizer for FixedRecognizer {
    fn recognize(&self, _image: &RgbaImage) -> FormulaResult<String> {
        Ok(self.0.to_owned())
    }
}

struct FailingRecognizer;

impl FormulaRecognizer for FailingRecognizer {
    fn recognize(&self, _image: &RgbaImage) -> FormulaResult<String> {
        Err(FormulaError::Recognizer("model not installed".into()))
    }
}

fn create_pipeline(recognizer: impl FormulaRecognizer + 'static) -> RecognitionPipeline {
    RecognitionPipeline::new(Arc::new(recognizer), Arc::new(BuiltinEngine))
}

fn canvas_with_selection() -> DrawingCanvas {
    let mut canvas = DrawingCanvas::new(&CanvasConfig {
        width: 80,
        height: 60,
        ..CanvasConfig::default()
    });
    canvas.pointer_down(pos2(10.0, 30.0), PointerButton::Primary);
    canvas.pointer_move(pos2(60.0, 30.0), true);
    canvas.pointer_up(pos2(60.0, 30.0), PointerButton::Primary);

    canvas.set_tool(ToolKind::Select);
    canvas.pointer_down(pos2(5.0, 20.0), PointerButton::Primary);
    canvas.pointer_move(pos2(70.0, 40.0), true);
    canvas.pointer_up(pos2(70.0, 40.0), PointerButton::Primary);
    canvas
}

#[test]
fn test_recognition_needs_a_selection() {
    let pipeline = create_pipeline(FixedRecognizer("1+1"));
    let canvas = DrawingCanvas::new(&CanvasConfig::default());

    assert_eq!(
        pipeline.recognize_and_compute(&canvas).unwrap_err(),
        FormulaError::NoSelection
    );
    assert!(matches!(pipeline.spawn(&canvas), Err(FormulaError::NoSelection)));
}

#[test]
fn test_blank_recognition_is_empty_error() {
    let pipeline = create_pipeline(FixedRecognizer("   "));
    let canvas = canvas_with_selection();
    assert_eq!(
        pipeline.recognize_and_compute(&canvas).unwrap_err(),
        FormulaError::RecognitionEmpty
    );
}

#[test]
fn test_selection_is_recognized_and_solved() {
    let pipeline = create_pipeline(FixedRecognizer("2x+1=7"));
    let canvas = canvas_with_selection();

    let outcome = pipeline.recognize_and_compute(&canvas).unwrap();
    assert_eq!(outcome.latex, "2x+1=7");
    assert_eq!(outcome.category, Category::Equation);
    assert_eq!(outcome.result.to_string(), "[3]");
}

#[test]
fn test_background_job_delivers_outcome() {
    let pipeline = create_pipeline(FixedRecognizer(r"\begin{cases}x+y=5\\x-y=1\end{cases}"))
        .with_format(OutputFormat::Latex);
    let canvas = canvas_with_selection();

    let job = pipeline.spawn(&canvas).unwrap();
    let id = job.id();
    let outcome = job.wait();

    assert_eq!(outcome.id, id);
    assert_eq!(outcome.category, Category::BinaryEquation);
    assert!(matches!(
        outcome.result,
        SolveResult::Solutions(SolutionSet::Assignments(_))
    ));
    assert_eq!(outcome.format, OutputFormat::Latex);
    assert_eq!(outcome.rendered(), r"x = 3, \quad y = 2");
}

#[test]
fn test_outcome_keeps_the_format_it_was_requested_in() {
    let mut pipeline = create_pipeline(FixedRecognizer(r"\frac{1}{3}"));
    let canvas = canvas_with_selection();

    pipeline.set_format(OutputFormat::Latex);
    let as_latex = pipeline.spawn(&canvas).unwrap().wait();
    pipeline.set_format(OutputFormat::Native);
    let as_text = pipeline.spawn(&canvas).unwrap().wait();

    assert_eq!(as_latex.rendered(), r"\frac{1}{3}");
    assert_eq!(as_text.rendered(), "1/3");
}

#[test]
fn test_job_works_on_a_frozen_copy() {
    let pipeline = create_pipeline(FixedRecognizer("3 \\times 4"));
    let mut canvas = canvas_with_selection();

    let job = pipeline.spawn(&canvas).unwrap();
    canvas.clear();
    canvas.clear_selection();

    let outcome = job.wait();
    assert_eq!(outcome.category, Category::Calculation);
    assert_eq!(outcome.result.to_string(), "12");
}

#[test]
fn test_recognizer_failure_becomes_error_outcome() {
    let pipeline = create_pipeline(FailingRecognizer);
    let canvas = canvas_with_selection();

    let outcome = pipeline.spawn(&canvas).unwrap().wait();
    assert!(outcome.latex.is_empty());
    assert!(outcome.result.is_error());
    assert!(outcome.result.to_string().contains("model not installed"));
}
