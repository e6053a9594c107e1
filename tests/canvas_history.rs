use egui::{Color32, PointerButton, Pos2, pos2};
use formula_canvas::error::SurfaceIoError;
use formula_canvas::{CanvasConfig, DrawingCanvas, RasterSurface, Snapshot, SnapshotHistory};

fn create_test_canvas() -> DrawingCanvas {
    DrawingCanvas::new(&CanvasConfig {
        width: 64,
        height: 48,
        ..CanvasConfig::default()
    })
}

fn shade(value: u8) -> Snapshot {
    let mut surface = RasterSurface::new(4, 4, Color32::WHITE);
    surface.fill(Color32::from_gray(value));
    surface.snapshot()
}

fn draw_line(canvas: &mut DrawingCanvas, from: Pos2, to: Pos2) {
    canvas.pointer_down(from, PointerButton::Primary);
    canvas.pointer_move(to, true);
    canvas.pointer_up(to, PointerButton::Primary);
}

#[test]
fn test_forty_pushes_keep_thirty() {
    let mut history = SnapshotHistory::default();
    for value in 0..40 {
        history.push(shade(value));
    }
    assert_eq!(history.undo_len(), 30);

    let mut oldest = None;
    while let Some(snapshot) = history.undo() {
        oldest = Some(snapshot);
    }
    // Entries 0..10 were evicted
    assert_eq!(oldest, Some(shade(10)));
    assert_eq!(history.redo_len(), 29);
}

#[test]
fn test_undo_then_redo_restores_last_state() {
    let mut canvas = create_test_canvas();
    let strokes = 6;
    for i in 0..strokes {
        let y = 4.0 + 6.0 * i as f32;
        draw_line(&mut canvas, pos2(4.0, y), pos2(60.0, y));
    }
    let final_pixels = canvas.surface().pixels().clone();

    for _ in 0..strokes {
        assert!(canvas.undo());
    }
    assert!(!canvas.undo());
    assert!(canvas.surface().pixels().pixels().all(|p| p.0 == [255, 255, 255, 255]));

    for _ in 0..strokes {
        assert!(canvas.redo());
    }
    assert!(!canvas.redo());
    assert_eq!(canvas.surface().pixels(), &final_pixels);
}

#[test]
fn test_redo_stack_empty_after_push() {
    let mut canvas = create_test_canvas();
    draw_line(&mut canvas, pos2(2.0, 2.0), pos2(30.0, 2.0));
    draw_line(&mut canvas, pos2(2.0, 10.0), pos2(30.0, 10.0));
    canvas.undo();
    assert!(canvas.can_redo());

    draw_line(&mut canvas, pos2(2.0, 20.0), pos2(30.0, 20.0));
    assert!(!canvas.can_redo());
    assert_eq!(canvas.history().redo_len(), 0);
}

#[test]
fn test_clear_is_one_undo_step() {
    let mut canvas = create_test_canvas();
    draw_line(&mut canvas, pos2(2.0, 2.0), pos2(30.0, 2.0));
    canvas.clear();
    assert_eq!(canvas.surface().pixel(10, 2), Some(Color32::WHITE));

    assert!(canvas.undo());
    assert_eq!(canvas.surface().pixel(10, 2), Some(Color32::BLACK));
}

#[test]
fn test_failed_load_leaves_canvas_untouched() {
    let mut canvas = create_test_canvas();
    draw_line(&mut canvas, pos2(2.0, 2.0), pos2(30.0, 2.0));
    let revision = canvas.revision();
    let before = canvas.surface().pixels().clone();

    let missing = std::env::temp_dir().join(format!("missing-{}.png", uuid::Uuid::new_v4()));
    let err = canvas.load(&missing).unwrap_err();
    assert!(matches!(err, SurfaceIoError::Load { .. }));
    assert_eq!(canvas.revision(), revision);
    assert_eq!(canvas.surface().pixels(), &before);
    assert_eq!(canvas.history().undo_len(), 2);
}

#[test]
fn test_save_then_load_round_trip() {
    let mut canvas = create_test_canvas();
    canvas.set_stroke_color(Color32::RED);
    canvas.set_stroke_width(4.0);
    draw_line(&mut canvas, pos2(4.0, 20.0), pos2(50.0, 20.0));

    let path = std::env::temp_dir().join(format!("formula-canvas-{}.png", uuid::Uuid::new_v4()));
    canvas.save(&path).unwrap();

    canvas.clear();
    assert_eq!(canvas.surface().pixel(20, 20), Some(Color32::WHITE));
    canvas.load(&path).unwrap();
    std::fs::remove_file(&path).unwrap();

    assert_eq!(canvas.surface().pixel(20, 20), Some(Color32::RED));
    // draw, clear and load are three undo steps
    assert_eq!(canvas.history().undo_len(), 4);
}

#[test]
fn test_resize_keeps_top_left_and_drops_the_rest() {
    let mut canvas = create_test_canvas();
    draw_line(&mut canvas, pos2(2.0, 2.0), pos2(60.0, 2.0));

    canvas.resize(20, 20);
    canvas.resize(64, 48);
    assert_eq!(canvas.surface().pixel(10, 2), Some(Color32::BLACK));
    assert_eq!(canvas.surface().pixel(50, 2), Some(Color32::WHITE));
}
