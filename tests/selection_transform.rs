use egui::{Color32, PointerButton, pos2};
use formula_canvas::geometry::PixelRect;
use formula_canvas::{CanvasConfig, DrawingCanvas, RasterSurface, SelectionManager, ToolKind};

// 60x60 white surface with a 20x20 checkerboard at (10, 10)
fn create_checkerboard() -> RasterSurface {
    let mut surface = RasterSurface::new(60, 60, Color32::WHITE);
    for y in 0..10 {
        for x in 0..10 {
            let color = if (x + y) % 2 == 0 {
                Color32::BLACK
            } else {
                Color32::RED
            };
            surface.fill_rect(PixelRect::new(10 + 2 * x, 10 + 2 * y, 2, 2), color);
        }
    }
    surface
}

fn select(from: (f32, f32), to: (f32, f32)) -> SelectionManager {
    let mut selection = SelectionManager::default();
    selection.begin(pos2(from.0, from.1));
    selection.update(pos2(to.0, to.1));
    selection
}

#[test]
fn test_scale_by_one_is_pixel_identical() {
    let mut surface = create_checkerboard();
    let before = surface.pixels().clone();
    let selection = select((10.0, 10.0), (30.0, 30.0));

    assert!(!selection.scale(&mut surface, 1.0));
    assert_eq!(surface.pixels(), &before);
}

#[test]
fn test_shrink_then_grow_does_not_resurrect_pixels() {
    let mut surface = create_checkerboard();
    let selection = select((10.0, 10.0), (30.0, 30.0));
    let original = selection.crop(&surface).unwrap();

    assert!(selection.scale(&mut surface, 0.5));
    // The freed part of the rectangle is background
    assert_eq!(surface.pixel(25, 25), Some(Color32::WHITE));

    assert!(selection.scale(&mut surface, 2.0));
    let regrown = selection.crop(&surface).unwrap();
    assert_ne!(regrown, original);
    assert_eq!(surface.pixel(45, 45), Some(Color32::WHITE));
}

#[test]
fn test_crop_matches_selection_bounds() {
    let surface = create_checkerboard();
    let selection = select((30.0, 30.0), (10.0, 14.0));
    let crop = selection.crop(&surface).unwrap();
    assert_eq!(crop.dimensions(), (20, 16));
    assert_eq!(crop.get_pixel(0, 0).0, [0, 0, 0, 255]);
}

#[test]
fn test_selection_past_the_edge_is_clipped() {
    let surface = create_checkerboard();
    let selection = select((50.0, 50.0), (90.0, 70.0));
    assert_eq!(selection.crop(&surface).unwrap().dimensions(), (10, 10));
}

#[test]
fn test_full_turn_leaves_region_unchanged() {
    let mut surface = create_checkerboard();
    let before = surface.pixels().clone();
    let selection = select((10.0, 10.0), (30.0, 30.0));
    assert!(!selection.rotate(&mut surface, 360));
    assert!(!selection.rotate(&mut surface, 0));
    assert!(!selection.rotate(&mut surface, -720));
    assert_eq!(surface.pixels(), &before);
}

#[test]
fn test_canvas_transforms_are_single_undo_steps() {
    let mut canvas = DrawingCanvas::new(&CanvasConfig {
        width: 60,
        height: 60,
        ..CanvasConfig::default()
    });
    canvas.set_stroke_width(6.0);
    canvas.pointer_down(pos2(10.0, 20.0), PointerButton::Primary);
    canvas.pointer_move(pos2(40.0, 20.0), true);
    canvas.pointer_up(pos2(40.0, 20.0), PointerButton::Primary);
    let drawn = canvas.surface().pixels().clone();

    canvas.set_tool(ToolKind::Select);
    canvas.pointer_down(pos2(5.0, 10.0), PointerButton::Primary);
    canvas.pointer_move(pos2(45.0, 30.0), true);
    canvas.pointer_up(pos2(45.0, 30.0), PointerButton::Primary);
    assert_eq!(canvas.history().undo_len(), 2);

    assert!(canvas.rotate_selection(45));
    assert!(canvas.scale_selection(0.9));
    assert_eq!(canvas.history().undo_len(), 4);

    canvas.undo();
    canvas.undo();
    assert_eq!(canvas.surface().pixels(), &drawn);
}

#[test]
fn test_whole_turn_records_no_undo_step() {
    let mut canvas = DrawingCanvas::new(&CanvasConfig {
        width: 60,
        height: 60,
        ..CanvasConfig::default()
    });
    canvas.set_tool(ToolKind::Select);
    canvas.pointer_down(pos2(5.0, 5.0), PointerButton::Primary);
    canvas.pointer_move(pos2(40.0, 40.0), true);
    canvas.pointer_up(pos2(40.0, 40.0), PointerButton::Primary);
    let revision = canvas.revision();

    assert!(!canvas.rotate_selection(360));
    assert!(!canvas.rotate_selection(0));
    assert_eq!(canvas.history().undo_len(), 1);
    assert_eq!(canvas.revision(), revision);
}

#[test]
fn test_transforms_without_selection_do_nothing() {
    let mut canvas = DrawingCanvas::new(&CanvasConfig::default());
    assert!(!canvas.scale_selection(1.1));
    assert!(!canvas.rotate_selection(90));
    assert_eq!(canvas.history().undo_len(), 1);
}
