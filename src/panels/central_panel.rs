use egui::{Color32, Pos2, Rect, Sense, Shape, Stroke, pos2, vec2};

use crate::app::FormulaApp;
use crate::geometry::hit_testing::HANDLE_RADIUS;

const SELECTION_COLOR: Color32 = Color32::from_rgb(0, 150, 255);

pub fn central_panel(app: &mut FormulaApp, ctx: &egui::Context) {
    egui::CentralPanel::default().show(ctx, |ui| {
        // The surface only grows with the panel, so shrinking the window loses nothing
        let available = ui.available_size();
        let surface = app.canvas().surface();
        let width = (available.x as u32).max(surface.width()).max(app.config().width);
        let height = (available.y as u32).max(surface.height()).max(app.config().height);
        app.canvas_mut().resize(width, height);

        egui::ScrollArea::both().show(ui, |ui| {
            let size = vec2(width as f32, height as f32);
            let (response, painter) = ui.allocate_painter(size, Sense::click_and_drag());
            let rect = response.rect;

            app.handle_canvas_input(ctx, rect);

            let texture = app.canvas_texture(ctx);
            painter.image(
                texture,
                rect,
                Rect::from_min_max(pos2(0.0, 0.0), pos2(1.0, 1.0)),
                Color32::WHITE,
            );

            let to_screen = |p: Pos2| rect.min + p.to_vec2();
            let canvas = app.canvas();

            if let Some(path) = canvas.preview_shape() {
                let config = canvas.tool_config();
                let points: Vec<Pos2> = path.outline().into_iter().map(to_screen).collect();
                let stroke = Stroke::new(config.stroke_width, config.stroke_color);
                if path.is_closed() {
                    painter.add(Shape::convex_polygon(points, config.fill_color, stroke));
                } else {
                    painter.add(Shape::line(points, stroke));
                }
            }

            if let Some(region) = canvas.selection().region() {
                let selection = region.rect().translate(rect.min.to_vec2());
                let [r, g, b, _] = SELECTION_COLOR.to_array();
                painter.rect_filled(selection, 0.0, Color32::from_rgba_unmultiplied(r, g, b, 50));
                let corners = [
                    selection.left_top(),
                    selection.right_top(),
                    selection.right_bottom(),
                    selection.left_bottom(),
                    selection.left_top(),
                ];
                painter.extend(Shape::dashed_line(
                    &corners,
                    Stroke::new(1.0, SELECTION_COLOR),
                    5.0,
                    3.0,
                ));
                for handle in region.handles() {
                    painter.circle(to_screen(handle), HANDLE_RADIUS, SELECTION_COLOR, Stroke::NONE);
                }
            }

            if let Some((center, radius)) = canvas.eraser_hint() {
                let center = to_screen(center);
                let points: Vec<Pos2> = (0..=48)
                    .map(|i| {
                        let angle = i as f32 / 48.0 * std::f32::consts::TAU;
                        center + radius * vec2(angle.cos(), angle.sin())
                    })
                    .collect();
                painter.extend(Shape::dotted_line(&points, Color32::GRAY, 3.0, 0.75));
            }
        });
    });
}
