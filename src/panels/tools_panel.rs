use egui::color_picker::{Alpha, color_edit_button_srgba};
use egui::{Color32, Sense, Stroke, vec2};

use crate::app::{Dialog, FormulaApp};
use crate::components::ToolButton;
use crate::tools::ToolKind;

/// Swatches offered next to the color picker
pub const QUICK_COLORS: [Color32; 12] = [
    Color32::from_rgb(0x00, 0x00, 0x00),
    Color32::from_rgb(0xFF, 0x00, 0x00),
    Color32::from_rgb(0x00, 0xFF, 0x00),
    Color32::from_rgb(0x00, 0x00, 0xFF),
    Color32::from_rgb(0xFF, 0xFF, 0x00),
    Color32::from_rgb(0xFF, 0x00, 0xFF),
    Color32::from_rgb(0x00, 0xFF, 0xFF),
    Color32::from_rgb(0xFF, 0xA5, 0x00),
    Color32::from_rgb(0x80, 0x00, 0x80),
    Color32::from_rgb(0x00, 0x80, 0x00),
    Color32::from_rgb(0x00, 0x00, 0x80),
    Color32::from_rgb(0x80, 0x80, 0x80),
];

pub fn tools_panel(app: &mut FormulaApp, ctx: &egui::Context) {
    egui::SidePanel::left("tools_panel")
        .resizable(true)
        .default_width(200.0)
        .show(ctx, |ui| {
            ui.heading("Tools");

            let active = app.canvas().tool_kind();
            ui.horizontal_wrapped(|ui| {
                for kind in ToolKind::ALL {
                    if ToolButton::new(kind, kind == active).show(ui).clicked() {
                        log::info!("Tool selected from UI: {}", kind.label());
                        app.canvas_mut().set_tool(kind);
                    }
                }
            });
            ui.separator();

            let mut config = *app.canvas().tool_config();

            ui.label("Color");
            ui.horizontal(|ui| {
                if color_edit_button_srgba(ui, &mut config.stroke_color, Alpha::Opaque).changed() {
                    app.canvas_mut().set_stroke_color(config.stroke_color);
                }
                ui.label(format!(
                    "#{:02X}{:02X}{:02X}",
                    config.stroke_color.r(),
                    config.stroke_color.g(),
                    config.stroke_color.b()
                ));
            });
            ui.horizontal_wrapped(|ui| {
                for color in QUICK_COLORS {
                    let (rect, response) = ui.allocate_exact_size(vec2(18.0, 18.0), Sense::click());
                    let outline = if color == config.stroke_color {
                        Stroke::new(2.0, ui.visuals().selection.stroke.color)
                    } else {
                        Stroke::new(1.0, Color32::GRAY)
                    };
                    ui.painter().rect(rect, 2.0, color, outline);
                    if response.clicked() {
                        app.canvas_mut().set_stroke_color(color);
                    }
                }
            });

            ui.label("Width");
            let range = app.config().width_range();
            if ui
                .add(egui::Slider::new(&mut config.stroke_width, range).step_by(1.0))
                .changed()
            {
                app.canvas_mut().set_stroke_width(config.stroke_width);
            }

            ui.label("Fill");
            ui.horizontal(|ui| {
                if color_edit_button_srgba(ui, &mut config.fill_color, Alpha::BlendOrAdditive).changed() {
                    app.canvas_mut().set_fill_color(config.fill_color);
                }
                if ui.button("No fill").clicked() {
                    app.canvas_mut().set_fill_color(Color32::TRANSPARENT);
                }
            });
            ui.separator();

            ui.horizontal(|ui| {
                let can_undo = app.canvas().can_undo();
                let can_redo = app.canvas().can_redo();
                if ui.add_enabled(can_undo, egui::Button::new("Undo")).clicked() {
                    app.undo();
                }
                if ui.add_enabled(can_redo, egui::Button::new("Redo")).clicked() {
                    app.redo();
                }
                if ui.button("Clear").clicked() {
                    app.open_dialog(Dialog::ConfirmClear { new_file: false });
                }
            });
            let history = app.canvas().history();
            ui.label(format!(
                "Undo steps: {}  Redo steps: {}",
                history.undo_len().saturating_sub(1),
                history.redo_len()
            ));
            ui.separator();

            ui.heading("Selection");
            let has_selection = !app.canvas().selection().is_empty();
            ui.horizontal(|ui| {
                if ui.add_enabled(has_selection, egui::Button::new("Zoom in")).clicked() {
                    app.zoom_in();
                }
                if ui.add_enabled(has_selection, egui::Button::new("Zoom out")).clicked() {
                    app.zoom_out();
                }
                if ui.add_enabled(has_selection, egui::Button::new("Rotate…")).clicked() {
                    app.open_dialog(Dialog::Rotate { degrees: 90 });
                }
            });
            if ui
                .add_enabled(has_selection && !app.is_recognizing(), egui::Button::new("Recognize formula"))
                .clicked()
            {
                app.request_recognition();
            }
            let mut latex = app.latex_output();
            if ui.checkbox(&mut latex, "Results as LaTeX").changed() {
                app.set_latex_output(latex);
            }
            if active == ToolKind::Select {
                ui.weak("Right-click the selection to recognize it.");
            }
        });
}
