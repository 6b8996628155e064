use futures::FutureExt;

use crate::intake::MODEL_EXTENSIONS;
use crate::lights::{Color, LightConfig, INTENSITY_RANGE, INTENSITY_STEP};
use crate::loader::LoadState;
use crate::reporter::DisplayedCameraPosition;
use crate::viewer::{PickedFile, Viewer};

const HEADING_COLOR: egui::Color32 = egui::Color32::from_rgb(74, 158, 255);
const ERROR_COLOR: egui::Color32 = egui::Color32::from_rgb(255, 100, 100);

pub fn draw(ctx: &egui::Context, viewer: &mut Viewer) {
    egui::Window::new("Model")
        .resizable(false)
        .default_pos(egui::pos2(10.0, 10.0))
        .default_width(260.0)
        .show(ctx, |ui| {
            let open = ui.add_enabled(!viewer.is_picking(), egui::Button::new("Open model…"));
            if open.clicked() {
                viewer.pick_with(pick_model_file());
            }
            ui.label(
                egui::RichText::new("or drop a .glb / .gltf onto the window")
                    .small()
                    .color(egui::Color32::GRAY),
            );
            ui.separator();
            load_status(ui, viewer.load_state());
            if let Some(notice) = viewer.notice() {
                ui.colored_label(ERROR_COLOR, notice);
            }
        });

    egui::Window::new("Lighting Controls")
        .resizable(false)
        .default_pos(egui::pos2(10.0, 150.0))
        .default_width(260.0)
        .show(ctx, |ui| lighting_controls(ui, viewer.lights_mut()));

    egui::Window::new("Camera Position")
        .resizable(false)
        .default_pos(egui::pos2(10.0, 400.0))
        .show(ctx, |ui| camera_readout(ui, viewer.camera_position()));
}

fn pick_model_file() -> PickedFile {
    rfd::AsyncFileDialog::new()
        .set_title("Open glTF model")
        .add_filter("glTF model", &MODEL_EXTENSIONS)
        .pick_file()
        .map(|file| file.map(|file| file.path().to_path_buf()))
        .boxed_local()
}

fn load_status(ui: &mut egui::Ui, state: &LoadState) {
    match state {
        LoadState::Loading { .. } => {
            ui.horizontal(|ui| {
                ui.spinner();
                ui.label(state.to_string());
            });
        }
        LoadState::Failed { .. } => {
            ui.colored_label(ERROR_COLOR, state.to_string());
        }
        LoadState::Idle | LoadState::Loaded { .. } => {
            ui.label(state.to_string());
        }
    }
}

fn lighting_controls(ui: &mut egui::Ui, lights: &mut LightConfig) {
    ui.label(egui::RichText::new("Ambient Light").strong().color(HEADING_COLOR));
    let mut ambient = lights.ambient_intensity();
    if ui
        .add(
            egui::Slider::new(&mut ambient, INTENSITY_RANGE)
                .step_by(INTENSITY_STEP)
                .text("Intensity"),
        )
        .changed()
    {
        lights.set_ambient_intensity(ambient);
    }

    ui.separator();
    ui.label(egui::RichText::new("Directional Light").strong().color(HEADING_COLOR));
    let mut directional = lights.directional_intensity();
    if ui
        .add(
            egui::Slider::new(&mut directional, INTENSITY_RANGE)
                .step_by(INTENSITY_STEP)
                .text("Intensity"),
        )
        .changed()
    {
        lights.set_directional_intensity(directional);
    }

    let mut position = lights.directional_position();
    let mut moved = false;
    ui.horizontal(|ui| {
        ui.label("Position");
        for (axis, value) in ["X", "Y", "Z"].iter().zip(position.iter_mut()) {
            moved |= ui
                .add(egui::DragValue::new(value).speed(0.1).prefix(format!("{}: ", axis)))
                .changed();
        }
    });
    if moved {
        lights.set_directional_position(position);
    }

    let mut rgb = lights.directional_color().to_array();
    ui.horizontal(|ui| {
        ui.label("Color");
        if ui.color_edit_button_srgb(&mut rgb).changed() {
            lights.set_directional_color(Color::from_array(rgb));
        }
        ui.label(lights.directional_color().to_string());
    });
}

fn camera_readout(ui: &mut egui::Ui, position: &DisplayedCameraPosition) {
    egui::Grid::new("camera_position").num_columns(2).show(ui, |ui| {
        for (axis, value) in [("X", &position.x), ("Y", &position.y), ("Z", &position.z)] {
            ui.label(axis);
            ui.monospace(value.as_str());
            ui.end_row();
        }
    });
}
