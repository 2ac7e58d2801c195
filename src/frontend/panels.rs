//! Reusable panel components
//!
//! The run-controls panel collects everything the user sets before a
//! run: output file, instrument selection, and measurement settings.
//! It reports what the user asked for as a [`ControlAction`]; the app
//! decides what to do with it.

use egui::{ComboBox, DragValue, Ui};

use crate::config::InstrumentConfig;
use crate::types::SessionState;

/// What the user requested from the controls panel this frame
#[derive(Debug, Clone, PartialEq)]
pub enum ControlAction {
    /// Start a run
    Start,
    /// Stop the active run
    Stop,
    /// Rescan the instrument list
    RefreshInstruments,
    /// Quit the application
    Exit,
}

/// Render the run controls.
///
/// `output_path` and `settings` are edited in place; the returned
/// action, if any, is what the user clicked.
pub fn render_run_controls(
    ui: &mut Ui,
    state: SessionState,
    output_path: &mut String,
    settings: &mut InstrumentConfig,
    instruments: &[String],
) -> Option<ControlAction> {
    let mut action = None;
    let idle = state == SessionState::Idle;

    ui.horizontal(|ui| {
        ui.label("Data file:");
        ui.add_enabled(idle, egui::TextEdit::singleline(output_path).desired_width(280.0));
        if ui.add_enabled(idle, egui::Button::new("Browse…")).clicked() {
            if let Some(path) = rfd::FileDialog::new()
                .add_filter("Data files", &["dat"])
                .save_file()
            {
                *output_path = path.display().to_string();
            }
        }
    });

    ui.horizontal(|ui| {
        ui.label("Instrument:");
        let selected = settings
            .resource
            .clone()
            .unwrap_or_else(|| "first found".to_string());
        ComboBox::from_id_salt("instrument_select")
            .selected_text(selected)
            .show_ui(ui, |ui| {
                ui.selectable_value(&mut settings.resource, None, "first found");
                for resource in instruments {
                    ui.selectable_value(
                        &mut settings.resource,
                        Some(resource.clone()),
                        resource,
                    );
                }
            });
        if ui.add_enabled(idle, egui::Button::new("Refresh")).clicked() {
            action = Some(ControlAction::RefreshInstruments);
        }
        ui.checkbox(&mut settings.use_mock, "Mock instrument");
    });

    ui.horizontal(|ui| {
        ui.label("NPLC:");
        ui.add_enabled(idle, DragValue::new(&mut settings.nplc).range(1.0..=10.0).speed(0.1));
        ui.separator();
        ui.label("V range (V):");
        ui.add_enabled(
            idle,
            DragValue::new(&mut settings.voltage_range_v)
                .range(0.1..=200.0)
                .speed(0.1),
        );
        ui.separator();
        ui.label("I range (A):");
        ui.add_enabled(
            idle,
            DragValue::new(&mut settings.current_range_a)
                .range(1e-9..=1.0)
                .speed(0.0001)
                .custom_formatter(|v, _| format!("{:e}", v)),
        );
    });

    ui.horizontal(|ui| {
        if idle {
            if ui.button("Start").clicked() {
                action = Some(ControlAction::Start);
            }
        } else if ui.button("Stop").clicked() {
            action = Some(ControlAction::Stop);
        }
        if ui.add_enabled(idle, egui::Button::new("Exit")).clicked() {
            action = Some(ControlAction::Exit);
        }
    });

    action
}
