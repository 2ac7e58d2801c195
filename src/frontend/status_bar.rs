//! Status bar panel — bottom bar showing session state and run info.

use egui::{Color32, RichText, Ui};

use crate::types::{Sample, SessionState};

/// Context needed to render the status bar.
pub struct StatusBarContext<'a> {
    pub state: SessionState,
    pub sample_count: usize,
    pub last_sample: Option<&'a Sample>,
    pub status_message: &'a str,
}

/// Render the status bar.
pub fn render_status_bar(ui: &mut Ui, ctx: &StatusBarContext<'_>) {
    ui.horizontal(|ui| {
        ui.spacing_mut().item_spacing.x = 8.0;

        let status_color = match ctx.state {
            SessionState::Idle => Color32::GRAY,
            SessionState::Connecting | SessionState::Configuring => Color32::YELLOW,
            SessionState::Running => Color32::GREEN,
            SessionState::Stopping => Color32::ORANGE,
        };
        ui.colored_label(status_color, "●");
        ui.label(RichText::new(ctx.state.to_string()).small());

        ui.separator();

        ui.label(RichText::new(format!("Samples: {}", ctx.sample_count)).small());

        if let Some(sample) = ctx.last_sample {
            ui.separator();
            ui.label(
                RichText::new(format!(
                    "T = {:.3} °C   R = {:.3} Ω",
                    sample.temperature_c, sample.resistance_ohm
                ))
                .small(),
            );
        }

        if !ctx.status_message.is_empty() {
            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                ui.label(RichText::new(ctx.status_message).small());
            });
        }
    });
}
