//! Temperature plot rendering using egui_plot
//!
//! Renders the live temperature trace for the current run, with the
//! heating-rate readout above the plot once an estimate is available.

use egui::{Color32, RichText, Ui};
use egui_plot::{Corner, Legend, Line, Plot, PlotPoints};

use crate::types::Sample;

/// Live temperature trace for one run
#[derive(Debug, Default)]
pub struct TemperaturePlot {
    /// (elapsed seconds, temperature °C) pairs in arrival order
    points: Vec<[f64; 2]>,
}

impl TemperaturePlot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one sample to the trace
    pub fn push(&mut self, sample: &Sample) {
        self.points
            .push([sample.elapsed.as_secs_f64(), sample.temperature_c]);
    }

    /// Drop the trace, ready for the next run
    pub fn clear(&mut self) {
        self.points.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Render the heating-rate readout and the temperature trace
    pub fn render(&self, ui: &mut Ui, heating_rate: Option<f64>) {
        ui.horizontal(|ui| {
            ui.label("Heating speed:");
            match heating_rate {
                Some(rate) => {
                    ui.label(
                        RichText::new(format!("{:.2} °C/min", rate))
                            .strong()
                            .color(Color32::from_rgb(230, 150, 60)),
                    );
                }
                None => {
                    ui.label(RichText::new("—").weak());
                }
            }
        });

        Plot::new("temperature_plot")
            .x_axis_label("Time (s)")
            .y_axis_label("Temperature (°C)")
            .legend(Legend::default().position(Corner::LeftTop))
            .show(ui, |plot_ui| {
                if !self.points.is_empty() {
                    let line = Line::new("Temperature", PlotPoints::from(self.points.clone()))
                        .color(Color32::from_rgb(220, 60, 60))
                        .width(1.5);
                    plot_ui.line(line);
                }
            });
    }
}
