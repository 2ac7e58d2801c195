//! Frontend module for egui UI
//!
//! This module provides the main UI using eframe/egui. It receives
//! samples from the backend through crossbeam channels and renders
//! them in real-time.
//!
//! # Main Types
//!
//! - [`MonitorApp`] - Main application state implementing [`eframe::App`]
//! - [`TemperaturePlot`] - Plot rendering with egui_plot
//!
//! # Submodules
//!
//! - `panels` - Run-controls panel
//! - `plot` - Temperature trace rendering
//! - `status_bar` - Bottom status bar

mod panels;
mod plot;
mod status_bar;

pub use panels::{render_run_controls, ControlAction};
pub use plot::TemperaturePlot;
pub use status_bar::{render_status_bar, StatusBarContext};

use crate::backend::{BackendMessage, FrontendLink};
use crate::config::AppConfig;
use crate::error::MonitorError;
use crate::types::{Sample, SessionState, StopReason};
use std::path::PathBuf;
use std::time::Duration;

/// How often the UI repaints while a run is active
const ACTIVE_REPAINT: Duration = Duration::from_millis(50);

/// Main application state for the temperature monitor
pub struct MonitorApp {
    // === Communication ===
    link: FrontendLink,

    // === Shared state ===
    config: AppConfig,
    state: SessionState,
    status_message: String,

    // === Run data ===
    plot: TemperaturePlot,
    sample_count: usize,
    last_sample: Option<Sample>,
    heating_rate: Option<f64>,

    // === Controls ===
    output_path: String,
    instruments: Vec<String>,
    plot_open: bool,
    /// Path awaiting an overwrite decision
    overwrite_pending: Option<PathBuf>,
}

impl MonitorApp {
    /// Create the application and request an initial instrument scan
    pub fn new(_cc: &eframe::CreationContext<'_>, link: FrontendLink, config: AppConfig) -> Self {
        link.refresh_instruments();
        Self {
            link,
            config,
            state: SessionState::Idle,
            status_message: String::new(),
            plot: TemperaturePlot::new(),
            sample_count: 0,
            last_sample: None,
            heating_rate: None,
            output_path: String::new(),
            instruments: Vec::new(),
            plot_open: true,
            overwrite_pending: None,
        }
    }

    /// Apply everything the backend sent since the last frame
    fn process_messages(&mut self) {
        for msg in self.link.drain() {
            match msg {
                BackendMessage::SessionState(state) => {
                    if state == SessionState::Running {
                        self.plot.clear();
                        self.sample_count = 0;
                        self.last_sample = None;
                        self.heating_rate = None;
                        self.plot_open = true;
                    }
                    self.state = state;
                }
                BackendMessage::Sample(sample) => {
                    self.plot.push(&sample);
                    self.sample_count += 1;
                    self.last_sample = Some(sample);
                }
                BackendMessage::HeatingRate(rate) => {
                    self.heating_rate = Some(rate);
                }
                BackendMessage::InstrumentList(list) => {
                    self.instruments = list;
                }
                BackendMessage::RunFinished(outcome) => {
                    self.status_message = outcome.status_message();
                }
                BackendMessage::Error(error) => {
                    self.status_message = error;
                }
                BackendMessage::Shutdown => {}
            }
        }
    }

    /// Resolve the data-file path and start a run, going through the
    /// overwrite confirmation when the file already exists
    fn request_start(&mut self) {
        let trimmed = self.output_path.trim();
        if trimmed.is_empty() {
            self.status_message.clear();
            self.link.start(None, self.config.instrument.clone());
            return;
        }

        let mut path = PathBuf::from(trimmed);
        if path.extension().is_none() {
            path.set_extension("dat");
            self.output_path = path.display().to_string();
        }

        if path.exists() {
            self.overwrite_pending = Some(path);
        } else {
            self.start_run(path);
        }
    }

    fn start_run(&mut self, path: PathBuf) {
        self.status_message.clear();
        self.link.start(Some(path), self.config.instrument.clone());
    }

    fn handle_action(&mut self, action: ControlAction, ctx: &egui::Context) {
        match action {
            ControlAction::Start => self.request_start(),
            ControlAction::Stop => self.link.stop(StopReason::Manual),
            ControlAction::RefreshInstruments => self.link.refresh_instruments(),
            ControlAction::Exit => ctx.send_viewport_cmd(egui::ViewportCommand::Close),
        }
    }

    /// Modal asking whether to overwrite an existing data file
    fn show_overwrite_dialog(&mut self, ctx: &egui::Context) {
        let Some(path) = self.overwrite_pending.clone() else {
            return;
        };
        let mut decided = false;
        egui::Window::new("File already exists")
            .collapsible(false)
            .resizable(false)
            .show(ctx, |ui| {
                ui.label(format!("Overwrite {}?", path.display()));
                ui.horizontal(|ui| {
                    if ui.button("Overwrite").clicked() {
                        decided = true;
                        self.start_run(path.clone());
                    }
                    if ui.button("Cancel").clicked() {
                        decided = true;
                        self.status_message = MonitorError::FileExists(path.clone()).to_string();
                    }
                });
            });
        if decided {
            self.overwrite_pending = None;
        }
    }
}

impl eframe::App for MonitorApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.process_messages();

        let mut action = None;
        egui::TopBottomPanel::top("controls").show(ctx, |ui| {
            ui.add_space(4.0);
            action = render_run_controls(
                ui,
                self.state,
                &mut self.output_path,
                &mut self.config.instrument,
                &self.instruments,
            );
            ui.add_space(4.0);
        });
        if let Some(action) = action {
            self.handle_action(action, ctx);
        }

        egui::TopBottomPanel::bottom("status_bar").show(ctx, |ui| {
            render_status_bar(
                ui,
                &StatusBarContext {
                    state: self.state,
                    sample_count: self.sample_count,
                    last_sample: self.last_sample.as_ref(),
                    status_message: &self.status_message,
                },
            );
        });

        egui::CentralPanel::default().show(ctx, |ui| {
            if !self.plot_open && self.plot.is_empty() {
                ui.centered_and_justified(|ui| {
                    ui.label("Start a run to begin monitoring");
                });
            }
        });

        let mut plot_open = self.plot_open;
        egui::Window::new("Temperature monitoring")
            .open(&mut plot_open)
            .default_size([760.0, 460.0])
            .show(ctx, |ui| {
                self.plot.render(ui, self.heating_rate);
            });
        // Closing the plot window during a run stops it
        if self.plot_open && !plot_open && self.state.is_active() {
            self.link.stop(StopReason::DisplayClosed);
        }
        self.plot_open = plot_open;

        self.show_overwrite_dialog(ctx);

        if self.state.is_active() {
            ctx.request_repaint_after(ACTIVE_REPAINT);
        }
    }

    fn on_exit(&mut self, _gl: Option<&eframe::glow::Context>) {
        self.link.stop(StopReason::Manual);
        self.link.shutdown();
        if let Err(e) = self.config.save() {
            tracing::warn!("Failed to save configuration: {}", e);
        }
    }
}
