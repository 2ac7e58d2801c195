//! # ThermoVis-RS: Pt1000 Temperature Monitor
//!
//! A real-time temperature monitoring tool that drives a Keithley 2636A
//! source-measure unit over VISA, reads the resistance of a Pt1000
//! probe, and converts it to temperature through the probe calibration.
//! The acquisition backend runs on its own thread, separated from the
//! egui rendering frontend.
//!
//! ## Architecture
//!
//! - **Backend**: Polls the instrument on a separate thread
//! - **Frontend**: Renders the UI using eframe/egui with egui_plot
//! - **Session**: In-memory sample log plus the tab-separated data file
//! - **Communication**: Crossbeam channels for thread-safe data transfer
//!
//! ## Configuration
//!
//! Settings are stored in the platform-appropriate data directory under
//! `dev.elena-savva.thermovis-rs`:
//!
//! - **Linux**: `~/.local/share/dev.elena-savva.thermovis-rs/`
//! - **macOS**: `~/Library/Application Support/dev.elena-savva.thermovis-rs/`
//! - **Windows**: `%APPDATA%\dev.elena-savva.thermovis-rs\`
//!
//! ## Example
//!
//! ```ignore
//! use thermovis_rs::{
//!     backend::AcquisitionBackend,
//!     config::AppConfig,
//!     frontend::MonitorApp,
//! };
//!
//! fn main() -> eframe::Result<()> {
//!     let config = AppConfig::load_or_default();
//!     let (backend, link) = AcquisitionBackend::new(config.clone());
//!
//!     std::thread::spawn(move || backend.run());
//!
//!     let native_options = eframe::NativeOptions::default();
//!     eframe::run_native(
//!         "ThermoVis-RS",
//!         native_options,
//!         Box::new(|cc| Ok(Box::new(MonitorApp::new(cc, link, config)))),
//!     )
//! }
//! ```

pub mod app;
pub mod backend;
pub mod calibration;
pub mod config;
pub mod error;
pub mod frontend;
pub mod session;
pub mod types;

// Re-export commonly used types
pub use app::MonitorApp;
pub use backend::{AcquisitionBackend, BackendCommand, BackendMessage, FrontendLink, SourceMeter};
pub use calibration::resistance_to_celsius;
pub use config::AppConfig;
pub use error::{MonitorError, Result};
pub use types::{RunOutcome, Sample, SessionState, StopReason};
