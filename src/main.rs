//! Pt1000 Temperature Monitor - Main Entry Point
//!
//! Drives a Keithley 2636A source-measure unit, polls the resistance of
//! a Pt1000 probe, and plots the derived temperature in real time.

use thermovis_rs::{backend::AcquisitionBackend, config::AppConfig, frontend::MonitorApp};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

fn main() -> eframe::Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,thermovis_rs=trace")),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting Pt1000 Temperature Monitor");

    let config = AppConfig::load_or_default();

    // Spawn the acquisition thread
    let (backend, link) = AcquisitionBackend::new(config.clone());
    let stop_handle = backend.stop_handle();
    let backend_handle = std::thread::spawn(move || backend.run());

    let native_options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1024.0, 640.0])
            .with_min_inner_size([720.0, 480.0])
            .with_title("Pt1000 Temperature Monitor"),
        ..Default::default()
    };

    let result = eframe::run_native(
        "Pt1000 Temperature Monitor",
        native_options,
        Box::new(|cc| Ok(Box::new(MonitorApp::new(cc, link, config)))),
    );

    // Signal the backend to stop and wait for it
    tracing::info!("Shutting down...");
    stop_handle.store(false, std::sync::atomic::Ordering::SeqCst);
    let _ = backend_handle.join();

    result
}
