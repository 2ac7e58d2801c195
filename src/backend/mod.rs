//! Backend module for instrument polling
//!
//! This module handles all instrument communication in a separate
//! thread to keep the UI responsive. It uses crossbeam channels for
//! thread-safe communication with the frontend.
//!
//! # Architecture
//!
//! The backend runs in a separate thread from the UI, communicating via
//! channels:
//!
//! - [`BackendCommand`] - Messages sent from UI to backend (start, stop, etc.)
//! - [`BackendMessage`] - Messages sent from backend to UI (samples, status, errors)
//! - [`FrontendLink`] - UI-side handle for sending commands and receiving messages
//! - [`AcquisitionBackend`] - Main backend entry point that owns the worker loop
//!
//! # Components
//!
//! - [`SourceMeter`] - Unified instrument interface
//! - [`VisaSourceMeter`](visa::VisaSourceMeter) - Keithley 2636A over VISA (feature-gated)
//! - [`MockSourceMeter`] - Mock instrument for testing without hardware
//! - [`AcquisitionWorker`] - Main worker loop that processes commands and polls
//!
//! # Example
//!
//! ```ignore
//! use thermovis_rs::backend::AcquisitionBackend;
//! use thermovis_rs::config::AppConfig;
//!
//! let config = AppConfig::default();
//! let (backend, link) = AcquisitionBackend::new(config.clone());
//!
//! // Spawn backend thread
//! std::thread::spawn(move || backend.run());
//!
//! // Start a run from the UI
//! link.start(Some("run.dat".into()), config.instrument);
//!
//! // Receive messages
//! for msg in link.drain() {
//!     match msg {
//!         BackendMessage::Sample(sample) => {
//!             // Plot the new point
//!         }
//!         _ => {}
//!     }
//! }
//! ```

pub mod instrument;
pub mod mock;
#[cfg(feature = "instrument_visa")]
pub mod visa;
pub mod worker;

pub use instrument::{create_instrument, parse_reading, SourceMeter};
pub use mock::{MockSourceMeter, MOCK_RESOURCE};
pub use worker::AcquisitionWorker;

use crate::config::{AppConfig, InstrumentConfig};
use crate::types::{RunOutcome, Sample, SessionState, StopReason};
use crossbeam_channel::{bounded, Receiver, Sender};
use std::path::PathBuf;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

/// Message sent from the UI to the backend
#[derive(Debug, Clone)]
pub enum BackendCommand {
    /// Start a run
    Start {
        /// Data-file path; `None` skips file logging
        output_path: Option<PathBuf>,
        /// Instrument settings for this run (bias current, NPLC, ranges)
        settings: InstrumentConfig,
    },
    /// Stop the active run
    Stop {
        /// What prompted the stop; reported back in the outcome
        reason: StopReason,
    },
    /// Request an instrument list refresh
    RefreshInstruments,
    /// Shutdown the backend
    Shutdown,
}

/// Message sent from the backend to the UI
#[derive(Debug, Clone)]
pub enum BackendMessage {
    /// Session state changed
    SessionState(SessionState),
    /// New sample acquired
    Sample(Sample),
    /// Updated heating-rate estimate in °C/min
    HeatingRate(f64),
    /// Instrument list update (response to RefreshInstruments)
    InstrumentList(Vec<String>),
    /// A run ended, successfully or not
    RunFinished(RunOutcome),
    /// An error the user should see
    Error(String),
    /// Backend is shutting down
    Shutdown,
}

/// Frontend handle for the backend channels
pub struct FrontendLink {
    /// Receiver for backend messages
    pub receiver: Receiver<BackendMessage>,
    /// Sender for commands to the backend
    pub command_sender: Sender<BackendCommand>,
}

impl FrontendLink {
    /// Try to receive a message without blocking
    pub fn try_recv(&self) -> Option<BackendMessage> {
        self.receiver.try_recv().ok()
    }

    /// Receive all pending messages
    pub fn drain(&self) -> Vec<BackendMessage> {
        let mut messages = Vec::new();
        while let Ok(msg) = self.receiver.try_recv() {
            messages.push(msg);
        }
        messages
    }

    /// Send a command to the backend
    pub fn send_command(&self, cmd: BackendCommand) -> bool {
        self.command_sender.send(cmd).is_ok()
    }

    /// Request a run start
    pub fn start(&self, output_path: Option<PathBuf>, settings: InstrumentConfig) {
        let _ = self.command_sender.send(BackendCommand::Start {
            output_path,
            settings,
        });
    }

    /// Request a run stop
    pub fn stop(&self, reason: StopReason) {
        let _ = self.command_sender.send(BackendCommand::Stop { reason });
    }

    /// Request an instrument list refresh
    pub fn refresh_instruments(&self) {
        let _ = self.command_sender.send(BackendCommand::RefreshInstruments);
    }

    /// Request shutdown
    pub fn shutdown(&self) {
        let _ = self.command_sender.send(BackendCommand::Shutdown);
    }
}

/// The acquisition backend that runs in a separate thread
pub struct AcquisitionBackend {
    /// Configuration
    config: AppConfig,
    /// Receiver for commands from the UI
    command_receiver: Receiver<BackendCommand>,
    /// Sender for messages to the UI
    message_sender: Sender<BackendMessage>,
    /// Running flag
    running: Arc<AtomicBool>,
}

impl AcquisitionBackend {
    /// Create a new backend with communication channels
    pub fn new(config: AppConfig) -> (Self, FrontendLink) {
        let (cmd_tx, cmd_rx) = bounded(64);
        // Bounded for backpressure; at 20 Hz this holds several minutes
        // of samples if the UI stalls
        let (msg_tx, msg_rx) = bounded(4096);

        let backend = Self {
            config,
            command_receiver: cmd_rx,
            message_sender: msg_tx,
            running: Arc::new(AtomicBool::new(true)),
        };

        let link = FrontendLink {
            receiver: msg_rx,
            command_sender: cmd_tx,
        };

        (backend, link)
    }

    /// Run the backend loop
    pub fn run(self) {
        let mut worker = AcquisitionWorker::new(
            self.config,
            self.command_receiver,
            self.message_sender,
            self.running,
        );
        worker.run();
    }

    /// Get a handle to stop the backend
    pub fn stop_handle(&self) -> Arc<AtomicBool> {
        self.running.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::Ordering;

    #[test]
    fn test_backend_creation() {
        let config = AppConfig::default();
        let (backend, link) = AcquisitionBackend::new(config);

        assert!(backend.running.load(Ordering::SeqCst));
        assert!(link.send_command(BackendCommand::Shutdown));
    }

    #[test]
    fn test_link_commands() {
        let config = AppConfig::default();
        let (_backend, link) = AcquisitionBackend::new(config.clone());

        link.start(Some("run.dat".into()), config.instrument.clone());
        link.stop(StopReason::Manual);
        link.refresh_instruments();
        link.shutdown();
    }
}
