//! Acquisition worker thread
//!
//! This module contains the polling loop that runs on its own thread
//! and owns the instrument for the duration of a run. It communicates
//! with the UI thread through crossbeam channels.
//!
//! # Responsibilities
//!
//! - **Command processing**: start/stop requests from the UI, honored
//!   at iteration boundaries (cooperative cancellation)
//! - **Session lifecycle**: `Idle -> Connecting -> Configuring ->
//!   Running -> Stopping -> Idle`, no retries anywhere
//! - **Sampling**: one resistance query per iteration, converted to a
//!   temperature, logged, written to the data file, forwarded to the UI
//! - **Heating rate**: finite-difference estimate over the configured
//!   window, published for display only
//! - **Teardown**: the instrument output is forced off before the
//!   worker gives up on a run, whatever the cause

use crate::backend::instrument::{create_instrument, SourceMeter};
use crate::backend::{BackendCommand, BackendMessage};
use crate::calibration::resistance_to_celsius;
use crate::config::{AppConfig, InstrumentConfig};
use crate::error::{MonitorError, Result};
use crate::session::{LogWriter, SampleLog};
use crate::types::{RunOutcome, Sample, SessionState};
use chrono::Local;
use crossbeam_channel::{Receiver, RecvTimeoutError, Sender, TryRecvError, TrySendError};
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;

/// How long the worker blocks waiting for a command while no run is
/// active
const IDLE_WAIT: std::time::Duration = std::time::Duration::from_millis(100);

/// State owned for the lifetime of one run
struct ActiveRun {
    /// Monotonic start time for elapsed stamps
    started: Instant,
    /// Append-only in-memory sample sequence
    log: SampleLog,
    /// Data-file writer, if an output path was given
    writer: Option<LogWriter>,
}

/// The worker that runs the acquisition loop
pub struct AcquisitionWorker {
    config: AppConfig,
    command_rx: Receiver<BackendCommand>,
    message_tx: Sender<BackendMessage>,
    running: Arc<AtomicBool>,
    instrument: Box<dyn SourceMeter>,
    state: SessionState,
    run: Option<ActiveRun>,
}

impl AcquisitionWorker {
    /// Create a new worker; the instrument implementation is chosen by
    /// the configuration
    pub fn new(
        config: AppConfig,
        command_rx: Receiver<BackendCommand>,
        message_tx: Sender<BackendMessage>,
        running: Arc<AtomicBool>,
    ) -> Self {
        let instrument = create_instrument(&config.instrument);
        Self::with_instrument(config, command_rx, message_tx, running, instrument)
    }

    /// Create a worker with a caller-supplied instrument
    pub fn with_instrument(
        config: AppConfig,
        command_rx: Receiver<BackendCommand>,
        message_tx: Sender<BackendMessage>,
        running: Arc<AtomicBool>,
        instrument: Box<dyn SourceMeter>,
    ) -> Self {
        Self {
            config,
            command_rx,
            message_tx,
            running,
            instrument,
            state: SessionState::Idle,
            run: None,
        }
    }

    /// Run the main worker loop until shutdown
    pub fn run(&mut self) {
        tracing::info!("Acquisition worker started");
        let poll_interval = self.config.acquisition.poll_interval();

        while self.running.load(Ordering::SeqCst) {
            self.process_commands();
            if !self.running.load(Ordering::SeqCst) {
                break;
            }

            if self.state == SessionState::Running {
                self.step();
                std::thread::sleep(poll_interval);
            } else {
                // Nothing to poll; block until the UI wants something
                match self.command_rx.recv_timeout(IDLE_WAIT) {
                    Ok(cmd) => self.handle_command(cmd),
                    Err(RecvTimeoutError::Timeout) => {}
                    Err(RecvTimeoutError::Disconnected) => {
                        self.running.store(false, Ordering::SeqCst);
                    }
                }
            }
        }

        // Leave the device safe even on shutdown mid-run
        if self.run.is_some() {
            self.finish_run(RunOutcome::Stopped);
        }
        self.instrument.disconnect();
        let _ = self.message_tx.try_send(BackendMessage::Shutdown);
        tracing::info!("Acquisition worker stopped");
    }

    /// Drain pending commands without blocking
    fn process_commands(&mut self) {
        loop {
            match self.command_rx.try_recv() {
                Ok(cmd) => self.handle_command(cmd),
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => {
                    self.running.store(false, Ordering::SeqCst);
                    break;
                }
            }
        }
    }

    fn handle_command(&mut self, cmd: BackendCommand) {
        match cmd {
            BackendCommand::Start {
                output_path,
                settings,
            } => {
                self.start_run(output_path, settings);
            }
            BackendCommand::Stop { reason } => {
                if self.run.is_some() {
                    self.finish_run(reason.into());
                }
            }
            BackendCommand::RefreshInstruments => {
                match self.instrument.list_resources() {
                    Ok(resources) => {
                        let _ = self
                            .message_tx
                            .try_send(BackendMessage::InstrumentList(resources));
                    }
                    Err(e) => self.send_error(&e),
                }
            }
            BackendCommand::Shutdown => {
                self.running.store(false, Ordering::SeqCst);
            }
        }
    }

    /// Start a run. Any failure is fatal to the run: the device is put
    /// back into its safe state and the error is surfaced, not masked.
    fn start_run(&mut self, output_path: Option<PathBuf>, settings: InstrumentConfig) {
        if self.run.is_some() {
            let _ = self
                .message_tx
                .try_send(BackendMessage::Error("A run is already active".to_string()));
            return;
        }

        if let Err(e) = self.try_start(output_path, &settings) {
            tracing::error!("Run did not start: {}", e);
            if self.instrument.is_connected() {
                let _ = self.instrument.set_output(false);
                let _ = self.instrument.safe_idle();
                self.instrument.disconnect();
            }
            self.run = None;
            self.set_state(SessionState::Idle);
            self.send_error(&e);
        }
    }

    fn try_start(&mut self, output_path: Option<PathBuf>, settings: &InstrumentConfig) -> Result<()> {
        self.set_state(SessionState::Connecting);
        let resources = self.instrument.list_resources()?;
        if resources.is_empty() {
            return Err(MonitorError::NoDeviceFound);
        }
        let opened = self.instrument.connect(settings.resource.as_deref())?;
        tracing::info!("Connected to {}", opened);
        self.instrument.safe_idle()?;

        self.set_state(SessionState::Configuring);
        self.instrument.configure(settings)?;

        let writer = match output_path {
            Some(path) => Some(LogWriter::create(path)?),
            None => None,
        };

        self.instrument.set_output(true)?;
        self.run = Some(ActiveRun {
            started: Instant::now(),
            log: SampleLog::new(),
            writer,
        });
        self.set_state(SessionState::Running);
        tracing::info!("Run started");
        Ok(())
    }

    /// One acquisition iteration
    fn step(&mut self) {
        match self.acquire_sample() {
            Ok(true) => {}
            // The display sink is gone; a graceful stop, not an error
            Ok(false) => self.finish_run(RunOutcome::DisplayClosed),
            Err(e) => {
                tracing::error!("Measurement failed: {}", e);
                self.finish_run(RunOutcome::Failed(e.to_string()));
            }
        }
    }

    /// Take one sample and deliver it. Returns `Ok(false)` when the UI
    /// side of the channel is gone.
    fn acquire_sample(&mut self) -> Result<bool> {
        let resistance = self.instrument.measure_resistance()?;
        let temperature = resistance_to_celsius(resistance)?;

        let Some(run) = self.run.as_mut() else {
            return Ok(true);
        };
        let sample = Sample::new(Local::now(), run.started.elapsed(), resistance, temperature);

        if let Some(writer) = run.writer.as_mut() {
            writer.append(&sample)?;
        }
        run.log.push(sample.clone());

        match self.message_tx.try_send(BackendMessage::Sample(sample)) {
            Ok(()) => {}
            Err(TrySendError::Disconnected(_)) => return Ok(false),
            Err(TrySendError::Full(_)) => {
                tracing::warn!("UI channel full, dropping a point");
            }
        }

        if let Some(rate) = run.log.heating_rate(self.config.acquisition.heating_rate_window) {
            let _ = self.message_tx.try_send(BackendMessage::HeatingRate(rate));
        }
        Ok(true)
    }

    /// Tear a run down: output off, safe idle, file closed, outcome
    /// reported. Runs for every exit path, including failures.
    fn finish_run(&mut self, outcome: RunOutcome) {
        self.set_state(SessionState::Stopping);

        if let Err(e) = self.instrument.set_output(false) {
            tracing::warn!("Failed to disable output: {}", e);
        }
        if let Err(e) = self.instrument.safe_idle() {
            tracing::warn!("Failed to reach safe idle: {}", e);
        }
        self.instrument.disconnect();

        if let Some(run) = self.run.take() {
            // Dropping the writer closes the file; rows were flushed as
            // they were written
            drop(run.writer);
            tracing::info!(
                "Run finished after {} samples: {}",
                run.log.len(),
                outcome.status_message()
            );
        }

        let _ = self.message_tx.try_send(BackendMessage::RunFinished(outcome));
        self.set_state(SessionState::Idle);
    }

    fn set_state(&mut self, state: SessionState) {
        if self.state != state {
            self.state = state;
            let _ = self.message_tx.try_send(BackendMessage::SessionState(state));
        }
    }

    fn send_error(&self, error: &MonitorError) {
        let _ = self
            .message_tx
            .try_send(BackendMessage::Error(error.to_string()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::mock::MockSourceMeter;
    use crate::types::StopReason;
    use crossbeam_channel::bounded;

    fn create_test_worker(
        mock: MockSourceMeter,
    ) -> (
        AcquisitionWorker,
        Receiver<BackendMessage>,
        Sender<BackendCommand>,
    ) {
        let (cmd_tx, cmd_rx) = bounded(64);
        let (msg_tx, msg_rx) = bounded(1024);
        let running = Arc::new(AtomicBool::new(true));
        let worker = AcquisitionWorker::with_instrument(
            AppConfig::default(),
            cmd_rx,
            msg_tx,
            running,
            Box::new(mock),
        );
        (worker, msg_rx, cmd_tx)
    }

    fn drain(rx: &Receiver<BackendMessage>) -> Vec<BackendMessage> {
        let mut out = Vec::new();
        while let Ok(msg) = rx.try_recv() {
            out.push(msg);
        }
        out
    }

    #[test]
    fn test_start_walks_the_lifecycle() {
        let (mut worker, msg_rx, _cmd_tx) = create_test_worker(MockSourceMeter::new());

        worker.start_run(None, InstrumentConfig::default());
        assert_eq!(worker.state, SessionState::Running);

        let states: Vec<SessionState> = drain(&msg_rx)
            .into_iter()
            .filter_map(|m| match m {
                BackendMessage::SessionState(s) => Some(s),
                _ => None,
            })
            .collect();
        assert_eq!(
            states,
            vec![
                SessionState::Connecting,
                SessionState::Configuring,
                SessionState::Running
            ]
        );
    }

    #[test]
    fn test_no_device_found_never_starts() {
        let (mut worker, msg_rx, _cmd_tx) =
            create_test_worker(MockSourceMeter::new().with_no_devices());

        worker.start_run(None, InstrumentConfig::default());
        assert_eq!(worker.state, SessionState::Idle);
        assert!(worker.run.is_none());

        let errors: Vec<String> = drain(&msg_rx)
            .into_iter()
            .filter_map(|m| match m {
                BackendMessage::Error(e) => Some(e),
                _ => None,
            })
            .collect();
        assert_eq!(errors.len(), 1);
        assert!(errors[0].contains("No instrument found"));
    }

    #[test]
    fn test_samples_are_monotonic() {
        let (mut worker, msg_rx, _cmd_tx) = create_test_worker(MockSourceMeter::new());
        worker.start_run(None, InstrumentConfig::default());

        for _ in 0..5 {
            worker.step();
        }

        let samples: Vec<Sample> = drain(&msg_rx)
            .into_iter()
            .filter_map(|m| match m {
                BackendMessage::Sample(s) => Some(s),
                _ => None,
            })
            .collect();
        assert_eq!(samples.len(), 5);
        for pair in samples.windows(2) {
            assert!(pair[1].elapsed >= pair[0].elapsed);
        }
    }

    #[test]
    fn test_manual_stop_disables_output() {
        let mock = MockSourceMeter::new();
        let output = mock.output_handle();
        let (mut worker, msg_rx, cmd_tx) = create_test_worker(mock);

        worker.start_run(None, InstrumentConfig::default());
        worker.step();
        assert!(output.load(Ordering::SeqCst));

        // Stop lands between iterations: no further sample is taken
        cmd_tx.send(BackendCommand::Stop {
            reason: StopReason::Manual,
        })
        .unwrap();
        worker.process_commands();

        assert_eq!(worker.state, SessionState::Idle);
        assert!(!output.load(Ordering::SeqCst));

        let messages = drain(&msg_rx);
        let samples = messages
            .iter()
            .filter(|m| matches!(m, BackendMessage::Sample(_)))
            .count();
        assert_eq!(samples, 1);
        assert!(messages
            .iter()
            .any(|m| matches!(m, BackendMessage::RunFinished(RunOutcome::Stopped))));
    }

    #[test]
    fn test_out_of_domain_reading_aborts_run() {
        let mock = MockSourceMeter::new().with_readings([1100.0, 9000.0]);
        let output = mock.output_handle();
        let (mut worker, msg_rx, _cmd_tx) = create_test_worker(mock);

        worker.start_run(None, InstrumentConfig::default());
        worker.step(); // fine
        worker.step(); // out of calibration domain

        assert_eq!(worker.state, SessionState::Idle);
        assert!(!output.load(Ordering::SeqCst), "output forced off on abort");

        let outcome = drain(&msg_rx).into_iter().find_map(|m| match m {
            BackendMessage::RunFinished(o) => Some(o),
            _ => None,
        });
        match outcome {
            Some(RunOutcome::Failed(msg)) => assert!(msg.contains("calibration domain")),
            other => panic!("expected a failed outcome, got {:?}", other),
        }
    }

    #[test]
    fn test_display_closed_is_a_graceful_stop() {
        let mock = MockSourceMeter::new();
        let output = mock.output_handle();
        let (mut worker, msg_rx, _cmd_tx) = create_test_worker(mock);

        worker.start_run(None, InstrumentConfig::default());
        worker.step();
        drop(msg_rx);

        // The next delivery notices the sink is gone
        worker.step();
        assert_eq!(worker.state, SessionState::Idle);
        assert!(worker.run.is_none());
        assert!(!output.load(Ordering::SeqCst));
    }

    #[test]
    fn test_heating_rate_published_after_window() {
        let (mut worker, msg_rx, _cmd_tx) = create_test_worker(MockSourceMeter::new());
        worker.config.acquisition.heating_rate_window = 3;
        worker.start_run(None, InstrumentConfig::default());

        for _ in 0..3 {
            worker.step();
        }
        assert!(
            !drain(&msg_rx)
                .iter()
                .any(|m| matches!(m, BackendMessage::HeatingRate(_))),
            "no rate until the window is exceeded"
        );

        worker.step();
        assert!(drain(&msg_rx)
            .iter()
            .any(|m| matches!(m, BackendMessage::HeatingRate(_))));
    }

    #[test]
    fn test_shutdown_command() {
        let (mut worker, _msg_rx, cmd_tx) = create_test_worker(MockSourceMeter::new());
        cmd_tx.send(BackendCommand::Shutdown).unwrap();
        worker.process_commands();
        assert!(!worker.running.load(Ordering::SeqCst));
    }
}
