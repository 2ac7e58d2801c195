//! Core data types for ThermoVis-RS
//!
//! This module contains the fundamental data structures shared between
//! the acquisition backend and the UI: samples, the session lifecycle,
//! and run outcomes.

use chrono::{DateTime, Local};
use std::time::Duration;

/// A single measurement, immutable once created.
///
/// Samples are produced by the acquisition worker, appended to the
/// in-memory [`SampleLog`](crate::session::SampleLog) and the data file,
/// and forwarded to the plot.
#[derive(Debug, Clone, PartialEq)]
pub struct Sample {
    /// Wall-clock timestamp at which the measurement was taken
    pub timestamp: DateTime<Local>,
    /// Time since the run started
    pub elapsed: Duration,
    /// Raw resistance reading in ohms
    pub resistance_ohm: f64,
    /// Derived temperature in degrees Celsius
    pub temperature_c: f64,
}

impl Sample {
    /// Create a new sample
    pub fn new(
        timestamp: DateTime<Local>,
        elapsed: Duration,
        resistance_ohm: f64,
        temperature_c: f64,
    ) -> Self {
        Self {
            timestamp,
            elapsed,
            resistance_ohm,
            temperature_c,
        }
    }
}

/// Lifecycle of an acquisition session.
///
/// `Idle -> Connecting -> Configuring -> Running -> Stopping -> Idle`.
/// There are no retries: any failure along the way drops straight back
/// to `Idle` after the teardown sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionState {
    /// No run active
    #[default]
    Idle,
    /// Scanning for and opening the instrument
    Connecting,
    /// Running the measurement configuration sequence
    Configuring,
    /// Polling measurements
    Running,
    /// Teardown in progress
    Stopping,
}

impl SessionState {
    /// Whether a run is in progress in any form
    pub fn is_active(&self) -> bool {
        !matches!(self, SessionState::Idle)
    }
}

impl std::fmt::Display for SessionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let text = match self {
            SessionState::Idle => "Idle",
            SessionState::Connecting => "Connecting",
            SessionState::Configuring => "Configuring",
            SessionState::Running => "Running",
            SessionState::Stopping => "Stopping",
        };
        write!(f, "{}", text)
    }
}

/// Why a stop was requested
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// The user pressed Stop
    Manual,
    /// The plot window was closed; a graceful stop, not an error
    DisplayClosed,
}

/// How a run ended. Reported to the UI exactly once per run.
#[derive(Debug, Clone, PartialEq)]
pub enum RunOutcome {
    /// Stopped by the user
    Stopped,
    /// The plot window was closed
    DisplayClosed,
    /// The run aborted; the instrument output was forced off first
    Failed(String),
}

impl RunOutcome {
    /// Status-bar message for this outcome
    pub fn status_message(&self) -> String {
        match self {
            RunOutcome::Stopped => "Manually stopped".to_string(),
            RunOutcome::DisplayClosed => "Closed plotting window".to_string(),
            RunOutcome::Failed(msg) => format!("Run failed: {}", msg),
        }
    }

    /// Whether this outcome represents an error
    pub fn is_error(&self) -> bool {
        matches!(self, RunOutcome::Failed(_))
    }
}

impl From<StopReason> for RunOutcome {
    fn from(reason: StopReason) -> Self {
        match reason {
            StopReason::Manual => RunOutcome::Stopped,
            StopReason::DisplayClosed => RunOutcome::DisplayClosed,
        }
    }
}
