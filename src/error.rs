//! Error handling for ThermoVis-RS
//!
//! This module defines the application error type and a Result alias
//! used throughout the crate. Every failure is surfaced to the user via
//! the status bar; nothing is retried silently.

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for ThermoVis-RS operations
#[derive(Error, Debug)]
pub enum MonitorError {
    /// The VISA resource scan returned nothing; the run never starts
    #[error("No instrument found. Please connect one.")]
    NoDeviceFound,

    /// Errors reported by the instrument or the VISA layer
    #[error("Instrument error: {0}")]
    Instrument(String),

    /// The measurement response was not a valid number
    #[error("Malformed measurement response: {response:?}")]
    Parse {
        /// The raw response text, trimmed
        response: String,
    },

    /// The calibration formula was given an out-of-range resistance
    #[error("Resistance {resistance:.3} Ohm is outside the calibration domain")]
    Domain {
        /// The offending resistance in ohms
        resistance: f64,
    },

    /// The user declined to overwrite an existing output file
    #[error("File already exists: {}", .0.display())]
    FileExists(PathBuf),

    /// Errors related to configuration loading/saving
    #[error("Configuration error: {0}")]
    Config(String),

    /// Errors related to channel communication
    #[error("Channel error: {0}")]
    Channel(String),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

#[cfg(feature = "instrument_visa")]
impl From<visa_rs::Error> for MonitorError {
    fn from(err: visa_rs::Error) -> Self {
        MonitorError::Instrument(err.to_string())
    }
}

/// Result type alias for ThermoVis-RS operations
pub type Result<T> = std::result::Result<T, MonitorError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = MonitorError::Parse {
            response: "ovf\n".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Malformed measurement response: \"ovf\\n\""
        );
    }

    #[test]
    fn test_domain_error_includes_resistance() {
        let err = MonitorError::Domain { resistance: 9000.0 };
        assert!(err.to_string().contains("9000.000"));
    }

    #[test]
    fn test_file_exists_error_shows_path() {
        let err = MonitorError::FileExists(PathBuf::from("/tmp/run01.dat"));
        assert!(err.to_string().contains("run01.dat"));
    }
}
