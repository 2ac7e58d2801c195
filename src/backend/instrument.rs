//! SourceMeter trait for a unified instrument interface
//!
//! This module provides a common trait over the source-measure unit,
//! enabling both the real VISA-connected 2636A and a mock instrument
//! for testing without hardware. Implementations must be `Send` so the
//! acquisition worker can own them on its own thread.

use crate::config::InstrumentConfig;
use crate::error::{MonitorError, Result};

/// Unified interface for the source-measure unit.
///
/// The worker holds exactly one `Box<dyn SourceMeter>` per session and
/// is the only thread issuing commands to it.
pub trait SourceMeter: Send {
    /// List available instrument resource identifiers
    fn list_resources(&mut self) -> Result<Vec<String>>;

    /// Open the instrument.
    ///
    /// `resource` selects a specific identifier; `None` takes the first
    /// one found. Returns the identifier actually opened.
    fn connect(&mut self, resource: Option<&str>) -> Result<String>;

    /// Close the instrument
    fn disconnect(&mut self);

    /// Whether an instrument is currently open
    fn is_connected(&self) -> bool;

    /// Drive the instrument to its safe idle state: zero-volt DC
    /// source, autoranging on, output off. Idempotent; issued before
    /// every run and again on teardown.
    fn safe_idle(&mut self) -> Result<()>;

    /// Run the measurement configuration sequence (DC current source at
    /// the bias current, autorange voltage, NPLC, measure delay, fixed
    /// ranges, resistance function)
    fn configure(&mut self, settings: &InstrumentConfig) -> Result<()>;

    /// Switch the source output on or off
    fn set_output(&mut self, enabled: bool) -> Result<()>;

    /// Take one resistance reading in ohms
    fn measure_resistance(&mut self) -> Result<f64>;
}

/// Parse a measurement response into a resistance value.
///
/// The 2636A prints one number per query; anything else is a
/// [`MonitorError::Parse`].
pub fn parse_reading(response: &str) -> Result<f64> {
    response
        .trim()
        .parse::<f64>()
        .map_err(|_| MonitorError::Parse {
            response: response.to_string(),
        })
}

/// Build the instrument selected by the configuration.
///
/// Without the `instrument_visa` feature only the mock is available; a
/// non-mock configuration falls back to it with a warning so the
/// application still starts.
pub fn create_instrument(config: &InstrumentConfig) -> Box<dyn SourceMeter> {
    #[cfg(feature = "instrument_visa")]
    {
        if !config.use_mock {
            return Box::new(super::visa::VisaSourceMeter::new());
        }
    }
    #[cfg(not(feature = "instrument_visa"))]
    {
        if !config.use_mock {
            tracing::warn!(
                "Built without the instrument_visa feature; using the mock instrument"
            );
        }
    }
    Box::new(super::mock::MockSourceMeter::new())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_reading() {
        assert_eq!(parse_reading("1.234500e+03\n").unwrap(), 1234.5);
        assert_eq!(parse_reading(" 5000.0 ").unwrap(), 5000.0);
    }

    #[test]
    fn test_parse_reading_rejects_garbage() {
        for response in ["", "\n", "ovf", "1.2,3.4"] {
            let err = parse_reading(response).unwrap_err();
            assert!(matches!(err, MonitorError::Parse { .. }), "{:?}", response);
        }
    }

    #[test]
    fn test_create_instrument_defaults_to_mock_without_visa() {
        let config = InstrumentConfig {
            use_mock: true,
            ..Default::default()
        };
        let mut instrument = create_instrument(&config);
        assert!(!instrument.is_connected());
        assert!(!instrument.list_resources().unwrap().is_empty());
    }
}
